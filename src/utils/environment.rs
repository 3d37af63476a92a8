use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Result, bail};

/// Overrides the Claude directory, as Claude Code itself honours it
pub const CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

/// Get the Claude directory path (`$CLAUDE_CONFIG_DIR`, else ~/.claude)
pub fn get_claude_dir() -> Result<PathBuf> {
    claude_dir_from(env::var_os(CONFIG_DIR_ENV), env::var_os("HOME"))
}

/// Directory holding one subdirectory per project
pub fn get_projects_dir() -> Result<PathBuf> {
    Ok(get_claude_dir()?.join("projects"))
}

pub(crate) fn claude_dir_from(
    config_dir: Option<OsString>,
    home: Option<OsString>,
) -> Result<PathBuf> {
    if let Some(dir) = config_dir.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(home) = home.filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home).join(".claude"));
    }
    match dirs::home_dir() {
        Some(home) => Ok(home.join(".claude")),
        None => {
            bail!("HOME environment variable not set and no home directory could be determined")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_wins() {
        let dir = claude_dir_from(Some("/opt/claude".into()), Some("/Users/testuser".into()));
        assert_eq!(dir.unwrap(), PathBuf::from("/opt/claude"));
    }

    #[test]
    fn test_home_fallback() {
        let dir = claude_dir_from(None, Some("/Users/testuser".into()));
        assert_eq!(dir.unwrap(), PathBuf::from("/Users/testuser/.claude"));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let dir = claude_dir_from(Some("".into()), Some("/home/dev".into()));
        assert_eq!(dir.unwrap(), PathBuf::from("/home/dev/.claude"));
    }
}
