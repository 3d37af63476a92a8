use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use tracing::debug;

use crate::export::{ExportOptions, Exporter};
use crate::indexer::{ClaudeProjectsLocator, SessionLocator, resolve_session};
use crate::models::SessionSummary;
use crate::tui::{BrowserOptions, MatchPolicy, run_browser};
use crate::utils::{LogTarget, format_path_with_tilde, get_projects_dir, init_logging};

/// Characters of the session id shown by `list`
const LIST_ID_CHARS: usize = 12;
/// Characters of the first prompt shown by `list`
const LIST_PROMPT_CHARS: usize = 80;

#[derive(Parser)]
#[command(name = "claude-session-export")]
#[command(version = "0.1.0")]
#[command(about = "Export Claude Code sessions to standalone HTML files", long_about = None)]
pub struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available sessions, grouped by project
    List {
        /// Only projects whose name contains this
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Export a session to an HTML file
    Export {
        /// Session id or path to a .jsonl log
        session: String,
        /// Output HTML file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Browse sessions interactively and export from the list
    Browse {
        /// Only projects whose name contains this
        #[arg(short, long)]
        project: Option<String>,
        /// Filter with plain substring matching instead of fuzzy matching
        #[arg(long)]
        substring: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
    let command = match cli.command {
        Some(command) => command,
        None if interactive => Commands::Browse { project: None, substring: false },
        None => {
            Cli::command().print_help()?;
            return Ok(());
        }
    };

    // The browser owns the screen: logs go to the file or nowhere
    let target = match (&cli.log_file, &command) {
        (Some(path), _) => LogTarget::File(path),
        (None, Commands::Browse { .. }) => LogTarget::Discard,
        (None, _) => LogTarget::Stderr,
    };
    init_logging(cli.verbose, target)?;

    match command {
        Commands::List { project } => list_sessions(project.as_deref()),
        Commands::Export { session, output } => export_session(&session, output),
        Commands::Browse { project, substring } => browse(project.as_deref(), substring),
    }
}

fn locator() -> Result<ClaudeProjectsLocator> {
    let projects_dir = get_projects_dir()?;
    debug!(projects_dir = %projects_dir.display(), "using projects directory");
    Ok(ClaudeProjectsLocator::new(projects_dir))
}

fn list_sessions(project: Option<&str>) -> Result<()> {
    let sessions = locator()?.locate(project)?;
    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }
    print!("{}", format_session_list(&sessions));
    Ok(())
}

/// `list` output: one block per project (sorted by name), sessions newest first
pub fn format_session_list(sessions: &[SessionSummary]) -> String {
    let mut by_project: BTreeMap<&str, Vec<&SessionSummary>> = BTreeMap::new();
    for session in sessions {
        by_project.entry(session.project.as_str()).or_default().push(session);
    }

    let mut out = String::new();
    for (project, sessions) in by_project {
        out.push_str(&format!("\n  {project}\n  {}\n", "─".repeat(60)));
        for session in sessions {
            let id: String = session.session_id.chars().take(LIST_ID_CHARS).collect();
            let date = session
                .created
                .or(session.modified)
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "???".to_string());
            let branch =
                session.git_branch.as_ref().map(|b| format!(" [{b}]")).unwrap_or_default();
            let prompt: String = session.title.chars().take(LIST_PROMPT_CHARS).collect();
            out.push_str(&format!("  {id}  {date}{branch}  {prompt}\n"));
        }
    }
    out.push('\n');
    out
}

fn export_session(session: &str, output: Option<PathBuf>) -> Result<()> {
    let projects_dir = get_projects_dir()?;
    let path = resolve_session(session, &projects_dir)?;

    let exporter = Exporter::filesystem(ExportOptions { output, ..Default::default() });
    let report =
        exporter.export(&path).with_context(|| format!("Failed to export {}", display(&path)))?;

    for anomaly in &report.anomalies {
        eprintln!("Warning: {anomaly}");
    }
    println!("Exported {} messages to {}", report.messages, report.output.display());
    Ok(())
}

fn browse(project: Option<&str>, substring: bool) -> Result<()> {
    let locator = locator()?;
    let sessions = locator.locate(project)?;
    if sessions.is_empty() {
        bail!("No sessions found in {}", display(locator.projects_dir()));
    }

    let match_policy = if substring { MatchPolicy::Substring } else { MatchPolicy::Fuzzy };
    run_browser(sessions, BrowserOptions { match_policy, ..Default::default() })
}

fn display(path: &Path) -> String {
    format_path_with_tilde(path)
}
