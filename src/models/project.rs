use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    /// Directory name under `projects/` (Claude's dash-encoded project path)
    pub dir_name: String,
    pub project_dir: PathBuf,
    pub index_file: Option<PathBuf>,
    pub session_files: Vec<PathBuf>,
}
