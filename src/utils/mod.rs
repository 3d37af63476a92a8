pub mod environment;
pub mod logging;
pub mod paths;
pub mod terminal;

pub use environment::{get_claude_dir, get_projects_dir};
pub use logging::{LogTarget, init_logging};
pub use paths::{
    display_project_name, format_path_with_tilde, safe_open_file, validate_file_size,
    validate_path_not_symlink,
};
pub use terminal::{strip_ansi_codes, truncate_with_ellipsis};
