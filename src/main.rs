use std::process::ExitCode;

fn main() -> ExitCode {
    match claude_session_export::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
