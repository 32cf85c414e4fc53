mod app;

use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    let wiring = match app::bootstrap::build_app() {
        Ok(wiring) => wiring,
        Err(err) => {
            error!(error = %err, "config_failed");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = parsang_engine::run_viewer(wiring.config) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
