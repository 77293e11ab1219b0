mod app;

use std::process::ExitCode;

use tracing::{error, info};

fn main() -> ExitCode {
    app::bootstrap::init_tracing();
    info!("=== Fogwar Explorer ===");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match app::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "explorer_failed");
            ExitCode::FAILURE
        }
    }
}
