use std::process::ExitCode;

use ark_engine::{run_app, AppError};
use tracing::error;

use super::bootstrap::AppWiring;

pub(crate) fn run(build: impl FnOnce() -> Result<AppWiring, AppError>) -> ExitCode {
    let result = build().and_then(|app| run_app(app.config, &app.paths, app.scene));
    if let Err(err) = result {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
