use std::process::ExitCode;

mod bootstrap;
mod gameplay;
mod loop_runner;
mod settings;

pub(crate) fn run() -> ExitCode {
    loop_runner::run(bootstrap::build_app)
}
