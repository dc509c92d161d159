mod cli;
mod commands;
mod demo;
mod error;
mod infra;

pub use error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
