mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use lead_research::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
