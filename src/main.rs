//! OpenAPI from routes - command-line tool for documenting an application's HTTP API.
//!
//! The `generate` step reads the application's route table (a route manifest), samples
//! live responses where configured and writes an endpoint artifact. The `serve` step turns
//! that artifact into an OpenAPI 3.0 document on every request and serves it together with
//! a documentation viewer.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-routes generate --routes routes.json --base-url http://localhost:8000
//! openapi-from-routes serve --path public/api-docs.json --listen 127.0.0.1:8080
//! ```
//!
//! Enable verbose logging with `-v`, or set `RUST_LOG`.

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_routes::cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    // Initialize logger based on verbose flag
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from routes starting...");

    cli::run(args).await?;

    Ok(())
}
