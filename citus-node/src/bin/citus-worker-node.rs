//! Worker registration binary
//!
//! Prints the result record on stdout; logs go to stderr.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use citus_node::config::NodeArgs;
use citus_node::coordinator::PgConnector;
use citus_node::error::Result;
use citus_node::worker::{reconcile_worker, Outcome};
use citus_node::Report;

async fn run(args: &NodeArgs) -> Result<Outcome> {
    let endpoint = args.endpoint()?;
    let worker = args.worker()?;

    let mut connector = PgConnector::new();
    if let Some(timeout) = args.connect_timeout() {
        connector = connector.with_connect_timeout(timeout);
    }

    let reconciliation = reconcile_worker(&connector, &endpoint, &worker).await?;
    Ok(reconciliation.outcome)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = NodeArgs::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Registering worker {}:{} with coordinator {}",
        args.worker_host, args.worker_port, args.coordinator_host
    );

    let result = run(&args).await;
    if let Err(e) = &result {
        error!("{}", e);
    }

    let report = Report::from_result(&result);
    match report.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
