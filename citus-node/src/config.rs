//! Command-line and environment configuration

use std::time::Duration;

use clap::Parser;

use crate::coordinator::CoordinatorEndpoint;
use crate::error::Result;
use crate::worker::WorkerTarget;
use crate::{DEFAULT_COORDINATOR_PORT, DEFAULT_COORDINATOR_USERNAME, DEFAULT_WORKER_PORT};

/// Register a worker node with a Citus coordinator, once.
#[derive(Parser, Clone)]
#[command(name = "citus-worker-node", version, about, long_about = None)]
pub struct NodeArgs {
    /// Coordinator host to log in to.
    #[arg(long, env = "CITUS_COORDINATOR_HOST")]
    pub coordinator_host: String,

    /// Coordinator port.
    #[arg(long, default_value_t = DEFAULT_COORDINATOR_PORT, env = "CITUS_COORDINATOR_PORT")]
    pub coordinator_port: u16,

    /// Coordinator login username.
    #[arg(long, default_value = DEFAULT_COORDINATOR_USERNAME, env = "CITUS_COORDINATOR_USER")]
    pub coordinator_user: String,

    /// Coordinator login password.
    #[arg(
        long,
        default_value = "",
        env = "CITUS_COORDINATOR_PASSWORD",
        hide_default_value = true,
        hide_env_values = true
    )]
    pub coordinator_password: String,

    /// Database to connect to on the coordinator.
    #[arg(long, env = "CITUS_DATABASE")]
    pub database: String,

    /// Worker host to register.
    #[arg(long, env = "CITUS_WORKER_HOST")]
    pub worker_host: String,

    /// Worker port to register.
    #[arg(long, default_value_t = DEFAULT_WORKER_PORT, env = "CITUS_WORKER_PORT")]
    pub worker_port: u16,

    /// Connect timeout handed to the database driver.
    #[arg(long, env = "CITUS_CONNECT_TIMEOUT_SECS")]
    pub connect_timeout_secs: Option<u64>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn", env = "CITUS_LOG_LEVEL")]
    pub log_level: String,
}

impl NodeArgs {
    /// Validated coordinator endpoint
    pub fn endpoint(&self) -> Result<CoordinatorEndpoint> {
        let endpoint = CoordinatorEndpoint::new(&self.coordinator_host, &self.database)
            .with_port(self.coordinator_port)
            .with_username(&self.coordinator_user)
            .with_password(&self.coordinator_password);
        endpoint.validate()?;
        Ok(endpoint)
    }

    /// Validated worker target
    pub fn worker(&self) -> Result<WorkerTarget> {
        WorkerTarget::new(&self.worker_host, self.worker_port)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

// Hand-written so the password never reaches Debug output.
impl std::fmt::Debug for NodeArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeArgs")
            .field("coordinator_host", &self.coordinator_host)
            .field("coordinator_port", &self.coordinator_port)
            .field("coordinator_user", &self.coordinator_user)
            .field("coordinator_password", &crate::coordinator::endpoint::REDACTED)
            .field("database", &self.database)
            .field("worker_host", &self.worker_host)
            .field("worker_port", &self.worker_port)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}
