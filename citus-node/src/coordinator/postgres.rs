//! PostgreSQL driver for the coordinator session
//!
//! Talks to a Citus coordinator with `tokio-postgres`. The two statements are
//! the coordinator's public worker-management interface and are kept exactly
//! as the existing tooling issues them.

use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, Config, NoTls};
use tracing::{debug, warn};

use super::endpoint::CoordinatorEndpoint;
use super::session::{CoordinatorConnector, CoordinatorSession};
use crate::error::{CitusNodeError, Result};
use crate::worker::WorkerTarget;

/// Lists active workers filtered by name and port
pub const ACTIVE_WORKER_QUERY: &str =
    "SELECT * FROM citus_get_active_worker_nodes() WHERE node_name = $1 AND node_port = $2";

/// Registers a node by name and port
pub const ADD_NODE_QUERY: &str = "SELECT * FROM citus_add_node($1, $2)";

/// Connector backed by `tokio-postgres`
#[derive(Debug, Clone, Default)]
pub struct PgConnector {
    connect_timeout: Option<Duration>,
}

impl PgConnector {
    /// Create a connector with the driver's default timeouts
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward a connect timeout to the driver
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Driver configuration for `endpoint`
    pub fn config(&self, endpoint: &CoordinatorEndpoint) -> Config {
        let mut config = Config::new();
        config
            .host(endpoint.host())
            .port(endpoint.port())
            .user(endpoint.username())
            .dbname(endpoint.database());
        if let Some(password) = endpoint.password() {
            config.password(password.expose());
        }
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout(timeout);
        }
        config
    }
}

#[async_trait]
impl CoordinatorConnector for PgConnector {
    type Session = PgSession;

    async fn connect(&self, endpoint: &CoordinatorEndpoint) -> Result<PgSession> {
        let (client, connection) = self
            .config(endpoint)
            .connect(NoTls)
            .await
            .map_err(|e| {
                let (code, message) = split_error(&e);
                CitusNodeError::ConnectionFailed { code, message }
            })?;

        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("Coordinator connection closed with error: {}", e);
            }
        });

        debug!("Coordinator session established");
        Ok(PgSession { client, driver })
    }
}

/// Live session on the coordinator.
///
/// The connection task is aborted when the session is dropped.
pub struct PgSession {
    client: Client,
    driver: JoinHandle<()>,
}

#[async_trait]
impl CoordinatorSession for PgSession {
    async fn active_worker_count(&self, worker: &WorkerTarget) -> Result<u64> {
        let host = worker.host();
        // node_port is bigint in citus_get_active_worker_nodes()
        let port = i64::from(worker.port());
        self.client
            .execute(ACTIVE_WORKER_QUERY, &[&host, &port])
            .await
            .map_err(|e| query_error("membership check", &e))
    }

    async fn add_node(&self, worker: &WorkerTarget) -> Result<u64> {
        let host = worker.host();
        // nodeport is integer in citus_add_node()
        let port = i32::from(worker.port());
        self.client
            .execute(ADD_NODE_QUERY, &[&host, &port])
            .await
            .map_err(|e| query_error("add node", &e))
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Provider-neutral (code, message) from a driver error
fn split_error(e: &tokio_postgres::Error) -> (Option<String>, String) {
    let code = e.code().map(|state| state.code().to_string());
    let message = match e.as_db_error() {
        Some(db) => db.message().to_string(),
        None => e.to_string(),
    };
    (code, message)
}

fn query_error(operation: &'static str, e: &tokio_postgres::Error) -> CitusNodeError {
    let (code, message) = split_error(e);
    CitusNodeError::QueryFailed {
        operation,
        code,
        message,
    }
}
