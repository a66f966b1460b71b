//! Coordinator session
//!
//! The driver seam. A [`CoordinatorConnector`] turns an endpoint into a live
//! [`CoordinatorSession`]; the reconciler only ever talks to the session
//! trait, so the PostgreSQL driver and the in-memory coordinator are
//! interchangeable.

use async_trait::async_trait;
use tracing::{info, warn};

use super::endpoint::CoordinatorEndpoint;
use crate::error::Result;
use crate::worker::WorkerTarget;

/// Opens sessions against a coordinator
#[async_trait]
pub trait CoordinatorConnector: Send + Sync {
    /// Session type produced by this connector
    type Session: CoordinatorSession;

    /// Establish an authenticated session bound to the endpoint's database.
    ///
    /// Failures must be reported as `CitusNodeError::ConnectionFailed`.
    async fn connect(&self, endpoint: &CoordinatorEndpoint) -> Result<Self::Session>;
}

/// Worker-management calls available on an open session.
///
/// Dropping the session releases its connection.
#[async_trait]
pub trait CoordinatorSession: Send + Sync {
    /// Number of active worker rows matching the target's host and port exactly
    async fn active_worker_count(&self, worker: &WorkerTarget) -> Result<u64>;

    /// Register the target as a worker node, returning the affected row count
    async fn add_node(&self, worker: &WorkerTarget) -> Result<u64>;
}

/// Validate the endpoint and open a session through `connector`.
///
/// Error text is scrubbed of the endpoint's password before it is returned.
pub async fn open<C>(connector: &C, endpoint: &CoordinatorEndpoint) -> Result<C::Session>
where
    C: CoordinatorConnector + ?Sized,
{
    endpoint.validate()?;

    info!(
        host = endpoint.host(),
        port = endpoint.port(),
        database = endpoint.database(),
        user = endpoint.username(),
        "Connecting to coordinator"
    );

    match connector.connect(endpoint).await {
        Ok(session) => Ok(session),
        Err(e) => {
            let e = e.scrubbed(endpoint.password());
            warn!("Coordinator session could not be opened: {}", e);
            Err(e)
        }
    }
}
