//! In-memory coordinator
//!
//! Keeps a worker membership table in process and counts every call made
//! against it. Failures can be scripted per operation, which makes it the
//! test double for the reconciler and a dry-run backend for harnesses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::endpoint::CoordinatorEndpoint;
use super::session::{CoordinatorConnector, CoordinatorSession};
use crate::error::{CitusNodeError, Result};
use crate::worker::WorkerTarget;

/// SQLSTATE for a rejected password
pub const INVALID_PASSWORD: &str = "28P01";

/// SQLSTATE for a missing database
pub const INVALID_CATALOG_NAME: &str = "3D000";

/// A scripted provider error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedError {
    pub code: String,
    pub message: String,
}

impl ScriptedError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// What the in-memory coordinator should do instead of succeeding
#[derive(Debug, Clone, Default)]
struct Script {
    reject_connect: Option<ScriptedError>,
    fail_membership_check: Option<ScriptedError>,
    fail_add: Option<ScriptedError>,
    ignore_adds: bool,
}

#[derive(Default)]
struct Inner {
    members: RwLock<Vec<WorkerTarget>>,
    script: RwLock<Script>,
    password: RwLock<Option<String>>,
    database: RwLock<Option<String>>,
    connects: AtomicU64,
    membership_checks: AtomicU64,
    add_calls: AtomicU64,
}

/// Coordinator whose membership table lives in memory.
///
/// Clones share the same table and counters.
#[derive(Clone, Default)]
pub struct MemoryCoordinator {
    inner: Arc<Inner>,
}

impl MemoryCoordinator {
    /// Create an empty coordinator that accepts any login
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing active worker
    pub async fn with_member(self, worker: WorkerTarget) -> Self {
        self.inner.members.write().await.push(worker);
        self
    }

    /// Only accept sessions presenting this password
    pub async fn require_password(self, password: impl Into<String>) -> Self {
        *self.inner.password.write().await = Some(password.into());
        self
    }

    /// Only accept sessions bound to this database
    pub async fn serve_database(self, database: impl Into<String>) -> Self {
        *self.inner.database.write().await = Some(database.into());
        self
    }

    /// Refuse every connection with the given error
    pub async fn reject_connections(&self, error: ScriptedError) {
        self.inner.script.write().await.reject_connect = Some(error);
    }

    /// Fail the membership query with the given error
    pub async fn fail_membership_check(&self, error: ScriptedError) {
        self.inner.script.write().await.fail_membership_check = Some(error);
    }

    /// Fail the add call with the given error
    pub async fn fail_add(&self, error: ScriptedError) {
        self.inner.script.write().await.fail_add = Some(error);
    }

    /// Accept add calls but register nothing and report zero rows
    pub async fn ignore_adds(&self) {
        self.inner.script.write().await.ignore_adds = true;
    }

    /// Snapshot of the membership table
    pub async fn members(&self) -> Vec<WorkerTarget> {
        self.inner.members.read().await.clone()
    }

    /// Number of membership records for `worker`
    pub async fn record_count(&self, worker: &WorkerTarget) -> usize {
        self.inner
            .members
            .read()
            .await
            .iter()
            .filter(|w| *w == worker)
            .count()
    }

    /// Connection attempts made so far
    pub fn connect_count(&self) -> u64 {
        self.inner.connects.load(Ordering::Relaxed)
    }

    /// Membership queries issued so far
    pub fn membership_check_count(&self) -> u64 {
        self.inner.membership_checks.load(Ordering::Relaxed)
    }

    /// Add calls issued so far
    pub fn add_node_count(&self) -> u64 {
        self.inner.add_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CoordinatorConnector for MemoryCoordinator {
    type Session = MemorySession;

    async fn connect(&self, endpoint: &CoordinatorEndpoint) -> Result<MemorySession> {
        self.inner.connects.fetch_add(1, Ordering::Relaxed);

        if let Some(error) = self.inner.script.read().await.reject_connect.clone() {
            return Err(CitusNodeError::ConnectionFailed {
                code: Some(error.code),
                message: error.message,
            });
        }

        if let Some(expected) = self.inner.password.read().await.as_deref() {
            let presented = endpoint.password().map(|p| p.expose());
            if presented != Some(expected) {
                return Err(CitusNodeError::ConnectionFailed {
                    code: Some(INVALID_PASSWORD.into()),
                    message: format!(
                        "password authentication failed for user \"{}\"",
                        endpoint.username()
                    ),
                });
            }
        }

        if let Some(served) = self.inner.database.read().await.as_deref() {
            if served != endpoint.database() {
                return Err(CitusNodeError::ConnectionFailed {
                    code: Some(INVALID_CATALOG_NAME.into()),
                    message: format!("database \"{}\" does not exist", endpoint.database()),
                });
            }
        }

        debug!("In-memory coordinator session opened for {}", endpoint);
        Ok(MemorySession {
            inner: self.inner.clone(),
        })
    }
}

/// Session on a [`MemoryCoordinator`]
pub struct MemorySession {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySession")
            .field("membership_checks", &self.inner.membership_checks)
            .field("add_calls", &self.inner.add_calls)
            .finish()
    }
}

#[async_trait]
impl CoordinatorSession for MemorySession {
    async fn active_worker_count(&self, worker: &WorkerTarget) -> Result<u64> {
        self.inner.membership_checks.fetch_add(1, Ordering::Relaxed);

        if let Some(error) = self.inner.script.read().await.fail_membership_check.clone() {
            return Err(CitusNodeError::QueryFailed {
                operation: "membership check",
                code: Some(error.code),
                message: error.message,
            });
        }

        let count = self
            .inner
            .members
            .read()
            .await
            .iter()
            .filter(|w| *w == worker)
            .count();
        Ok(count as u64)
    }

    async fn add_node(&self, worker: &WorkerTarget) -> Result<u64> {
        self.inner.add_calls.fetch_add(1, Ordering::Relaxed);

        let script = self.inner.script.read().await.clone();
        if let Some(error) = script.fail_add {
            return Err(CitusNodeError::QueryFailed {
                operation: "add node",
                code: Some(error.code),
                message: error.message,
            });
        }
        if script.ignore_adds {
            debug!("Ignoring add for {}", worker);
            return Ok(0);
        }

        // The add call itself does not deduplicate; callers check first.
        self.inner.members.write().await.push(worker.clone());
        info!("Registered worker {} in memory", worker);
        Ok(1)
    }
}
