//! citus-node - idempotent Citus worker registration
//!
//! This crate registers a worker node with a Citus coordinator exactly once:
//! - Coordinator sessions behind a pluggable connector
//! - Check-then-add worker reconciliation
//! - A result record for the calling harness

pub mod config;
pub mod coordinator;
pub mod error;
pub mod report;
pub mod worker;

pub use coordinator::{CoordinatorConnector, CoordinatorEndpoint, CoordinatorSession, PgConnector};
pub use error::CitusNodeError;
pub use report::Report;
pub use worker::{reconcile_worker, Outcome, WorkerReconciler, WorkerTarget};

/// Login username used when none is supplied
pub const DEFAULT_COORDINATOR_USERNAME: &str = "postgres";

/// Coordinator port used when none is supplied
pub const DEFAULT_COORDINATOR_PORT: u16 = 5432;

/// Worker port used when none is supplied
pub const DEFAULT_WORKER_PORT: u16 = 5432;
