//! Coordinator session
//!
//! Endpoint model, the connector/session seam and its two implementations.

pub mod endpoint;
pub mod memory;
pub mod postgres;
pub mod session;

pub use endpoint::{CoordinatorEndpoint, Secret};
pub use memory::{MemoryCoordinator, MemorySession, ScriptedError};
pub use postgres::{PgConnector, PgSession};
pub use session::{open, CoordinatorConnector, CoordinatorSession};
