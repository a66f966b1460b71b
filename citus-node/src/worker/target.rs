//! Worker target

use std::fmt;

use crate::error::{CitusNodeError, Result};
use crate::DEFAULT_WORKER_PORT;

/// The (host, port) a worker should be registered under.
///
/// Compared byte-for-byte: no hostname or address normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkerTarget {
    host: String,
    port: u16,
}

impl WorkerTarget {
    /// Create a validated target
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(CitusNodeError::InvalidWorker {
                reason: "worker host must not be empty".into(),
            });
        }
        if port == 0 {
            return Err(CitusNodeError::InvalidWorker {
                reason: format!("worker {} port must be positive", host),
            });
        }
        Ok(Self { host, port })
    }

    /// Target on the default worker port
    pub fn on_default_port(host: impl Into<String>) -> Result<Self> {
        Self::new(host, DEFAULT_WORKER_PORT)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for WorkerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_validation() {
        assert!(WorkerTarget::new("", 5432).is_err());
        assert!(WorkerTarget::new("worker1", 0).is_err());
        let target = WorkerTarget::on_default_port("worker1").unwrap();
        assert_eq!(target.port(), 5432);
        assert_eq!(target.to_string(), "worker1:5432");
    }

    #[test]
    fn test_no_normalization() {
        let a = WorkerTarget::new("worker1", 5432).unwrap();
        let b = WorkerTarget::new("Worker1", 5432).unwrap();
        let c = WorkerTarget::new("worker1.", 5432).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
