//! Coordinator endpoint
//!
//! Connection parameters for the coordinator node. The password is held in a
//! [`Secret`] so it never reaches `Debug` output or log lines.

use std::fmt;

use crate::error::{CitusNodeError, Result};
use crate::{DEFAULT_COORDINATOR_PORT, DEFAULT_COORDINATOR_USERNAME};

/// Placeholder written wherever a secret would otherwise appear
pub const REDACTED: &str = "********";

/// A credential that is never printed
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a credential. Empty strings are treated as "no credential".
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Plaintext value, for handing to the driver only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Replace every occurrence of the secret in `text`
    pub fn scrub(&self, text: &str) -> String {
        text.replace(&self.0, REDACTED)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", REDACTED)
    }
}

/// Where and how to log in to the coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorEndpoint {
    host: String,
    port: u16,
    username: String,
    password: Option<Secret>,
    database: String,
}

impl CoordinatorEndpoint {
    /// Create an endpoint with the default port, username and no password
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_COORDINATOR_PORT,
            username: DEFAULT_COORDINATOR_USERNAME.into(),
            password: None,
            database: database.into(),
        }
    }

    /// Set port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set login username
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set login password. An empty password leaves it unset.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Secret::new(password);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> Option<&Secret> {
        self.password.as_ref()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Check the endpoint before any connection attempt
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(CitusNodeError::InvalidEndpoint {
                reason: "coordinator host must not be empty".into(),
            });
        }
        if self.database.trim().is_empty() {
            return Err(CitusNodeError::InvalidEndpoint {
                reason: "database name must not be empty".into(),
            });
        }
        if self.port == 0 {
            return Err(CitusNodeError::InvalidEndpoint {
                reason: "coordinator port must be positive".into(),
            });
        }
        if self.username.is_empty() {
            return Err(CitusNodeError::InvalidEndpoint {
                reason: "coordinator username must not be empty".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for CoordinatorEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}/{}", self.username, self.host, self.port, self.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let endpoint = CoordinatorEndpoint::new("coord1", "citus");
        assert_eq!(endpoint.port(), 5432);
        assert_eq!(endpoint.username(), "postgres");
        assert!(endpoint.password().is_none());
        endpoint.validate().unwrap();
    }

    #[test]
    fn test_debug_redacts_password() {
        let endpoint = CoordinatorEndpoint::new("coord1", "citus").with_password("hunter2");
        let debug = format!("{:?}", endpoint);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains(REDACTED));
        assert!(!endpoint.to_string().contains("hunter2"));
    }

    #[test]
    fn test_empty_password_is_unset() {
        let endpoint = CoordinatorEndpoint::new("coord1", "citus").with_password("");
        assert!(endpoint.password().is_none());
    }

    #[test]
    fn test_validation() {
        assert!(CoordinatorEndpoint::new("", "citus").validate().is_err());
        assert!(CoordinatorEndpoint::new("coord1", " ").validate().is_err());
        assert!(CoordinatorEndpoint::new("coord1", "citus")
            .with_port(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_scrub() {
        let secret = Secret::new("s3cr3t").unwrap();
        assert_eq!(
            secret.scrub("bad password s3cr3t for s3cr3t"),
            "bad password ******** for ********"
        );
    }
}
