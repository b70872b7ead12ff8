//! Operation deadlines

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default deadline for every operation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Per-operation deadlines
///
/// Each bounds the whole operation, including the wait for the vault lock.
/// An expired deadline fails the operation with
/// [`ContactError::Timeout`](crate::core::ContactError::Timeout); nothing is
/// rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Deadline for create (including the trailing read)
    #[serde(with = "humantime_serde")]
    pub create: Duration,

    /// Deadline for read and data lookups
    #[serde(with = "humantime_serde")]
    pub read: Duration,

    /// Deadline for update (including the trailing read)
    #[serde(with = "humantime_serde")]
    pub update: Duration,

    /// Deadline for delete
    #[serde(with = "humantime_serde")]
    pub delete: Duration,
}

impl Timeouts {
    /// Same deadline for every operation
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            create: timeout,
            read: timeout,
            update: timeout,
            delete: timeout,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::uniform(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_five_minutes() {
        let t = Timeouts::default();
        assert_eq!(t.create, Duration::from_secs(300));
        assert_eq!(t.delete, Duration::from_secs(300));
    }

    #[test]
    fn test_humantime_partial() {
        let t: Timeouts = serde_json::from_str(r#"{ "read": "30s", "delete": "2m" }"#).unwrap();
        assert_eq!(t.read, Duration::from_secs(30));
        assert_eq!(t.delete, Duration::from_secs(120));
        assert_eq!(t.create, DEFAULT_TIMEOUT);
    }
}
