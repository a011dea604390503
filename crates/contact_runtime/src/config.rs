//! Runtime configuration read from boot flags.

use std::time::Duration;

use contact_host::{ListOptions, PositionOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default local database name.
pub const DEFAULT_DATABASE_NAME: &str = "textlocation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Runtime knobs. Every field has a default, so partial flag objects are accepted.
pub struct RuntimeConfig {
    /// Name of the local document database.
    pub database_name: String,
    /// Timeout for one-shot position requests and continuous observation, in milliseconds.
    pub position_timeout_ms: u64,
    /// Whether `ContactsChanged` payloads carry attachment bodies.
    pub include_attachments: bool,
    /// Whether boot issues an initial `GetAllContacts`.
    pub sync_on_boot: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            position_timeout_ms: 5_000,
            include_attachments: true,
            sync_on_boot: true,
        }
    }
}

impl RuntimeConfig {
    /// Decodes a config object.
    ///
    /// # Errors
    ///
    /// Returns an error when a present field has the wrong type.
    pub fn from_json(value: Value) -> Result<Self, String> {
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    /// Decodes optional boot flags, falling back to defaults on absence or malformed input.
    pub fn from_flags(flags: Option<Value>) -> Self {
        match flags {
            None | Some(Value::Null) => Self::default(),
            Some(value) => Self::from_json(value).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "invalid runtime flags, using defaults");
                Self::default()
            }),
        }
    }

    /// Position request options derived from the configured timeout.
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            timeout: Duration::from_millis(self.position_timeout_ms),
        }
    }

    /// Listing options used for every re-sync.
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            include_attachments: self.include_attachments,
        }
    }
}

#[cfg(test)]
mod tests {
    use contact_host::DEFAULT_POSITION_TIMEOUT;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_match_platform_constants() {
        let config = RuntimeConfig::default();
        assert_eq!(config.database_name, "textlocation");
        assert_eq!(config.position_options().timeout, DEFAULT_POSITION_TIMEOUT);
        assert!(config.list_options().include_attachments);
        assert!(config.sync_on_boot);
    }

    #[test]
    fn partial_flags_keep_remaining_defaults() {
        let config = RuntimeConfig::from_flags(Some(json!({"position_timeout_ms": 1500})));
        assert_eq!(
            config,
            RuntimeConfig {
                position_timeout_ms: 1500,
                ..RuntimeConfig::default()
            }
        );
    }

    #[test]
    fn malformed_or_missing_flags_fall_back_to_defaults() {
        assert_eq!(
            RuntimeConfig::from_flags(Some(json!({"sync_on_boot": "yes"}))),
            RuntimeConfig::default()
        );
        assert_eq!(RuntimeConfig::from_flags(Some(json!(12345))), RuntimeConfig::default());
        assert_eq!(RuntimeConfig::from_flags(None), RuntimeConfig::default());
    }
}
