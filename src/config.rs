//! Editor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::history::{DEFAULT_DEBOUNCE, DEFAULT_HISTORY_LIMIT};

pub const DEFAULT_FULLSCREEN_EXIT_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_PLACEHOLDER: &str = "Type '/' for commands...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Snapshots kept for undo.
    pub history_limit: usize,
    /// Quiet period after the last edit before a snapshot is taken.
    #[serde(rename = "history_debounce_ms", with = "millis")]
    pub history_debounce: Duration,
    #[serde(rename = "fullscreen_exit_delay_ms", with = "millis")]
    pub fullscreen_exit_delay: Duration,
    /// Hint shown in the first block while it is empty.
    pub placeholder: String,
    pub disabled: bool,
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            history_debounce: DEFAULT_DEBOUNCE,
            fullscreen_exit_delay: DEFAULT_FULLSCREEN_EXIT_DELAY,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            disabled: false,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.history_debounce, Duration::from_millis(1000));
        assert_eq!(config.fullscreen_exit_delay, Duration::from_millis(500));
        assert!(!config.disabled);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{"history_limit": 5, "history_debounce_ms": 10}"#)
            .unwrap();
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.history_debounce, Duration::from_millis(10));
        assert_eq!(config.placeholder, DEFAULT_PLACEHOLDER);
    }

    #[test]
    fn test_json_round_trip() {
        let config = EditorConfig {
            disabled: true,
            ..EditorConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"fullscreen_exit_delay_ms\":500"));
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }
}
