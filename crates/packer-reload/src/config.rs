//! Live-reload settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_debounce_ms() -> u64 {
    150
}

fn default_channel_capacity() -> usize {
    100
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadConfig {
    /// Quiet period after the last change before listeners are notified
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Batches buffered per channel listener before deliveries are dropped
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl ReloadConfig {
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: ReloadConfig = serde_json::from_str(r#"{ "debounceMs": 40 }"#).unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(40));
        assert_eq!(config.channel_capacity, 100);
        assert_eq!(ReloadConfig::default().debounce_ms, 150);
    }
}
