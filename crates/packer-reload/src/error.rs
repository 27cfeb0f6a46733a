//! Error types for the notification pipeline.
//!
//! Only [`ReloadError`] ever reaches a caller. The other two are logged by the
//! pipeline and confined to the artifact or listener that caused them.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReloadError>;

/// Content of an emitted artifact could not be hashed.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("cannot read emitted artifact '{file}': {source}")]
    Unreadable {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

/// A single listener did not accept a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerDeliveryError {
    #[error("listener disconnected")]
    Disconnected,

    #[error("listener backlog is full, batch dropped")]
    Backlogged,

    #[error("listener rejected batch: {0}")]
    Rejected(String),
}

impl ListenerDeliveryError {
    /// Whether the listener is gone for good and should be unregistered.
    pub fn is_permanent(&self) -> bool {
        matches!(self, ListenerDeliveryError::Disconnected)
    }
}

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("reload pipeline has stopped")]
    PipelineClosed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn unreadable_keeps_io_source() {
        let err = FingerprintError::Unreadable {
            file: "main.js".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "cannot read emitted artifact 'main.js': gone");
        assert!(err.source().is_some());
    }

    #[test]
    fn only_disconnect_is_permanent() {
        assert!(ListenerDeliveryError::Disconnected.is_permanent());
        assert!(!ListenerDeliveryError::Backlogged.is_permanent());
        assert!(!ListenerDeliveryError::Rejected("closed tab".into()).is_permanent());
    }
}
