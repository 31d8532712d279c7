//! Host-level error taxonomy.
//!
//! None of these errors are fatal. Callers log them and degrade to "the effect
//! simply does not play".

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HostError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("element not found: {what}")]
    MissingElement { what: String },

    #[error("capability unavailable: {capability}")]
    Unsupported { capability: &'static str },

    #[error("media playback rejected: {reason}")]
    PlaybackRejected { reason: String },

    #[error("storage unavailable: {reason}")]
    Storage { reason: String },

    #[error("unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u32 },

    #[error("resource ledger is closed")]
    LedgerClosed,

    #[error("platform error: {message}")]
    Platform { message: String },
}

impl HostError {
    #[must_use]
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::Storage {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingElement { what: what.into() }
    }

    /// Whether the error only signals that teardown already started.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::LedgerClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_name_the_failure() {
        let err = HostError::UnknownHandle {
            kind: "frame",
            id: 7,
        };
        assert_eq!(err.to_string(), "unknown frame handle 7");
        assert_eq!(
            HostError::storage("quota").to_string(),
            "storage unavailable: quota"
        );
    }

    #[test]
    fn closed_is_distinguished() {
        assert!(HostError::LedgerClosed.is_closed());
        assert!(!HostError::platform("boom").is_closed());
    }
}
