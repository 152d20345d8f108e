//! Error types for graph synchronization

use thiserror::Error;

/// Errors raised by the synchronization core
#[derive(Error, Debug)]
pub enum SyncError {
    /// The client referenced a UID that was never assigned in this session
    #[error("Unknown UID: {0}")]
    UnknownUid(String),

    /// The client sent an action this server does not handle
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The client frame was not a well-formed command
    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    /// Expand/collapse targeted an entity that owns no children
    #[error("Not a container: {0}")]
    NotAContainer(String),

    /// Position/size update targeted an entity without geometry
    #[error("Entity has no geometry: {0}")]
    NoGeometry(String),

    /// The transport failed to accept an outbound message
    #[error("Channel write failed: {0}")]
    ChannelWrite(String),

    /// The server could not listen on the configured address
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The graph model is inconsistent or could not be built
    #[error("Invalid model: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Whether the session can keep running after this error.
    ///
    /// Command-level failures only drop the offending command; transport and
    /// model failures end the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SyncError::UnknownUid(_)
                | SyncError::UnknownAction(_)
                | SyncError::MalformedCommand(_)
                | SyncError::NotAContainer(_)
                | SyncError::NoGeometry(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_errors_are_recoverable() {
        assert!(SyncError::UnknownUid("x".to_string()).is_recoverable());
        assert!(SyncError::UnknownAction("fly".to_string()).is_recoverable());
        assert!(!SyncError::ChannelWrite("closed".to_string()).is_recoverable());
        assert!(!SyncError::Model("object #9 does not exist".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::UnknownUid("ghost".to_string());
        assert_eq!(err.to_string(), "Unknown UID: ghost");
    }
}
