//! Outbound message sinks

use tokio::sync::mpsc;

use crate::types::{SyncError, SyncResult};

/// Sink for serialized outbound messages.
///
/// Writes must not block: the synchronizer calls this while holding the
/// session lock.
pub trait MessageChannel {
    fn write(&mut self, message: String) -> SyncResult<()>;
}

/// In-memory outbox
impl MessageChannel for Vec<String> {
    fn write(&mut self, message: String) -> SyncResult<()> {
        self.push(message);
        Ok(())
    }
}

/// Hand-off to a socket writer task
impl MessageChannel for mpsc::UnboundedSender<String> {
    fn write(&mut self, message: String) -> SyncResult<()> {
        self.send(message)
            .map_err(|_| SyncError::ChannelWrite("socket writer has shut down".to_string()))
    }
}
