//! Locked synchronization session
//!
//! The tick loop and the command reader run as separate tasks. Both go
//! through the same mutex, so a tick always sees a stable registry and queue,
//! and a command never lands halfway through an expansion.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use super::{GraphSynchronizer, MessageChannel};
use crate::protocol::ClientCommand;
use crate::types::{SyncError, SyncResult};

/// Shared handle to one client's synchronizer
#[derive(Clone)]
pub struct SyncSession {
    id: u64,
    inner: Arc<Mutex<GraphSynchronizer>>,
}

impl SyncSession {
    pub fn new(id: u64, synchronizer: GraphSynchronizer) -> Self {
        Self {
            id,
            inner: Arc::new(Mutex::new(synchronizer)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Run one tick under the session lock.
    ///
    /// The channel must not block; a write failure is returned so the owner
    /// can tear the session down.
    pub fn tick<C>(&self, channel: &mut C) -> SyncResult<usize>
    where
        C: MessageChannel + ?Sized,
    {
        self.inner.lock().tick(channel)
    }

    /// Apply one client frame under the session lock.
    ///
    /// The frame is parsed before the lock is taken. Command errors never
    /// reach the client; recoverable ones are logged and the command is
    /// dropped. Returns whether the command was applied.
    pub fn handle_message(&self, text: &str) -> bool {
        let command = match ClientCommand::parse(text) {
            Ok(command) => command,
            Err(e) => {
                self.report(&e);
                return false;
            }
        };
        let action = command.action();
        let uid = command.uid().to_string();

        let result = self.inner.lock().apply(command);
        match result {
            Ok(()) => {
                debug!(session = self.id, action, %uid, "Applied client command");
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    fn report(&self, e: &SyncError) {
        match e {
            SyncError::UnknownAction(action) => {
                warn!(session = self.id, %action, "Ignoring unknown client action");
            }
            e if e.is_recoverable() => {
                warn!(session = self.id, error = %e, "Dropping client command");
            }
            e => {
                error!(session = self.id, error = %e, "Client command failed");
            }
        }
    }

    /// Containers still waiting to be expanded
    pub fn pending(&self) -> usize {
        self.inner.lock().pending()
    }

    /// Run `f` with exclusive access to the synchronizer
    pub fn with_synchronizer<T>(&self, f: impl FnOnce(&GraphSynchronizer) -> T) -> T {
        f(&self.inner.lock())
    }
}
