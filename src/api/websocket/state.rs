//! WebSocket application state

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::model::{LoadedModel, Model};
use crate::sync::{AttributeStore, GraphSynchronizer, SyncSession};

/// Shared application state for WebSocket connections
pub struct AppState {
    /// The graph every session reveals; read-only once serving starts
    pub model: Arc<Model>,

    /// Configured visual overrides, copied into each new session
    pub attributes: AttributeStore,

    /// Interval between synchronization ticks
    pub tick_interval: Duration,

    /// Monotonically increasing session counter
    session_counter: AtomicU64,
}

impl AppState {
    /// Create a new AppState serving `model`
    pub fn new(model: Arc<Model>, attributes: AttributeStore, tick_interval: Duration) -> Self {
        Self {
            model,
            attributes,
            tick_interval,
            session_counter: AtomicU64::new(0),
        }
    }

    /// Create state from a loaded model file
    pub fn from_loaded(loaded: LoadedModel, tick_interval: Duration) -> Self {
        let attributes = AttributeStore::from_overrides(loaded.attributes);
        Self::new(Arc::new(loaded.model), attributes, tick_interval)
    }

    /// Start a fresh session; registry and queue state is never shared
    pub fn open_session(&self) -> SyncSession {
        let id = self.session_counter.fetch_add(1, Ordering::SeqCst);
        let synchronizer = GraphSynchronizer::new(Arc::clone(&self.model))
            .with_attributes(self.attributes.clone());
        SyncSession::new(id, synchronizer)
    }

    /// Number of sessions opened so far
    pub fn sessions_opened(&self) -> u64 {
        self.session_counter.load(Ordering::SeqCst)
    }

    /// Tick interval in whole milliseconds
    pub fn tick_ms(&self) -> u64 {
        self.tick_interval.as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::demo_model;

    #[test]
    fn test_sessions_get_distinct_ids() {
        let state = AppState::from_loaded(demo_model().unwrap(), Duration::from_millis(50));

        let first = state.open_session();
        let second = state.open_session();

        assert_ne!(first.id(), second.id());
        assert_eq!(state.sessions_opened(), 2);
        assert_eq!(state.tick_ms(), 50);
    }

    #[test]
    fn test_sessions_do_not_share_registries() {
        let state = AppState::from_loaded(demo_model().unwrap(), Duration::from_millis(50));
        let first = state.open_session();
        let second = state.open_session();

        let mut outbox: Vec<String> = Vec::new();
        first.tick(&mut outbox).unwrap();

        assert_eq!(second.pending(), 1);
        second.with_synchronizer(|sync| assert!(sync.registry().is_empty()));
        first.with_synchronizer(|sync| assert!(!sync.registry().is_empty()));
    }
}
