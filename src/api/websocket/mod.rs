//! WebSocket module for incremental graph synchronization
//!
//! Provides the `/ws` endpoint. Every connection opens its own session, is
//! greeted with a session descriptor and then receives creation messages as
//! networks are expanded.

pub mod handler;
pub mod state;

pub use handler::ws_handler;
pub use state::AppState;
