//! API module for HTTP and WebSocket endpoints
//!
//! This module serves the netgraph synchronization socket and a couple of
//! plain HTTP endpoints for health and model inspection.

pub mod http;
pub mod websocket;

pub use http::create_router;
