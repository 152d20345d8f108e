//! Netgraph Sync
//!
//! Reveals a nested network graph to a browser visualizer a level at a time.
//! The client asks for a network to be expanded; the server answers on its
//! next tick with one creation message per direct child.
//!
//! # Modules
//!
//! - `types`: Entity handles, visual attributes and errors
//! - `model`: Arena-backed network graph and model file loading
//! - `protocol`: Inbound commands and outbound creation messages
//! - `sync`: Identity registry, attribute store, expansion queue and synchronizer
//! - `api`: Axum router and the WebSocket session endpoint
//! - `config`: Command-line and environment configuration
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use netgraph_sync::{GraphSynchronizer, Model};
//!
//! let mut model = Model::new("root");
//! let root = model.root();
//! let a = model.add_node(root, "A").unwrap();
//! let b = model.add_network(root, "B").unwrap();
//! let c = model.add_node(b, "C").unwrap();
//! model.connect(b, a, c).unwrap();
//!
//! let mut sync = GraphSynchronizer::new(Arc::new(model));
//! let mut outbox: Vec<String> = Vec::new();
//! sync.tick(&mut outbox).unwrap();
//! assert_eq!(outbox.len(), 2);
//!
//! sync.handle_command(r#"{"act":"expand","uid":"B"}"#).unwrap();
//! sync.tick(&mut outbox).unwrap();
//! assert_eq!(outbox.len(), 4);
//! ```

pub mod api;
pub mod config;
pub mod model;
pub mod protocol;
pub mod sync;
pub mod types;

// Re-export commonly used items at crate root
pub use model::{LoadedModel, Model};
pub use protocol::{ClientCommand, OutboundMessage};
pub use sync::{
    AttributeStore, ExpansionQueue, GraphSynchronizer, IdentityRegistry, MessageChannel,
    SyncSession,
};
pub use types::{EntityRef, ObjectId, ObjectKind, SyncError, SyncResult, VisualAttributes};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
