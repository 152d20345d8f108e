//! Data types for the netgraph synchronizer
//!
//! This module contains the handles, attributes and errors shared by the
//! model, the synchronizer and the API layer.

mod attributes;
mod entity;
mod error;

pub use attributes::{VisualAttributes, DEFAULT_SIZE};
pub use entity::{ConnectionId, EntityRef, ObjectId, ObjectKind};
pub use error::SyncError;

/// Result type for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;
