//! Entity handles for the network graph

use serde::{Deserialize, Serialize};

/// Handle to an ensemble, node or network inside a [`Model`](crate::model::Model)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the object in the model arena
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Handle to a connection inside a [`Model`](crate::model::Model)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(usize);

impl ConnectionId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Internal identity token, stable for the lifetime of the model
    pub fn token(&self) -> usize {
        self.0
    }
}

/// Any entity of the graph that can be given a client-visible UID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Object(ObjectId),
    Connection(ConnectionId),
}

impl From<ObjectId> for EntityRef {
    fn from(id: ObjectId) -> Self {
        EntityRef::Object(id)
    }
}

impl From<ConnectionId> for EntityRef {
    fn from(id: ConnectionId) -> Self {
        EntityRef::Connection(id)
    }
}

/// Kind of a non-connection object, serialized with its wire tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    #[serde(rename = "ens")]
    Ensemble,
    #[serde(rename = "node")]
    Node,
    #[serde(rename = "net")]
    Network,
}

impl ObjectKind {
    /// Wire tag sent in the `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Ensemble => "ens",
            ObjectKind::Node => "node",
            ObjectKind::Network => "net",
        }
    }

    /// Label used when the object was created without one
    pub fn default_label(&self) -> &'static str {
        match self {
            ObjectKind::Ensemble => "Ensemble",
            ObjectKind::Node => "Node",
            ObjectKind::Network => "Network",
        }
    }

    /// Only networks own children
    pub fn is_container(&self) -> bool {
        matches!(self, ObjectKind::Network)
    }
}
