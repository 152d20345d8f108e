//! Server -> client messages

use serde::{Deserialize, Serialize};

use crate::types::ObjectKind;

/// Creation message for an ensemble, node or network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectCreated {
    pub uid: String,
    pub label: String,
    pub pos: [f64; 2],
    pub size: [f64; 2],
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub parent: Option<String>,
}

/// Wire tag of connection messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionTag {
    #[default]
    #[serde(rename = "conn")]
    Conn,
}

/// Creation message for a connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionCreated {
    pub uid: String,
    pub pre: String,
    pub post: String,
    #[serde(rename = "type")]
    pub kind: ConnectionTag,
    pub parent: Option<String>,
}

/// Any message emitted by the synchronizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Object(ObjectCreated),
    Connection(ConnectionCreated),
}

impl OutboundMessage {
    pub fn uid(&self) -> &str {
        match self {
            OutboundMessage::Object(o) => &o.uid,
            OutboundMessage::Connection(c) => &c.uid,
        }
    }

    pub fn parent(&self) -> Option<&str> {
        match self {
            OutboundMessage::Object(o) => o.parent.as_deref(),
            OutboundMessage::Connection(c) => c.parent.as_deref(),
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, OutboundMessage::Connection(_))
    }
}

/// Bootstrap descriptor sent once when a socket opens
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionDescriptor {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub id: u64,
    pub tick_ms: u64,
}

impl SessionDescriptor {
    pub fn new(id: u64, tick_ms: u64) -> Self {
        Self {
            msg_type: "netgraph".to_string(),
            id,
            tick_ms,
        }
    }
}
