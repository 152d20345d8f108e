//! Client -> server commands

use serde::Deserialize;
use serde_json::Value;

use crate::types::{SyncError, SyncResult};

/// Action names accepted in the `act` field
pub const ACTIONS: &[&str] = &["expand", "collapse", "autoCollapse", "posSize"];

/// Command sent by the visualization client
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "act", rename_all = "camelCase")]
pub enum ClientCommand {
    /// Queue a network for expansion
    Expand { uid: String },

    /// Forget that a network was expanded
    Collapse { uid: String },

    /// Client collapsed a network on its own, e.g. while zooming out
    AutoCollapse { uid: String },

    /// Client moved or resized an object
    PosSize {
        uid: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl ClientCommand {
    /// Parse one text frame.
    ///
    /// An unrecognized `act` yields [`SyncError::UnknownAction`]; anything
    /// else that does not fit a command yields
    /// [`SyncError::MalformedCommand`].
    pub fn parse(text: &str) -> SyncResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| SyncError::MalformedCommand(e.to_string()))?;

        let action = value
            .get("act")
            .and_then(Value::as_str)
            .ok_or_else(|| SyncError::MalformedCommand(format!("missing \"act\" in {}", text)))?;
        if !ACTIONS.contains(&action) {
            return Err(SyncError::UnknownAction(action.to_string()));
        }

        serde_json::from_value(value).map_err(|e| SyncError::MalformedCommand(e.to_string()))
    }

    /// Wire name of the action
    pub fn action(&self) -> &'static str {
        match self {
            ClientCommand::Expand { .. } => "expand",
            ClientCommand::Collapse { .. } => "collapse",
            ClientCommand::AutoCollapse { .. } => "autoCollapse",
            ClientCommand::PosSize { .. } => "posSize",
        }
    }

    /// UID the command targets
    pub fn uid(&self) -> &str {
        match self {
            ClientCommand::Expand { uid }
            | ClientCommand::Collapse { uid }
            | ClientCommand::AutoCollapse { uid }
            | ClientCommand::PosSize { uid, .. } => uid,
        }
    }
}
