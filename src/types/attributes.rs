//! Per-object visual configuration

use serde::{Deserialize, Serialize};

/// Size given to objects that have none configured
pub const DEFAULT_SIZE: (f64, f64) = (0.04, 0.04);

/// Visual attributes of an ensemble, node or network.
///
/// Unset position and size are filled in when the object is emitted, never
/// when it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<(f64, f64)>,
    #[serde(default)]
    pub expanded: bool,
}

impl VisualAttributes {
    /// Attributes with an explicit position and size
    pub fn placed(pos: (f64, f64), size: (f64, f64)) -> Self {
        Self {
            pos: Some(pos),
            size: Some(size),
            expanded: false,
        }
    }

    /// Whether nothing has been configured
    pub fn is_unset(&self) -> bool {
        self.pos.is_none() && self.size.is_none() && !self.expanded
    }
}
