use serde::{Deserialize, Serialize};

/// Display payload for a room as the catalog returned it. The engine only
/// ever reads the name; everything else is carried for the rendering layer
/// and round-tripped untouched through cart persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetails {
    /// Catalog room-type code, e.g. "QUAD" or "TRIPLE".
    pub room_type: String,
    /// Guest-facing name in the active language.
    pub name: String,
    #[serde(default)]
    pub photos: Vec<String>,
    /// Whatever else the catalog sent (bed setup, view, amenities).
    #[serde(default)]
    pub extra: serde_json::Value,
}

impl RoomDetails {
    pub fn new(room_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            room_type: room_type.into(),
            name: name.into(),
            photos: Vec::new(),
            extra: serde_json::Value::Null,
        }
    }
}
