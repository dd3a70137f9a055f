//! Layout records as exchanged with the persistence backend

use crate::geometry::Geometry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque block identifier, stable for the lifetime of a block
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random (v4) identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty identifier (server assigns one)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Persisted geometry, type and identity of one block on one page.
///
/// Serialized as the flat JSON object the layout service expects:
/// `width, height, posX, posY, pagePath, componentType, uuid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLayoutRecord {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
    /// Left offset in pixels
    pub pos_x: i32,
    /// Top offset in pixels
    pub pos_y: i32,
    /// Page the block belongs to
    pub page_path: String,
    /// Tag selecting the block implementation
    pub component_type: String,
    /// Block identifier
    pub uuid: BlockId,
}

impl BlockLayoutRecord {
    /// Create a record from its parts
    pub fn new(
        uuid: BlockId,
        page_path: impl Into<String>,
        component_type: impl Into<String>,
        geometry: Geometry,
    ) -> Self {
        Self {
            width: geometry.width(),
            height: geometry.height(),
            pos_x: geometry.x(),
            pos_y: geometry.y(),
            page_path: page_path.into(),
            component_type: component_type.into(),
            uuid,
        }
    }

    /// Geometry stored in this record
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.pos_x, self.pos_y, self.width, self.height)
    }

    /// Replace the stored geometry
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.pos_x = geometry.x();
        self.pos_y = geometry.y();
        self.width = geometry.width();
        self.height = geometry.height();
    }
}
