//! Core minimap types shared across all modules.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Resource categories
// ---------------------------------------------------------------------------

/// Resource category of a map object.
///
/// The discriminants are the raw protocol kind codes. Their order is part of
/// the wire contract and must not be rearranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Wood = 0,
    Food = 1,
    Stone = 2,
    Points = 3,
}

impl Category {
    /// All categories in kind-code order.
    pub const ALL: [Category; 4] = [
        Category::Wood,
        Category::Food,
        Category::Stone,
        Category::Points,
    ];

    /// Map a raw kind code onto its category.
    ///
    /// Returns `None` for every code outside the known set (item objects and
    /// anything newer are not supported).
    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Wood => "wood",
            Category::Food => "food",
            Category::Stone => "stone",
            Category::Points => "points",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// One observed map object, as decoded from a resource snapshot record.
///
/// `direction`, `scale`, `item` and `owner` are not used for drawing but are
/// kept so the full record survives decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub session_id: u64,
    pub x: f64,
    pub y: f64,
    /// Facing, radians.
    pub direction: f64,
    pub scale: f64,
    /// Raw protocol kind code.
    pub kind: i64,
    pub category: Category,
    /// Opaque wire values; binary and extension payloads are kept as is.
    pub item: rmpv::Value,
    pub owner: rmpv::Value,
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Width/height pair, in world units or pixels depending on use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A position on the display surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
