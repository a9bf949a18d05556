//! Serde data file structs.
//!
//! These mirror the on-disk shapes: the recipe list, the decoded entity
//! list of a layout, and the connector-type table of the analysis config.
//! Loaders turn them into core types.

use serde::{Deserialize, Serialize};

// ===========================================================================
// Recipes
// ===========================================================================

/// One input of a recipe, per batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeItemData {
    pub name: String,
    pub qty: u32,
}

/// A recipe entry. The produced item carries the recipe's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeData {
    pub name: String,
    /// Seconds per batch.
    pub time: f64,
    #[serde(rename = "produce-qty", default = "default_produce_qty")]
    pub produce_qty: u32,
    #[serde(default)]
    pub items: Vec<RecipeItemData>,
}

fn default_produce_qty() -> u32 {
    1
}

// ===========================================================================
// Entities
// ===========================================================================

/// Tile-center coordinates as written in the layout payload (y grows south).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionData {
    pub x: f64,
    pub y: f64,
}

/// One decoded layout entity. Fields the analysis does not use are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    pub position: PositionData,
    /// Payload direction code (0, 2, 4, 6). Omitted when 0.
    #[serde(default)]
    pub direction: Option<u8>,
    #[serde(default)]
    pub recipe: Option<String>,
}

// ===========================================================================
// Config
// ===========================================================================

/// A connector type: its name, rated capacity in items per second, and
/// reach in cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorTypeData {
    pub name: String,
    pub capacity: f64,
    #[serde(default = "default_reach")]
    pub reach: u32,
}

fn default_reach() -> u32 {
    1
}
