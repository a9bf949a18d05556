//! Data files for layout analysis: recipe catalogs, entity lists and
//! analysis configuration, read from RON, JSON or TOML.

pub mod catalog;
pub mod config;
pub mod layout;
pub mod loader;
pub mod schema;

pub use catalog::{build_catalog, load_catalog, load_catalog_str};
pub use config::{AnalysisConfig, load_config};
pub use layout::{LayoutError, classify_entities, load_layout, load_layout_str};
pub use loader::{DataLoadError, Format};
