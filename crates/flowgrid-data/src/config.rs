//! Analysis configuration: the connector-type table and the entity-name
//! rules used to classify layout entities.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::loader::{DataLoadError, deserialize_file};
use crate::schema::ConnectorTypeData;

/// Classification rules and connector ratings.
///
/// Every field has a built-in default, so a config file only needs to list
/// what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Known connector types. Lookups are by exact name.
    pub connectors: Vec<ConnectorTypeData>,
    /// Entities whose name contains this are connectors.
    pub connector_marker: String,
    /// Entities whose name contains this, and that carry a recipe, are machines.
    pub machine_marker: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let connector = |name: &str, capacity: f64, reach: u32| ConnectorTypeData {
            name: name.to_string(),
            capacity,
            reach,
        };
        Self {
            connectors: vec![
                connector("inserter", 0.74, 1),
                connector("long-handed-inserter", 1.11, 2),
                connector("fast-inserter", 2.22, 1),
                connector("filter-inserter", 2.22, 1),
                connector("stack-inserter", 3.81, 1),
                connector("stack-filter-inserter", 3.81, 1),
            ],
            connector_marker: "inserter".to_string(),
            machine_marker: "assembling".to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn connector_type(&self, name: &str) -> Option<&ConnectorTypeData> {
        self.connectors.iter().find(|c| c.name == name)
    }

    pub fn is_connector(&self, entity: &str) -> bool {
        entity.contains(&self.connector_marker)
    }

    pub fn is_machine(&self, entity: &str) -> bool {
        entity.contains(&self.machine_marker)
    }
}

/// Load an analysis config file (RON, TOML or JSON).
pub fn load_config(path: &Path) -> Result<AnalysisConfig, DataLoadError> {
    let config: AnalysisConfig = deserialize_file(path)?;
    log::debug!(
        "loaded analysis config from {}: {} connector type(s)",
        path.display(),
        config.connectors.len()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{Format, parse_str};
    use std::path::PathBuf;

    #[test]
    fn default_table_matches_known_ratings() {
        let config = AnalysisConfig::default();
        assert_eq!(config.connectors.len(), 6);
        let long = config.connector_type("long-handed-inserter").unwrap();
        assert_eq!(long.capacity, 1.11);
        assert_eq!(long.reach, 2);
        assert_eq!(config.connector_type("stack-inserter").unwrap().capacity, 3.81);
        assert!(config.connector_type("burner-inserter").is_none());
    }

    #[test]
    fn markers_match_by_substring() {
        let config = AnalysisConfig::default();
        assert!(config.is_connector("fast-inserter"));
        assert!(config.is_machine("assembling-machine-3"));
        assert!(!config.is_machine("transport-belt"));
        assert!(!config.is_connector("chemical-plant"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml = r#"
machine_marker = "plant"

[[connectors]]
name = "inserter"
capacity = 0.83
"#;
        let config: AnalysisConfig =
            parse_str(toml, Format::Toml, &PathBuf::from("config.toml")).unwrap();
        assert_eq!(config.machine_marker, "plant");
        assert_eq!(config.connector_marker, "inserter");
        assert_eq!(config.connectors.len(), 1);
        assert_eq!(config.connectors[0].reach, 1);
    }

    #[test]
    fn ron_config_parses() {
        let ron = r#"(
            connectors: [(name: "grabber", capacity: 1.5, reach: 2)],
            connector_marker: "grabber",
        )"#;
        let config: AnalysisConfig =
            parse_str(ron, Format::Ron, &PathBuf::from("config.ron")).unwrap();
        assert_eq!(config.connector_type("grabber").unwrap().reach, 2);
        assert_eq!(config.machine_marker, "assembling");
    }

    #[test]
    fn load_config_from_json_file() {
        let dir = std::env::temp_dir().join(format!("flowgrid_config_test_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("analysis.json");
        std::fs::write(&path, r#"{"connector_marker": "arm"}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.connector_marker, "arm");
        assert_eq!(config.connectors, AnalysisConfig::default().connectors);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
