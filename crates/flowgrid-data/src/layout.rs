//! Entity classification: turns a decoded entity list into a [`Layout`].
//!
//! Entities whose name carries the connector marker become connectors and
//! must name a known connector type. Entities carrying the machine marker
//! and a recipe become machines. Everything else (belts, poles, chests,
//! idle machines) is skipped.

use flowgrid_core::fixed::Fixed64;
use flowgrid_core::layout::{Layout, LayoutBuilder};
use flowgrid_spatial::{ConnectorPlacement, Direction, GridPosition, Reach, SpatialError};
use std::path::Path;

use crate::config::AnalysisConfig;
use crate::loader::{DataLoadError, Format, INLINE_ORIGIN, deserialize_list, parse_list_str};
use crate::schema::{ConnectorTypeData, EntityRecord};

/// TOML files keep the entity list under this key.
const ENTITIES_KEY: &str = "entities";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("unknown connector type: {0}")]
    UnknownConnectorType(String),
    #[error("connector {entity} at ({x}, {y}): {source}")]
    InvalidDirection {
        entity: String,
        x: f64,
        y: f64,
        source: SpatialError,
    },
    #[error("{entity}: {source}")]
    InvalidPosition { entity: String, source: SpatialError },
    #[error("connector type {connector}: {source}")]
    InvalidReach {
        connector: String,
        source: SpatialError,
    },
    #[error("connector type {connector} has invalid capacity {capacity}")]
    InvalidCapacity { connector: String, capacity: f64 },
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify entity records into machines and connectors, in record order.
pub fn classify_entities(
    entities: &[EntityRecord],
    config: &AnalysisConfig,
) -> Result<Layout, LayoutError> {
    let mut builder = LayoutBuilder::new();
    let mut skipped = 0usize;

    for entity in entities {
        if config.is_connector(&entity.name) {
            let kind = config
                .connector_type(&entity.name)
                .ok_or_else(|| LayoutError::UnknownConnectorType(entity.name.clone()))?;
            let placement = connector_placement(entity, kind)?;
            builder.add_connector(&entity.name, placement, rated_capacity(kind)?);
        } else if config.is_machine(&entity.name) {
            let Some(recipe) = &entity.recipe else {
                log::warn!(
                    "{} at ({}, {}) has no recipe; skipped",
                    entity.name,
                    entity.position.x,
                    entity.position.y
                );
                skipped += 1;
                continue;
            };
            let position = grid_position(entity)?;
            builder.add_machine(&entity.name, position, recipe);
        } else {
            log::debug!("skipping unrelated entity {}", entity.name);
            skipped += 1;
        }
    }

    let layout = builder.build();
    log::info!(
        "classified {} entities: {} machine(s), {} connector(s), {} skipped",
        entities.len(),
        layout.machine_count(),
        layout.connector_count(),
        skipped
    );
    Ok(layout)
}

/// The payload direction names the side a connector picks up from, so it
/// delivers the opposite way. An absent direction is code 0.
fn connector_placement(
    entity: &EntityRecord,
    kind: &ConnectorTypeData,
) -> Result<ConnectorPlacement, LayoutError> {
    let pickup_side = Direction::from_code(entity.direction.unwrap_or(0)).map_err(|source| {
        LayoutError::InvalidDirection {
            entity: entity.name.clone(),
            x: entity.position.x,
            y: entity.position.y,
            source,
        }
    })?;
    let reach = Reach::from_cells(kind.reach).map_err(|source| LayoutError::InvalidReach {
        connector: kind.name.clone(),
        source,
    })?;
    Ok(ConnectorPlacement::new(
        grid_position(entity)?,
        pickup_side.opposite(),
        reach,
    ))
}

fn grid_position(entity: &EntityRecord) -> Result<GridPosition, LayoutError> {
    GridPosition::from_payload(entity.position.x, entity.position.y).map_err(|source| {
        LayoutError::InvalidPosition {
            entity: entity.name.clone(),
            source,
        }
    })
}

fn rated_capacity(kind: &ConnectorTypeData) -> Result<Fixed64, LayoutError> {
    Fixed64::checked_from_num(kind.capacity)
        .filter(|c| *c >= Fixed64::ZERO)
        .ok_or_else(|| LayoutError::InvalidCapacity {
            connector: kind.name.clone(),
            capacity: kind.capacity,
        })
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load an entity list file (RON, TOML or JSON) and classify it.
pub fn load_layout(path: &Path, config: &AnalysisConfig) -> Result<Layout, DataLoadError> {
    let entities: Vec<EntityRecord> = deserialize_list(path, ENTITIES_KEY)?;
    Ok(classify_entities(&entities, config)?)
}

/// Load and classify an in-memory entity list.
pub fn load_layout_str(
    content: &str,
    format: Format,
    config: &AnalysisConfig,
) -> Result<Layout, DataLoadError> {
    let entities: Vec<EntityRecord> =
        parse_list_str(content, format, ENTITIES_KEY, Path::new(INLINE_ORIGIN))?;
    Ok(classify_entities(&entities, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PositionData;
    use flowgrid_core::test_utils::assert_rate_eq;

    fn record(name: &str, x: f64, y: f64, direction: Option<u8>, recipe: Option<&str>) -> EntityRecord {
        EntityRecord {
            name: name.to_string(),
            position: PositionData { x, y },
            direction,
            recipe: recipe.map(str::to_string),
        }
    }

    #[test]
    fn classifies_by_name_markers() {
        let entities = [
            record("assembling-machine-2", 0.5, 0.5, None, Some("iron-gear-wheel")),
            record("fast-inserter", 2.5, 0.5, Some(2), None),
            record("transport-belt", 3.5, 0.5, Some(2), None),
            record("assembling-machine-1", 6.5, 0.5, None, None),
        ];
        let layout = classify_entities(&entities, &AnalysisConfig::default()).unwrap();
        assert_eq!(layout.machine_count(), 1);
        assert_eq!(layout.connector_count(), 1);
    }

    #[test]
    fn payload_y_is_inverted() {
        let entities = [record("assembling-machine-1", 0.5, 3.5, None, Some("gear"))];
        let layout = classify_entities(&entities, &AnalysisConfig::default()).unwrap();
        let (_, machine) = layout.machines().next().unwrap();
        assert_eq!(machine.position, GridPosition::new(0, -4));
        assert_eq!(machine.recipe, "gear");
    }

    #[test]
    fn direction_code_names_pickup_side() {
        let config = AnalysisConfig::default();
        let cases = [
            (None, Direction::South),
            (Some(0), Direction::South),
            (Some(2), Direction::West),
            (Some(4), Direction::North),
            (Some(6), Direction::East),
        ];
        for (code, facing) in cases {
            let layout = classify_entities(&[record("inserter", 0.5, 0.5, code, None)], &config).unwrap();
            let (_, connector) = layout.connectors().next().unwrap();
            assert_eq!(connector.placement.facing, facing, "code {code:?}");
        }
    }

    #[test]
    fn connector_type_sets_capacity_and_reach() {
        let entities = [
            record("long-handed-inserter", 0.5, 0.5, None, None),
            record("stack-inserter", 1.5, 0.5, None, None),
        ];
        let layout = classify_entities(&entities, &AnalysisConfig::default()).unwrap();
        let connectors: Vec<_> = layout.connectors().map(|(_, c)| c.clone()).collect();
        assert_eq!(connectors[0].placement.reach, Reach::Long);
        assert_rate_eq(connectors[0].rated_capacity, 1.11);
        assert_eq!(connectors[1].placement.reach, Reach::Short);
        assert_rate_eq(connectors[1].rated_capacity, 3.81);
    }

    #[test]
    fn unknown_connector_type_fails() {
        let entities = [record("burner-inserter", 0.5, 0.5, None, None)];
        let err = classify_entities(&entities, &AnalysisConfig::default()).unwrap_err();
        assert_eq!(err, LayoutError::UnknownConnectorType("burner-inserter".into()));
    }

    #[test]
    fn odd_direction_code_fails() {
        let entities = [record("inserter", 0.5, 0.5, Some(3), None)];
        let err = classify_entities(&entities, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::InvalidDirection { source: SpatialError::InvalidDirectionCode(3), .. }
        ));
        assert!(err.to_string().contains("inserter at (0.5, 0.5)"), "got: {err}");
    }

    #[test]
    fn far_off_grid_positions_fail() {
        let config = AnalysisConfig::default();
        let machine = [record("assembling-machine-1", 5e9, 0.5, None, Some("gear"))];
        let err = classify_entities(&machine, &config).unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidPosition {
                entity: "assembling-machine-1".into(),
                source: SpatialError::CoordinateOutOfRange(5e9),
            }
        );

        let connector = [record("inserter", 0.5, f64::NEG_INFINITY, None, None)];
        assert!(matches!(
            classify_entities(&connector, &config),
            Err(LayoutError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn bad_connector_table_entries_fail() {
        let mut config = AnalysisConfig::default();
        config.connectors[0].reach = 3;
        let entities = [record("inserter", 0.5, 0.5, None, None)];
        assert!(matches!(
            classify_entities(&entities, &config),
            Err(LayoutError::InvalidReach { .. })
        ));

        let mut config = AnalysisConfig::default();
        config.connectors[0].capacity = f64::NAN;
        assert!(matches!(
            classify_entities(&entities, &config),
            Err(LayoutError::InvalidCapacity { .. })
        ));
    }

    #[test]
    fn json_entity_list_loads_and_ignores_extra_fields() {
        let json = r#"[
            {"entity_number": 1, "name": "assembling-machine-2",
             "position": {"x": 0.5, "y": 0.5}, "recipe": "iron-gear-wheel"},
            {"entity_number": 2, "name": "inserter",
             "position": {"x": -1.5, "y": 0.5}, "direction": 6}
        ]"#;
        let layout = load_layout_str(json, Format::Json, &AnalysisConfig::default()).unwrap();
        assert_eq!(layout.machine_count(), 1);
        let (machine, _) = layout.machines().next().unwrap();
        let (connector, _) = layout.connectors().next().unwrap();
        assert_eq!(layout.feeders_of(machine), vec![connector]);
    }

    #[test]
    fn ron_entity_list_loads() {
        let ron = r#"[
            (name: "assembling-machine-1", position: (x: 0.5, y: 0.5), recipe: Some("gear")),
            (name: "inserter", position: (x: 2.5, y: 0.5), direction: Some(2)),
        ]"#;
        let layout = load_layout_str(ron, Format::Ron, &AnalysisConfig::default()).unwrap();
        assert_eq!(layout.machine_count(), 1);
        assert_eq!(layout.connector_count(), 1);
    }

    #[test]
    fn layout_errors_surface_through_loader() {
        let json = r#"[{"name": "mystery-inserter", "position": {"x": 0, "y": 0}}]"#;
        let err = load_layout_str(json, Format::Json, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, DataLoadError::Layout(LayoutError::UnknownConnectorType(_))));
    }
}
