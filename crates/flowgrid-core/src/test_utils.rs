//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::catalog::{RecipeCatalog, RecipeCatalogBuilder};
use crate::fixed::Fixed64;
use crate::id::*;
use crate::layout::LayoutBuilder;
use flowgrid_spatial::{ConnectorPlacement, Direction, GridPosition, Reach};

// ===========================================================================
// Fixed-point helpers
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Assert two fixed-point values agree to within `1e-6`.
#[track_caller]
pub fn assert_rate_eq(actual: Fixed64, expected: f64) {
    let actual = actual.to_num::<f64>();
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected} items/s, got {actual}"
    );
}

// ===========================================================================
// Geometry helpers
// ===========================================================================

/// The cell just east of a machine's footprint, on its center row.
pub fn plate_edge(cx: i32, cy: i32) -> GridPosition {
    GridPosition::new(cx + 2, cy)
}

/// A short connector at `pos` that delivers eastward.
pub fn east_of(pos: GridPosition) -> ConnectorPlacement {
    ConnectorPlacement::new(pos, Direction::East, Reach::Short)
}

// ===========================================================================
// Catalog fixtures
// ===========================================================================

/// A small electronics chain:
/// - `iron-plate` and `copper-plate`: 3.2s, no inputs
/// - `copper-cable`: 0.5s, 1 copper-plate -> 2
/// - `iron-gear-wheel`: 0.5s, 2 iron-plate -> 1
/// - `electronic-circuit`: 0.5s, 1 iron-plate + 3 copper-cable -> 1
pub fn electronics_catalog() -> RecipeCatalog {
    let mut b = RecipeCatalogBuilder::new();
    b.register_recipe("iron-plate", fixed(3.2), 1, &[]);
    b.register_recipe("copper-plate", fixed(3.2), 1, &[]);
    b.register_recipe("copper-cable", fixed(0.5), 2, &[("copper-plate", 1)]);
    b.register_recipe("iron-gear-wheel", fixed(0.5), 1, &[("iron-plate", 2)]);
    b.register_recipe(
        "electronic-circuit",
        fixed(0.5),
        1,
        &[("iron-plate", 1), ("copper-cable", 3)],
    );
    b.build().expect("fixture catalog is valid")
}

// ===========================================================================
// Layout fixtures
// ===========================================================================

/// A row of machines with centers four cells apart, each fed by the previous one
/// through a connector of the given capacity, with the first fed by an
/// untracked source. Returns the machine IDs and connector IDs in order.
pub fn chain_layout(
    builder: &mut LayoutBuilder,
    recipes: &[&str],
    capacity: Fixed64,
) -> (Vec<MachineId>, Vec<ConnectorId>) {
    let mut machines = Vec::with_capacity(recipes.len());
    let mut connectors = Vec::with_capacity(recipes.len());
    for (i, recipe) in recipes.iter().enumerate() {
        let cx = i as i32 * 4;
        connectors.push(builder.add_connector("inserter", east_of(GridPosition::new(cx - 2, 0)), capacity));
        machines.push(builder.add_machine("assembling-machine-2", GridPosition::new(cx, 0), recipe));
    }
    (machines, connectors)
}
