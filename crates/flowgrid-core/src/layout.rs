//! Layout entity store and adjacency resolution.
//!
//! A [`Layout`] owns every machine and connector of an analyzed factory.
//! It stores no edges: who feeds whom is answered on demand from geometry,
//! by testing connector endpoints against machine footprints.

use crate::fixed::Fixed64;
use crate::id::*;
use flowgrid_spatial::{ConnectorPlacement, Footprint, GridPosition};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Node data
// ---------------------------------------------------------------------------

/// A production machine: a 3x3 footprint running a single recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineNode {
    /// Entity-type name from the layout payload.
    pub entity: String,
    /// Center of the footprint.
    pub position: GridPosition,
    /// Recipe name, resolved against the catalog during analysis.
    pub recipe: String,
}

impl MachineNode {
    pub fn footprint(&self) -> Footprint {
        Footprint::centered_on(self.position)
    }
}

/// A transport connector moving items from its pickup cell to its drop-off
/// cell at a bounded rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorNode {
    /// Entity-type name from the layout payload.
    pub entity: String,
    pub placement: ConnectorPlacement,
    /// Items per second this connector can move.
    pub rated_capacity: Fixed64,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects nodes before analysis. Once built, a [`Layout`] never changes.
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    machines: SlotMap<MachineId, MachineNode>,
    connectors: SlotMap<ConnectorId, ConnectorNode>,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a machine centered at `position`.
    pub fn add_machine(&mut self, entity: &str, position: GridPosition, recipe: &str) -> MachineId {
        self.machines.insert(MachineNode {
            entity: entity.to_string(),
            position,
            recipe: recipe.to_string(),
        })
    }

    /// Add a connector with the given placement and rated capacity.
    pub fn add_connector(
        &mut self,
        entity: &str,
        placement: ConnectorPlacement,
        rated_capacity: Fixed64,
    ) -> ConnectorId {
        self.connectors.insert(ConnectorNode {
            entity: entity.to_string(),
            placement,
            rated_capacity,
        })
    }

    pub fn build(self) -> Layout {
        Layout {
            machines: self.machines,
            connectors: self.connectors,
        }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Owned store of machines and connectors, indexed by slotmap keys.
///
/// Iteration follows insertion order, which is also the discovery order
/// used by every adjacency query.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Layout {
    machines: SlotMap<MachineId, MachineNode>,
    connectors: SlotMap<ConnectorId, ConnectorNode>,
}

impl Layout {
    pub fn machine(&self, id: MachineId) -> Option<&MachineNode> {
        self.machines.get(id)
    }

    pub fn connector(&self, id: ConnectorId) -> Option<&ConnectorNode> {
        self.connectors.get(id)
    }

    pub fn machines(&self) -> impl Iterator<Item = (MachineId, &MachineNode)> {
        self.machines.iter()
    }

    pub fn connectors(&self) -> impl Iterator<Item = (ConnectorId, &ConnectorNode)> {
        self.connectors.iter()
    }

    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    // -- Adjacency --

    /// All connectors whose drop-off cell lies inside the machine's
    /// footprint, in discovery order. Empty for an unknown machine.
    pub fn feeders_of(&self, machine: MachineId) -> Vec<ConnectorId> {
        let Some(node) = self.machines.get(machine) else {
            return Vec::new();
        };
        let footprint = node.footprint();
        let feeders: Vec<ConnectorId> = self
            .connectors
            .iter()
            .filter(|(_, c)| footprint.contains(c.placement.output_position()))
            .map(|(id, _)| id)
            .collect();
        log::trace!("machine {machine:?} has {} feeder(s)", feeders.len());
        feeders
    }

    /// The machine the connector picks up from, if any.
    ///
    /// `None` means the connector draws from something untracked (a belt,
    /// a chest, or nothing at all).
    pub fn source_of(&self, connector: ConnectorId) -> Option<MachineId> {
        let node = self.connectors.get(connector)?;
        self.machine_at(node.placement.input_position())
    }

    /// The first machine, in discovery order, whose footprint covers `pos`.
    pub fn machine_at(&self, pos: GridPosition) -> Option<MachineId> {
        self.machines
            .iter()
            .find(|(_, m)| m.footprint().contains(pos))
            .map(|(id, _)| id)
    }
}
