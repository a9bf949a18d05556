//! Read-only snapshot types for inspecting analysis results.
//!
//! All types are owned copies, with no references into engine storage, so
//! they can be handed to reporting or rendering code freely.

use crate::engine::{Allocation, MachineResolution, ThroughputError};
use crate::fixed::Fixed64;
use crate::flow::Flow;
use crate::id::{ConnectorId, MachineId};
use flowgrid_spatial::{ConnectorPlacement, GridPosition};

// ---------------------------------------------------------------------------
// Machine snapshot
// ---------------------------------------------------------------------------

/// A read-only view of a single machine.
#[derive(Debug, Clone)]
pub struct MachineSnapshot {
    pub id: MachineId,
    pub entity: String,
    pub position: GridPosition,
    pub recipe: String,
    /// Present once the machine resolved successfully.
    pub resolution: Option<MachineResolution>,
    /// Present if the machine's resolution failed.
    pub failure: Option<ThroughputError>,
    /// Output not yet handed out to connectors.
    pub remaining_capacity: Option<Fixed64>,
    /// Grants made from this machine, in order.
    pub allocations: Vec<Allocation>,
    /// Connectors dropping into this machine.
    pub feeders: Vec<ConnectorId>,
}

impl MachineSnapshot {
    /// Resolved output rate, if any.
    pub fn rate(&self) -> Option<Fixed64> {
        self.resolution.as_ref().map(|r| r.rate)
    }
}

// ---------------------------------------------------------------------------
// Connector snapshot
// ---------------------------------------------------------------------------

/// A read-only view of a single connector.
#[derive(Debug, Clone)]
pub struct ConnectorSnapshot {
    pub id: ConnectorId,
    pub entity: String,
    pub placement: ConnectorPlacement,
    pub rated_capacity: Fixed64,
    /// The machine it picks up from, or `None` for an untracked source.
    pub source: Option<MachineId>,
    pub flow: Option<Flow>,
    pub failure: Option<ThroughputError>,
}

impl ConnectorSnapshot {
    /// Fraction of rated capacity in use. Zero when unresolved.
    pub fn utilization(&self) -> Fixed64 {
        match self.flow {
            Some(flow) if self.rated_capacity > Fixed64::ZERO => {
                flow.rate().saturating_div(self.rated_capacity)
            }
            _ => Fixed64::ZERO,
        }
    }
}
