//! The throughput engine: recursive, memoized resolution of connector flows
//! and machine output rates over a [`Layout`].
//!
//! # Architecture
//!
//! The `ThroughputEngine` borrows an immutable [`RecipeCatalog`] and
//! [`Layout`] and owns every piece of mutable analysis state, keyed by node
//! ID (SoA):
//! - per-machine resolution state and remaining capacity
//! - per-machine allocation ledger
//! - per-connector resolution state
//!
//! # Resolution
//!
//! A machine's rate depends on the flows of the connectors feeding it; a
//! connector's flow depends on the remaining capacity of the machine it
//! picks up from. Both are resolved depth-first on demand and cached.
//! Every node moves `Unresolved -> Resolving -> Resolved | Failed` exactly
//! once. Reaching a node that is still `Resolving` means the layout feeds
//! back into itself, and is reported as [`ThroughputError::CyclicDependency`].
//!
//! # Allocation order
//!
//! Machine output is handed out first-come-first-served: each connector
//! that picks up from a machine takes as much as it can carry from whatever
//! is left at the moment it is resolved. The order is the depth-first
//! discovery order of the traversal, so it is deterministic for a given
//! layout but not proportional or fair between competing consumers.

use crate::catalog::RecipeCatalog;
use crate::fixed::Fixed64;
use crate::flow::Flow;
use crate::id::*;
use crate::layout::Layout;
use crate::query::{ConnectorSnapshot, MachineSnapshot};
use slotmap::SecondaryMap;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures that abort the resolution of a node and everything downstream
/// of it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThroughputError {
    #[error("machine {machine:?} uses unknown recipe '{recipe}'")]
    UnknownRecipe { machine: MachineId, recipe: String },
    #[error("machine {machine:?} has no supply for {}", .items.join(", "))]
    InsufficientSupply { machine: MachineId, items: Vec<String> },
    #[error("cyclic dependency through {node:?}")]
    CyclicDependency { node: NodeRef },
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeRef),
}

// ---------------------------------------------------------------------------
// Per-node state
// ---------------------------------------------------------------------------

/// Resolution state of a single node.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NodeState<T> {
    #[default]
    Unresolved,
    /// On the current traversal path.
    Resolving,
    Resolved(T),
    Failed(ThroughputError),
}

/// Which constraint set a machine's cycle time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleLimit {
    /// Inputs arrive fast enough; the recipe's own batch time dominates.
    BatchTime,
    /// Concrete delivery of this item is the bottleneck.
    Input(ItemId),
    /// Inputs with no concrete delivery are waiting on wildcard supply.
    Wildcard,
}

/// The cached outcome of resolving a machine.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineResolution {
    /// The item this machine hands out when allocated from.
    pub output: ItemId,
    /// Seconds per cycle, never below the recipe's batch time.
    pub cycle_time: Fixed64,
    /// Steady-state output in items per second.
    pub rate: Fixed64,
    pub limit: CycleLimit,
}

/// One grant handed out from a machine's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// The connector that asked, or `None` for a direct request.
    pub requester: Option<ConnectorId>,
    pub requested: Fixed64,
    pub granted: Fixed64,
}

// ---------------------------------------------------------------------------
// ThroughputEngine
// ---------------------------------------------------------------------------

/// Resolves steady-state rates for one layout. Create a fresh engine to
/// analyze the same layout again from scratch.
#[derive(Debug)]
pub struct ThroughputEngine<'a> {
    catalog: &'a RecipeCatalog,
    layout: &'a Layout,

    // -- Per-machine state (SoA, keyed by MachineId) --
    machine_states: SecondaryMap<MachineId, NodeState<MachineResolution>>,
    remaining: SecondaryMap<MachineId, Fixed64>,
    allocations: SecondaryMap<MachineId, Vec<Allocation>>,

    // -- Per-connector state (keyed by ConnectorId) --
    connector_states: SecondaryMap<ConnectorId, NodeState<Flow>>,
}

impl<'a> ThroughputEngine<'a> {
    pub fn new(catalog: &'a RecipeCatalog, layout: &'a Layout) -> Self {
        Self {
            catalog,
            layout,
            machine_states: SecondaryMap::new(),
            remaining: SecondaryMap::new(),
            allocations: SecondaryMap::new(),
            connector_states: SecondaryMap::new(),
        }
    }

    pub fn catalog(&self) -> &'a RecipeCatalog {
        self.catalog
    }

    pub fn layout(&self) -> &'a Layout {
        self.layout
    }

    // -----------------------------------------------------------------------
    // Machines
    // -----------------------------------------------------------------------

    /// Steady-state output rate of a machine, in items per second.
    pub fn resolve_output_rate(&mut self, machine: MachineId) -> Result<Fixed64, ThroughputError> {
        self.resolve_machine(machine).map(|r| r.rate)
    }

    /// Full resolution of a machine, including its limiting constraint.
    pub fn resolve_machine(
        &mut self,
        machine: MachineId,
    ) -> Result<MachineResolution, ThroughputError> {
        match self.machine_state(machine) {
            NodeState::Resolved(r) => return Ok(r.clone()),
            NodeState::Failed(e) => return Err(e.clone()),
            NodeState::Resolving => {
                return Err(ThroughputError::CyclicDependency {
                    node: NodeRef::Machine(machine),
                });
            }
            NodeState::Unresolved => {}
        }

        self.machine_states.insert(machine, NodeState::Resolving);
        let result = self.compute_machine(machine);
        match &result {
            Ok(resolution) => {
                log::debug!(
                    "machine {machine:?} resolved: {} items/s (cycle {}s, {:?})",
                    resolution.rate,
                    resolution.cycle_time,
                    resolution.limit
                );
                self.remaining.insert(machine, resolution.rate);
                self.machine_states
                    .insert(machine, NodeState::Resolved(resolution.clone()));
            }
            Err(e) => {
                log::debug!("machine {machine:?} failed: {e}");
                self.machine_states.insert(machine, NodeState::Failed(e.clone()));
            }
        }
        result
    }

    fn compute_machine(&mut self, machine: MachineId) -> Result<MachineResolution, ThroughputError> {
        let layout = self.layout;
        let catalog = self.catalog;
        let node = layout
            .machine(machine)
            .ok_or(ThroughputError::NodeNotFound(NodeRef::Machine(machine)))?;
        let recipe =
            catalog
                .recipe_by_name(&node.recipe)
                .ok_or_else(|| ThroughputError::UnknownRecipe {
                    machine,
                    recipe: node.recipe.clone(),
                })?;

        let mut inbound = Vec::new();
        for connector in layout.feeders_of(machine) {
            inbound.push(self.resolve_flow(connector)?);
        }

        let mut cycle_time = recipe.batch_time;
        let mut limit = CycleLimit::BatchTime;
        let mut unmet_demand = Fixed64::ZERO;
        let mut unmet_items = Vec::new();

        for input in &recipe.inputs {
            let quantity = Fixed64::saturating_from_num(input.quantity);
            let delivered = Flow::concrete_rate(&inbound, input.item);
            if delivered > Fixed64::ZERO {
                let time_for_input = quantity.saturating_div(delivered);
                if time_for_input > cycle_time {
                    cycle_time = time_for_input;
                    limit = CycleLimit::Input(input.item);
                }
            } else {
                unmet_demand = unmet_demand.saturating_add(quantity);
                unmet_items.push(input.item);
            }
        }

        if unmet_demand > Fixed64::ZERO {
            let wildcard_supply = Flow::wildcard_rate(&inbound);
            if wildcard_supply <= Fixed64::ZERO {
                return Err(ThroughputError::InsufficientSupply {
                    machine,
                    items: unmet_items
                        .iter()
                        .map(|&item| catalog.item_name(item).unwrap_or("?").to_string())
                        .collect(),
                });
            }
            let time_for_wildcard = unmet_demand.saturating_div(wildcard_supply);
            if time_for_wildcard > cycle_time {
                cycle_time = time_for_wildcard;
                limit = CycleLimit::Wildcard;
            }
        }

        Ok(MachineResolution {
            output: recipe.output,
            cycle_time,
            rate: Fixed64::saturating_from_num(recipe.output_quantity).saturating_div(cycle_time),
            limit,
        })
    }

    /// Take up to `requested` items per second from a machine's remaining
    /// capacity. Resolves the machine first if needed.
    ///
    /// Returns the item handed out and the granted rate. Grants are first
    /// come, first served.
    pub fn allocate(
        &mut self,
        machine: MachineId,
        requested: Fixed64,
    ) -> Result<(ItemId, Fixed64), ThroughputError> {
        self.allocate_for(machine, requested, None)
    }

    fn allocate_for(
        &mut self,
        machine: MachineId,
        requested: Fixed64,
        requester: Option<ConnectorId>,
    ) -> Result<(ItemId, Fixed64), ThroughputError> {
        let resolution = self.resolve_machine(machine)?;
        let requested = requested.max(Fixed64::ZERO);
        let remaining = self.remaining.get(machine).copied().unwrap_or(Fixed64::ZERO);
        let granted = requested.min(remaining);
        self.remaining.insert(machine, remaining - granted);

        log::debug!(
            "allocate from {machine:?} for {requester:?}: requested {requested}, granted {granted}, {} left",
            remaining - granted
        );
        let allocation = Allocation {
            requester,
            requested,
            granted,
        };
        match self.allocations.get_mut(machine) {
            Some(ledger) => ledger.push(allocation),
            None => {
                self.allocations.insert(machine, vec![allocation]);
            }
        }
        Ok((resolution.output, granted))
    }

    // -----------------------------------------------------------------------
    // Connectors
    // -----------------------------------------------------------------------

    /// Resolve what a connector delivers.
    pub fn resolve_flow(&mut self, connector: ConnectorId) -> Result<Flow, ThroughputError> {
        match self.connector_state(connector) {
            NodeState::Resolved(flow) => return Ok(*flow),
            NodeState::Failed(e) => return Err(e.clone()),
            NodeState::Resolving => {
                return Err(ThroughputError::CyclicDependency {
                    node: NodeRef::Connector(connector),
                });
            }
            NodeState::Unresolved => {}
        }

        self.connector_states.insert(connector, NodeState::Resolving);
        let result = self.compute_flow(connector);
        match &result {
            Ok(flow) => {
                log::debug!("connector {connector:?} resolved: {flow:?}");
                self.connector_states
                    .insert(connector, NodeState::Resolved(*flow));
            }
            Err(e) => {
                self.connector_states
                    .insert(connector, NodeState::Failed(e.clone()));
            }
        }
        result
    }

    fn compute_flow(&mut self, connector: ConnectorId) -> Result<Flow, ThroughputError> {
        let layout = self.layout;
        let node = layout
            .connector(connector)
            .ok_or(ThroughputError::NodeNotFound(NodeRef::Connector(connector)))?;
        let capacity = node.rated_capacity;

        match layout.source_of(connector) {
            None => Ok(Flow::Wildcard { rate: capacity }),
            Some(source) => {
                let (item, granted) = self.allocate_for(source, capacity, Some(connector))?;
                Ok(Flow::Concrete {
                    item,
                    rate: granted.min(capacity),
                })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Bulk resolution
    // -----------------------------------------------------------------------

    /// Resolve every machine, then every connector, in discovery order.
    ///
    /// Machines go first so that connectors feeding nothing cannot take
    /// capacity ahead of the machines that depend on it. Returns the
    /// machines that failed.
    pub fn resolve_all(&mut self) -> Vec<(MachineId, ThroughputError)> {
        let layout = self.layout;
        let mut failures = Vec::new();
        for (id, _) in layout.machines() {
            if let Err(e) = self.resolve_machine(id) {
                log::warn!("machine {id:?} could not be resolved: {e}");
                failures.push((id, e));
            }
        }
        for (id, _) in layout.connectors() {
            if let Err(e) = self.resolve_flow(id) {
                log::debug!("connector {id:?} has no flow: {e}");
            }
        }
        failures
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn machine_state(&self, machine: MachineId) -> &NodeState<MachineResolution> {
        self.machine_states
            .get(machine)
            .unwrap_or(&NodeState::Unresolved)
    }

    pub fn connector_state(&self, connector: ConnectorId) -> &NodeState<Flow> {
        self.connector_states
            .get(connector)
            .unwrap_or(&NodeState::Unresolved)
    }

    /// Output capacity not yet handed out. `None` until the machine resolves.
    pub fn remaining_capacity(&self, machine: MachineId) -> Option<Fixed64> {
        self.remaining.get(machine).copied()
    }

    /// Every grant made from a machine, in order.
    pub fn allocations(&self, machine: MachineId) -> &[Allocation] {
        self.allocations
            .get(machine)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sum of all grants made from a machine.
    pub fn granted_total(&self, machine: MachineId) -> Fixed64 {
        self.allocations(machine)
            .iter()
            .fold(Fixed64::ZERO, |total, a| total.saturating_add(a.granted))
    }

    /// Read-only view of a machine. `None` for an unknown ID.
    pub fn snapshot_machine(&self, machine: MachineId) -> Option<MachineSnapshot> {
        let node = self.layout.machine(machine)?;
        let (resolution, failure) = match self.machine_state(machine) {
            NodeState::Resolved(r) => (Some(r.clone()), None),
            NodeState::Failed(e) => (None, Some(e.clone())),
            NodeState::Unresolved | NodeState::Resolving => (None, None),
        };
        Some(MachineSnapshot {
            id: machine,
            entity: node.entity.clone(),
            position: node.position,
            recipe: node.recipe.clone(),
            resolution,
            failure,
            remaining_capacity: self.remaining_capacity(machine),
            allocations: self.allocations(machine).to_vec(),
            feeders: self.layout.feeders_of(machine),
        })
    }

    /// Snapshots of every machine, in discovery order.
    pub fn snapshot_all_machines(&self) -> Vec<MachineSnapshot> {
        self.layout
            .machines()
            .filter_map(|(id, _)| self.snapshot_machine(id))
            .collect()
    }

    /// Read-only view of a connector. `None` for an unknown ID.
    pub fn snapshot_connector(&self, connector: ConnectorId) -> Option<ConnectorSnapshot> {
        let node = self.layout.connector(connector)?;
        let (flow, failure) = match self.connector_state(connector) {
            NodeState::Resolved(f) => (Some(*f), None),
            NodeState::Failed(e) => (None, Some(e.clone())),
            NodeState::Unresolved | NodeState::Resolving => (None, None),
        };
        Some(ConnectorSnapshot {
            id: connector,
            entity: node.entity.clone(),
            placement: node.placement,
            rated_capacity: node.rated_capacity,
            source: self.layout.source_of(connector),
            flow,
            failure,
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
