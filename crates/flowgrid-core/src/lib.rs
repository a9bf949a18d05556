//! flowgrid core -- steady-state throughput analysis for factory layouts.
//!
//! A layout is a set of 3x3 machines and single-cell connectors on a grid.
//! Nothing says which connector feeds which machine; that is inferred from
//! where each connector picks up and drops off. From there the engine works
//! out how many items per second every machine can sustain.
//!
//! # Pipeline
//!
//! 1. **Catalog** -- build an immutable [`catalog::RecipeCatalog`].
//! 2. **Layout** -- add machines and connectors to a
//!    [`layout::LayoutBuilder`] and freeze it into a [`layout::Layout`].
//! 3. **Resolve** -- create a [`engine::ThroughputEngine`] over both and ask
//!    for machine rates or connector flows. Results are memoized.
//! 4. **Report** -- aggregate per-recipe totals (see the `flowgrid-stats`
//!    crate).
//!
//! ```rust,ignore
//! let mut engine = ThroughputEngine::new(&catalog, &layout);
//! let rate = engine.resolve_output_rate(machine)?;
//! ```
//!
//! # Key Types
//!
//! - [`engine::ThroughputEngine`] -- recursive, memoized rate resolution
//!   with first-come-first-served capacity allocation.
//! - [`flow::Flow`] -- what a connector delivers: a known item or wildcard.
//! - [`layout::Layout`] -- owned node store with geometric adjacency.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.

pub mod catalog;
pub mod engine;
pub mod fixed;
pub mod flow;
pub mod id;
pub mod layout;
pub mod query;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
