//! Throughput aggregation for analyzed layouts.
//!
//! Sums the resolved output rate of every machine by recipe name into a
//! [`ThroughputReport`]. Machines that cannot be resolved are listed in
//! the report instead of being counted as zero.
//!
//! # Usage
//!
//! ```ignore
//! let mut engine = ThroughputEngine::new(&catalog, &layout);
//! let report = summarize(&mut engine);
//! for (recipe, rate) in &report.rates {
//!     println!("{recipe}: {rate} items/s");
//! }
//! ```

use std::collections::BTreeMap;

use flowgrid_core::engine::{ThroughputEngine, ThroughputError};
use flowgrid_core::fixed::{Fixed64, fixed64_to_f64};
use flowgrid_core::id::MachineId;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Aggregate steady-state rates of a layout, keyed by recipe name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThroughputReport {
    /// Recipe name -> summed output rate in items per second.
    pub rates: BTreeMap<String, Fixed64>,
    /// Recipe name -> number of machines contributing to `rates`.
    pub machine_counts: BTreeMap<String, usize>,
    /// Machines whose rate could not be determined, in discovery order.
    pub failures: Vec<(MachineId, ThroughputError)>,
}

impl ThroughputReport {
    /// Summed rate for a recipe. Zero if no machine resolved it.
    pub fn rate(&self, recipe: &str) -> Fixed64 {
        self.rates.get(recipe).copied().unwrap_or(Fixed64::ZERO)
    }

    pub fn rate_f64(&self, recipe: &str) -> f64 {
        fixed64_to_f64(self.rate(recipe))
    }

    pub fn machine_count(&self, recipe: &str) -> usize {
        self.machine_counts.get(recipe).copied().unwrap_or(0)
    }

    /// Sum over every recipe. Mixes item types, so only meaningful as a
    /// coarse activity figure. Saturates.
    pub fn total_rate(&self) -> Fixed64 {
        self.rates
            .values()
            .fold(Fixed64::ZERO, |total, rate| total.saturating_add(*rate))
    }

    /// True when every machine resolved.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The report if every machine resolved, otherwise the failures.
    pub fn into_result(self) -> Result<Self, IncompleteReport> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(IncompleteReport {
                failures: self.failures,
            })
        }
    }
}

/// Returned by [`ThroughputReport::into_result`] when machines failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} machine(s) could not be resolved; first: {}", .failures.len(), first_failure(.failures))]
pub struct IncompleteReport {
    pub failures: Vec<(MachineId, ThroughputError)>,
}

fn first_failure(failures: &[(MachineId, ThroughputError)]) -> String {
    failures
        .first()
        .map(|(_, e)| e.to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Resolve every machine of the engine's layout and sum rates by recipe.
///
/// Machines are visited in discovery order, so allocation among competing
/// consumers follows the same order as [`ThroughputEngine::resolve_all`].
/// Machines already resolved by earlier queries keep their cached result.
pub fn summarize(engine: &mut ThroughputEngine<'_>) -> ThroughputReport {
    let layout = engine.layout();
    let mut report = ThroughputReport::default();

    for (id, machine) in layout.machines() {
        match engine.resolve_output_rate(id) {
            Ok(rate) => {
                let total = report
                    .rates
                    .entry(machine.recipe.clone())
                    .or_insert(Fixed64::ZERO);
                *total = total.saturating_add(rate);
                *report.machine_counts.entry(machine.recipe.clone()).or_insert(0) += 1;
            }
            Err(e) => {
                log::warn!("machine {id:?} ({}) excluded from report: {e}", machine.recipe);
                report.failures.push((id, e));
            }
        }
    }

    log::info!(
        "summarized {} machine(s) into {} recipe(s), {} failure(s)",
        layout.machine_count(),
        report.rates.len(),
        report.failures.len()
    );
    report
}
