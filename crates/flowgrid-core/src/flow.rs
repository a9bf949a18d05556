//! Resolved connector flows.

use crate::fixed::Fixed64;
use crate::id::ItemId;
use serde::{Deserialize, Serialize};

/// What a connector delivers once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    /// Items of a known type, drawn from a tracked machine.
    Concrete { item: ItemId, rate: Fixed64 },
    /// Items of unknown type from an untracked source, capped by the
    /// connector's own rated capacity.
    Wildcard { rate: Fixed64 },
}

impl Flow {
    /// Items per second, whatever the item.
    pub fn rate(&self) -> Fixed64 {
        match self {
            Flow::Concrete { rate, .. } | Flow::Wildcard { rate } => *rate,
        }
    }

    /// The item carried, if known.
    pub fn item(&self) -> Option<ItemId> {
        match self {
            Flow::Concrete { item, .. } => Some(*item),
            Flow::Wildcard { .. } => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Flow::Wildcard { .. })
    }

    /// Total rate of concrete flows carrying `item`. Saturates.
    pub fn concrete_rate(flows: &[Flow], item: ItemId) -> Fixed64 {
        flows
            .iter()
            .map(|flow| match flow {
                Flow::Concrete { item: carried, rate } if *carried == item => *rate,
                Flow::Concrete { .. } | Flow::Wildcard { .. } => Fixed64::ZERO,
            })
            .fold(Fixed64::ZERO, Fixed64::saturating_add)
    }

    /// Total rate of wildcard flows. Saturates.
    pub fn wildcard_rate(flows: &[Flow]) -> Fixed64 {
        flows
            .iter()
            .map(|flow| match flow {
                Flow::Wildcard { rate } => *rate,
                Flow::Concrete { .. } => Fixed64::ZERO,
            })
            .fold(Fixed64::ZERO, Fixed64::saturating_add)
    }
}
