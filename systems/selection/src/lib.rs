#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted random selection over drop weight tables.

use item_drop_core::{DropWeightEntry, ItemTypeId};
use rand::Rng;

/// Outcome of a weighted draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Selection {
    /// The draw resolved to the contained item type.
    Chosen(ItemTypeId),
    /// The candidate list was empty; the caller should skip the attempt.
    NoCandidates,
}

impl Selection {
    /// Returns the chosen item type, if any.
    #[must_use]
    pub const fn chosen(self) -> Option<ItemTypeId> {
        match self {
            Self::Chosen(item) => Some(item),
            Self::NoCandidates => None,
        }
    }
}

/// Stateless weighted draw over an ordered candidate list.
#[derive(Clone, Copy, Debug, Default)]
pub struct WeightedSelector;

impl WeightedSelector {
    /// Creates a new selector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Draws one candidate with probability proportional to its weight.
    ///
    /// Negative or NaN weights count as zero. When the weights sum to zero the
    /// last candidate is returned, so a non-empty list always yields a choice.
    pub fn select<R>(&self, candidates: &[DropWeightEntry], rng: &mut R) -> Selection
    where
        R: Rng + ?Sized,
    {
        let Some(last) = candidates.last() else {
            return Selection::NoCandidates;
        };

        let total: f32 = candidates.iter().map(effective_weight).sum();
        if !total.is_finite() || total <= 0.0 {
            return Selection::Chosen(last.item);
        }

        let draw = rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        for candidate in candidates {
            cumulative += effective_weight(candidate);
            if draw < cumulative {
                return Selection::Chosen(candidate.item);
            }
        }

        // Rounding in the running sum can leave `draw` just past the final bound.
        Selection::Chosen(last.item)
    }
}

fn effective_weight(entry: &DropWeightEntry) -> f32 {
    entry.weight.max(0.0)
}
