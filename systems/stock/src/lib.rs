#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-item-type stock tracking for a single game session.

use item_drop_core::{DropLimit, ItemCatalog, ItemTypeId};
use thiserror::Error;

/// Remaining drops available for an item type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Remaining {
    /// The item never runs out.
    Unlimited,
    /// The item may drop the contained number of further times.
    Finite(u32),
}

impl Remaining {
    /// Reports whether at least one further drop is allowed.
    #[must_use]
    pub const fn is_available(self) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Finite(count) => count > 0,
        }
    }
}

impl From<DropLimit> for Remaining {
    fn from(limit: DropLimit) -> Self {
        match limit {
            DropLimit::Unlimited => Self::Unlimited,
            DropLimit::Limited(count) => Self::Finite(count),
        }
    }
}

/// Broken preconditions reported by [`StockLedger::consume`].
///
/// Either variant means the caller skipped the eligibility check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StockError {
    /// The item had no remaining stock.
    #[error("item {} was consumed while exhausted", .item.get())]
    Exhausted {
        /// Item that was consumed.
        item: ItemTypeId,
    },
    /// The item is not part of the catalog the ledger was reset from.
    #[error("item {} is not tracked by the stock ledger", .item.get())]
    UnknownItem {
        /// Item that was consumed.
        item: ItemTypeId,
    },
}

/// Remaining-drop counters indexed by [`ItemTypeId`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StockLedger {
    remaining: Vec<Remaining>,
}

impl StockLedger {
    /// Creates a ledger filled to the catalog's configured maxima.
    #[must_use]
    pub fn new(catalog: &ItemCatalog) -> Self {
        let mut ledger = Self::default();
        ledger.reset(catalog);
        ledger
    }

    /// Refills every counter from the catalog's configured maxima.
    pub fn reset(&mut self, catalog: &ItemCatalog) {
        self.remaining.clear();
        self.remaining.extend(
            catalog
                .iter()
                .map(|(_, definition)| Remaining::from(definition.drop_limit())),
        );
    }

    /// Remaining stock of `item`, or `None` when the item is not tracked.
    #[must_use]
    pub fn remaining(&self, item: ItemTypeId) -> Option<Remaining> {
        self.remaining.get(item.index()).copied()
    }

    /// Reports whether `item` may drop: unlimited or with positive stock.
    #[must_use]
    pub fn is_eligible(&self, item: ItemTypeId) -> bool {
        self.remaining(item).is_some_and(Remaining::is_available)
    }

    /// Reports whether `item` is tracked and has run out.
    #[must_use]
    pub fn is_exhausted(&self, item: ItemTypeId) -> bool {
        self.remaining(item) == Some(Remaining::Finite(0))
    }

    /// Records one successful drop of `item`.
    ///
    /// Unlimited items are left untouched. Consuming an exhausted or untracked
    /// item is a caller ordering bug and is reported as an error.
    pub fn consume(&mut self, item: ItemTypeId) -> Result<(), StockError> {
        let slot = self
            .remaining
            .get_mut(item.index())
            .ok_or(StockError::UnknownItem { item })?;

        match slot {
            Remaining::Unlimited => Ok(()),
            Remaining::Finite(0) => Err(StockError::Exhausted { item }),
            Remaining::Finite(count) => {
                *count -= 1;
                Ok(())
            }
        }
    }
}
