#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tracks which field slot each live dropped item occupies.

use std::collections::BTreeMap;

use item_drop_core::{Event, FieldProvider, ItemFactory, ItemHandle, ItemTypeId, SlotId};

/// Tracking record of a live item on the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LiveItem {
    /// Slot holding the item.
    pub slot: SlotId,
    /// Catalog entry the item was spawned from.
    pub kind: ItemTypeId,
}

/// Whether an exit notification also drops the tracking entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Removal {
    /// Forget the item after notifying its slot.
    Remove,
    /// Keep the entry; used while tearing down every item at once.
    Retain,
}

/// Map from live item handles to the slots they occupy.
///
/// Entries are ordered by handle so bulk teardown is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldOccupancyTracker {
    entries: BTreeMap<ItemHandle, LiveItem>,
}

impl FieldOccupancyTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `item`. Returns `false` if the handle was already tracked,
    /// in which case the existing entry is kept.
    pub fn register(&mut self, item: ItemHandle, live: LiveItem) -> bool {
        if self.entries.contains_key(&item) {
            return false;
        }
        let _ = self.entries.insert(item, live);
        true
    }

    /// Looks up the tracking record of `item`.
    #[must_use]
    pub fn get(&self, item: ItemHandle) -> Option<&LiveItem> {
        self.entries.get(&item)
    }

    /// Reports whether `item` is tracked.
    #[must_use]
    pub fn contains(&self, item: ItemHandle) -> bool {
        self.entries.contains_key(&item)
    }

    /// Number of live items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no item is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates live items in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemHandle, &LiveItem)> {
        self.entries.iter().map(|(item, live)| (*item, live))
    }

    /// Releases the slot held by `item`.
    ///
    /// Untracked items are ignored, which makes repeated exits harmless once the
    /// entry has been removed. Returns the record of the item that exited.
    pub fn on_item_exit<F>(
        &mut self,
        item: ItemHandle,
        field: &mut F,
        removal: Removal,
        out: &mut Vec<Event>,
    ) -> Option<LiveItem>
    where
        F: FieldProvider + ?Sized,
    {
        let live = *self.entries.get(&item)?;
        field.notify_item_exited(live.slot);
        out.push(Event::ItemExited {
            item,
            slot: live.slot,
        });
        if removal == Removal::Remove {
            let _ = self.entries.remove(&item);
        }
        Some(live)
    }

    /// Force-exits and destroys every live item, then clears the map in bulk.
    ///
    /// Returns the number of items that were despawned.
    pub fn release_all<F, A>(&mut self, field: &mut F, factory: &mut A, out: &mut Vec<Event>) -> usize
    where
        F: FieldProvider + ?Sized,
        A: ItemFactory + ?Sized,
    {
        let items: Vec<ItemHandle> = self.entries.keys().copied().collect();
        for item in &items {
            let _ = self.on_item_exit(*item, field, Removal::Retain, out);
            factory.destroy(*item);
        }
        self.entries.clear();
        items.len()
    }
}
