#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the item drop engine.
//!
//! This crate defines the vocabulary that connects the host game loop, the
//! drop systems, and the collaborators that own the play field. Hosts drive
//! systems with elapsed time and score notifications, systems consult the
//! [`FieldProvider`] and [`ItemFactory`] collaborators, and every observable
//! outcome is broadcast as an [`Event`] so callers can react deterministically.

mod catalog;
mod timer;

pub use catalog::{
    ConfigError, DropConfig, DropLimit, DropWeightEntry, ItemCatalog, ItemDefinition,
    DEFAULT_SCORE_INTERVAL, DEFAULT_TIME_INTERVAL_SECS,
};
pub use timer::Timer;

use serde::{Deserialize, Serialize};

/// Stable index into the immutable item catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemTypeId(u32);

impl ItemTypeId {
    /// Creates a new item type identifier with the provided catalog index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Catalog index addressed by the identifier.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Opaque handle to a spawned item entity owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemHandle(u64);

impl ItemHandle {
    /// Creates a new item handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Opaque identifier of a field slot that can hold at most one live item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u32);

impl SlotId {
    /// Creates a new slot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the slot identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Side of the play field that owns a set of slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The defending player's half of the field.
    #[default]
    Player,
    /// The opposing half of the field.
    Opponent,
}

/// Timeline that initiated a drop attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropTrigger {
    /// The elapsed-time interval completed.
    Time,
    /// The score crossed the next drop threshold.
    Score,
}

/// Reasons a drop attempt ended without spawning an item.
///
/// These are normal transient states of the field and the stock, not failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The field provider had no free slot on the drop side.
    FieldFull,
    /// Every weight table entry was exhausted, or the table was empty.
    NoCandidates,
    /// The drawn identifier does not address a catalog entry.
    UnknownItemType,
    /// The item factory failed to produce an entity.
    InstantiationFailed,
}

/// Events broadcast by the drop systems after processing host input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that an item was spawned into a field slot.
    ItemDropped {
        /// Handle of the spawned entity.
        item: ItemHandle,
        /// Catalog entry the entity was created from.
        kind: ItemTypeId,
        /// Slot that now holds the item.
        slot: SlotId,
        /// Timeline that initiated the attempt.
        trigger: DropTrigger,
    },
    /// Reports that a drop attempt was abandoned.
    DropSkipped {
        /// Timeline that initiated the attempt.
        trigger: DropTrigger,
        /// Specific reason the attempt ended early.
        reason: SkipReason,
    },
    /// Confirms that a tracked item left the field and released its slot.
    ItemExited {
        /// Handle of the item that exited.
        item: ItemHandle,
        /// Slot the item previously occupied.
        slot: SlotId,
    },
    /// Confirms that the player consumed a live item.
    ItemApplied {
        /// Handle of the applied item.
        item: ItemHandle,
        /// Catalog entry of the applied item.
        kind: ItemTypeId,
    },
    /// Announces that a new game session began and all drop state was reset.
    SessionStarted {
        /// Number of live items that were force-despawned.
        despawned: usize,
    },
}

impl Event {
    /// Returns the trigger of a drop attempt event, if this event reports one.
    #[must_use]
    pub const fn attempt_trigger(&self) -> Option<DropTrigger> {
        match self {
            Self::ItemDropped { trigger, .. } | Self::DropSkipped { trigger, .. } => {
                Some(*trigger)
            }
            _ => None,
        }
    }
}

/// Collaborator that owns the field slots items are dropped into.
///
/// The drop systems assume exclusive logical ownership of a slot from the
/// moment it is handed out until they report the item's exit.
pub trait FieldProvider {
    /// Picks a free slot on the provided side, or `None` when the side is full.
    fn pick_available_slot(&mut self, side: Side) -> Option<SlotId>;

    /// Informs the slot that an item was dropped into it.
    fn notify_item_dropped(&mut self, slot: SlotId, item: ItemHandle);

    /// Informs the slot that its item left the field.
    fn notify_item_exited(&mut self, slot: SlotId);
}

/// Collaborator that materialises item entities from catalog entries.
pub trait ItemFactory {
    /// Produces a new entity for the catalog entry, or `None` on failure.
    fn instantiate(&mut self, kind: ItemTypeId, definition: &ItemDefinition)
        -> Option<ItemHandle>;

    /// Destroys an entity previously produced by [`ItemFactory::instantiate`].
    fn destroy(&mut self, item: ItemHandle);
}
