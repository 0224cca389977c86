use std::{collections::BTreeMap, time::Duration};

use item_drop_core::{Event, FieldProvider, ItemFactory, ItemHandle, ItemTypeId};
use tracing::debug;

use crate::{Config, DropScheduler};

const LOG_TARGET: &str = "item_drop::session";

/// One active game session: the drop scheduler plus the collaborators it drives.
///
/// Hosts hold exactly one session and route frame ticks, score changes and item
/// lifecycle notifications through it.
#[derive(Debug)]
pub struct GameSession<F, A> {
    scheduler: DropScheduler,
    field: F,
    factory: A,
    applied: BTreeMap<ItemTypeId, u32>,
}

impl<F, A> GameSession<F, A>
where
    F: FieldProvider,
    A: ItemFactory,
{
    /// Creates a session that drops items into `field` using `factory`.
    #[must_use]
    pub fn new(config: Config, field: F, factory: A) -> Self {
        Self {
            scheduler: DropScheduler::new(config),
            field,
            factory,
            applied: BTreeMap::new(),
        }
    }

    /// Advances the session clock by `dt`.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.scheduler
            .tick(dt, &mut self.field, &mut self.factory, out);
    }

    /// Forwards a score change notification.
    pub fn on_score_changed(&mut self, score: i64, out: &mut Vec<Event>) {
        self.scheduler
            .on_score_changed(score, &mut self.field, &mut self.factory, out);
    }

    /// Reports that `item` left the field. Returns whether it was tracked.
    ///
    /// Destroying the entity remains the host's responsibility.
    pub fn on_item_exit(&mut self, item: ItemHandle, out: &mut Vec<Event>) -> bool {
        self.scheduler
            .on_item_exit(item, &mut self.field, out)
            .is_some()
    }

    /// Reports that the player consumed `item`, then releases its slot.
    ///
    /// Returns the kind of the applied item, or `None` if it was not live.
    pub fn on_item_applied(&mut self, item: ItemHandle, out: &mut Vec<Event>) -> Option<ItemTypeId> {
        let kind = self.scheduler.occupancy().get(item)?.kind;
        *self.applied.entry(kind).or_insert(0) += 1;
        debug!(target: LOG_TARGET, item = item.get(), kind = kind.get(), "item applied");
        out.push(Event::ItemApplied { item, kind });

        let _ = self.scheduler.on_item_exit(item, &mut self.field, out);
        Some(kind)
    }

    /// Starts a new game: despawns every live item and resets all drop state.
    ///
    /// Returns the number of items that were force-despawned.
    pub fn on_new_game_started(&mut self, out: &mut Vec<Event>) -> usize {
        self.applied.clear();
        self.scheduler
            .reset_session(&mut self.field, &mut self.factory, out)
    }

    /// Number of times an item of `kind` was applied this session.
    #[must_use]
    pub fn applied_count(&self, kind: ItemTypeId) -> u32 {
        self.applied.get(&kind).copied().unwrap_or(0)
    }

    /// Read-only access to the scheduler state.
    #[must_use]
    pub fn scheduler(&self) -> &DropScheduler {
        &self.scheduler
    }

    /// Read-only access to the field collaborator.
    #[must_use]
    pub fn field(&self) -> &F {
        &self.field
    }

    /// Mutable access to the field collaborator.
    pub fn field_mut(&mut self) -> &mut F {
        &mut self.field
    }

    /// Read-only access to the item factory.
    #[must_use]
    pub fn factory(&self) -> &A {
        &self.factory
    }

    /// Mutable access to the item factory.
    pub fn factory_mut(&mut self) -> &mut A {
        &mut self.factory
    }
}
