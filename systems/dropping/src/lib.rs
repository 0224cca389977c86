#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic item drop scheduling.
//!
//! [`DropScheduler`] owns two independent trigger timelines: a fixed time
//! interval advanced by [`DropScheduler::tick`] and a score threshold checked by
//! [`DropScheduler::on_score_changed`]. Both converge on a single drop attempt
//! that filters exhausted stock, draws a weighted candidate, spawns it through
//! the [`ItemFactory`] and records the slot it occupies. [`GameSession`] bundles
//! the scheduler with its field and factory collaborators.

mod cursor;
mod session;

pub use cursor::ScoreThresholdCursor;
pub use session::GameSession;

use std::time::Duration;

use item_drop_core::{
    DropConfig, DropTrigger, DropWeightEntry, Event, FieldProvider, ItemCatalog, ItemFactory,
    ItemHandle, Side, SkipReason, Timer,
};
use item_drop_system_occupancy::{FieldOccupancyTracker, LiveItem, Removal};
use item_drop_system_selection::WeightedSelector;
use item_drop_system_stock::StockLedger;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

const LOG_TARGET: &str = "item_drop::scheduler";

/// Configuration parameters required to construct the drop scheduler.
#[derive(Clone, Debug)]
pub struct Config {
    drop: DropConfig,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from load-time drop settings and a seed.
    ///
    /// The settings are expected to have passed [`DropConfig::validate`].
    #[must_use]
    pub const fn new(drop: DropConfig, rng_seed: u64) -> Self {
        Self { drop, rng_seed }
    }
}

/// Pure system that decides when and what to drop onto the field.
#[derive(Debug)]
pub struct DropScheduler {
    catalog: ItemCatalog,
    time_weights: Vec<DropWeightEntry>,
    score_weights: Vec<DropWeightEntry>,
    drop_side: Side,
    timer: Timer,
    cursor: ScoreThresholdCursor,
    stock: StockLedger,
    occupancy: FieldOccupancyTracker,
    selector: WeightedSelector,
    rng: ChaCha8Rng,
    candidates: Vec<DropWeightEntry>,
}

impl DropScheduler {
    /// Creates a new scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let Config { drop, rng_seed } = config;
        let catalog = drop.catalog();
        let stock = StockLedger::new(&catalog);
        Self {
            timer: Timer::new(drop.time_interval()),
            cursor: ScoreThresholdCursor::new(drop.score_interval),
            drop_side: drop.drop_side,
            time_weights: drop.time_weights,
            score_weights: drop.score_weights,
            catalog,
            stock,
            occupancy: FieldOccupancyTracker::new(),
            selector: WeightedSelector::new(),
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            candidates: Vec::new(),
        }
    }

    /// Advances the time trigger and fires at most one attempt per completion.
    ///
    /// Any time accumulated beyond the interval is discarded when the timer
    /// resets, so a long frame catches up once rather than once per interval.
    pub fn tick<F, A>(&mut self, dt: Duration, field: &mut F, factory: &mut A, out: &mut Vec<Event>)
    where
        F: FieldProvider + ?Sized,
        A: ItemFactory + ?Sized,
    {
        self.timer.step(dt);
        if !self.timer.is_complete() {
            return;
        }

        trace!(
            target: LOG_TARGET,
            elapsed = ?self.timer.elapsed(),
            "time trigger fired"
        );
        self.attempt_drop(DropTrigger::Time, field, factory, out);
        self.timer.reset();
    }

    /// Checks the score trigger against a freshly reported score.
    ///
    /// A score that overshoots several thresholds still fires one attempt and
    /// advances the threshold by a single step.
    pub fn on_score_changed<F, A>(
        &mut self,
        score: i64,
        field: &mut F,
        factory: &mut A,
        out: &mut Vec<Event>,
    ) where
        F: FieldProvider + ?Sized,
        A: ItemFactory + ?Sized,
    {
        if !self.cursor.is_reached(score) {
            return;
        }

        trace!(
            target: LOG_TARGET,
            score,
            threshold = self.cursor.next_threshold(),
            "score trigger fired"
        );
        self.attempt_drop(DropTrigger::Score, field, factory, out);
        self.cursor.advance();
    }

    /// Releases the slot of an item that left the field.
    ///
    /// Unknown or already released items are ignored.
    pub fn on_item_exit<F>(
        &mut self,
        item: ItemHandle,
        field: &mut F,
        out: &mut Vec<Event>,
    ) -> Option<LiveItem>
    where
        F: FieldProvider + ?Sized,
    {
        self.occupancy
            .on_item_exit(item, field, Removal::Remove, out)
    }

    /// Despawns every live item and restores the session's initial drop state.
    ///
    /// Returns the number of items that were force-despawned.
    pub fn reset_session<F, A>(&mut self, field: &mut F, factory: &mut A, out: &mut Vec<Event>) -> usize
    where
        F: FieldProvider + ?Sized,
        A: ItemFactory + ?Sized,
    {
        let despawned = self.occupancy.release_all(field, factory, out);
        self.stock.reset(&self.catalog);
        self.cursor.reset();
        self.timer.reset();

        info!(target: LOG_TARGET, despawned, "drop state reset for new session");
        out.push(Event::SessionStarted { despawned });
        despawned
    }

    /// Immutable catalog the scheduler draws from.
    #[must_use]
    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Timer driving the time trigger.
    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Cursor driving the score trigger.
    #[must_use]
    pub fn cursor(&self) -> &ScoreThresholdCursor {
        &self.cursor
    }

    /// Remaining stock of every item type.
    #[must_use]
    pub fn stock(&self) -> &StockLedger {
        &self.stock
    }

    /// Live items and the slots they occupy.
    #[must_use]
    pub fn occupancy(&self) -> &FieldOccupancyTracker {
        &self.occupancy
    }

    fn attempt_drop<F, A>(
        &mut self,
        trigger: DropTrigger,
        field: &mut F,
        factory: &mut A,
        out: &mut Vec<Event>,
    ) where
        F: FieldProvider + ?Sized,
        A: ItemFactory + ?Sized,
    {
        let Some(slot) = field.pick_available_slot(self.drop_side) else {
            skip(trigger, SkipReason::FieldFull, out);
            return;
        };

        let table = match trigger {
            DropTrigger::Time => &self.time_weights,
            DropTrigger::Score => &self.score_weights,
        };
        collect_candidates(table, &self.stock, &mut self.candidates);

        let Some(kind) = self.selector.select(&self.candidates, &mut self.rng).chosen() else {
            skip(trigger, SkipReason::NoCandidates, out);
            return;
        };

        let Some(definition) = self.catalog.get(kind) else {
            skip(trigger, SkipReason::UnknownItemType, out);
            return;
        };

        // Stock is only charged once the factory has produced an entity.
        let Some(item) = factory.instantiate(kind, definition) else {
            skip(trigger, SkipReason::InstantiationFailed, out);
            return;
        };

        let registered = self.occupancy.register(item, LiveItem { slot, kind });
        assert!(registered, "item factory returned live handle {item:?} twice");
        if let Err(error) = self.stock.consume(kind) {
            panic!("drop attempt consumed stock it never checked: {error}");
        }
        field.notify_item_dropped(slot, item);

        out.push(Event::ItemDropped {
            item,
            kind,
            slot,
            trigger,
        });
    }
}

fn collect_candidates(
    table: &[DropWeightEntry],
    stock: &StockLedger,
    candidates: &mut Vec<DropWeightEntry>,
) {
    candidates.clear();
    candidates.extend(
        table
            .iter()
            .copied()
            .filter(|entry| !stock.is_exhausted(entry.item)),
    );
}

fn skip(trigger: DropTrigger, reason: SkipReason, out: &mut Vec<Event>) {
    debug!(target: LOG_TARGET, ?trigger, ?reason, "drop attempt skipped");
    out.push(Event::DropSkipped { trigger, reason });
}
