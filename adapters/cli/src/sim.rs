//! Fixed-step session runner backed by an in-memory field and pooled items.

use std::{collections::BTreeMap, fmt, time::Duration};

use anyhow::{ensure, Context, Result};
use glam::{Quat, Vec3};
use item_drop_core::{
    DropConfig, Event, FieldProvider, ItemDefinition, ItemFactory, ItemHandle, ItemTypeId, Side,
    SkipReason, SlotId,
};
use item_drop_pool::{ObjectPool, ParentId, Placeable, Poolable};
use item_drop_system_dropping::{Config, GameSession};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "item_drop::sim";
const FIELD_ROOT: ParentId = ParentId::new(1);
const SPAWN_ORIGIN: Vec3 = Vec3::new(0.0, 4.0, 0.0);
const SLOT_PICK_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Knobs of a headless run.
#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) seed: u64,
    pub(crate) duration: Duration,
    pub(crate) frame: Duration,
    pub(crate) score_per_second: i64,
    pub(crate) slots_per_side: u32,
    pub(crate) pool_size: usize,
    pub(crate) item_lifetime: Duration,
}

#[derive(Clone, Copy, Debug)]
struct SimSlot {
    side: Side,
    occupant: Option<ItemHandle>,
}

/// Field with a fixed number of slots per side. Free slots are picked at random.
#[derive(Debug)]
pub(crate) struct SimField {
    slots: Vec<SimSlot>,
    rng: ChaCha8Rng,
    free: Vec<usize>,
}

impl SimField {
    pub(crate) fn new(slots_per_side: u32, seed: u64) -> Self {
        let slots = [Side::Player, Side::Opponent]
            .into_iter()
            .flat_map(|side| {
                (0..slots_per_side).map(move |_| SimSlot {
                    side,
                    occupant: None,
                })
            })
            .collect();
        Self {
            slots,
            rng: ChaCha8Rng::seed_from_u64(seed ^ SLOT_PICK_STREAM),
            free: Vec::new(),
        }
    }

    pub(crate) fn occupied(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.occupant.is_some())
            .count()
    }
}

impl FieldProvider for SimField {
    fn pick_available_slot(&mut self, side: Side) -> Option<SlotId> {
        self.free.clear();
        self.free.extend(
            self.slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.side == side && slot.occupant.is_none())
                .map(|(index, _)| index),
        );
        if self.free.is_empty() {
            return None;
        }
        let index = self.free[self.rng.gen_range(0..self.free.len())];
        u32::try_from(index).ok().map(SlotId::new)
    }

    fn notify_item_dropped(&mut self, slot: SlotId, item: ItemHandle) {
        match self.slots.get_mut(slot.get() as usize) {
            Some(cell) => cell.occupant = Some(item),
            None => warn!(target: LOG_TARGET, slot = slot.get(), "drop reported for unknown slot"),
        }
    }

    fn notify_item_exited(&mut self, slot: SlotId) {
        if let Some(cell) = self.slots.get_mut(slot.get() as usize) {
            cell.occupant = None;
        }
    }
}

#[derive(Debug, Default)]
struct ItemEntity {
    index: usize,
    using: bool,
    generation: u32,
    kind: Option<ItemTypeId>,
    template: String,
    position: Vec3,
    rotation: Quat,
    parent: Option<ParentId>,
}

impl Poolable for ItemEntity {
    fn is_using(&self) -> bool {
        self.using
    }

    fn set_using(&mut self, using: bool) {
        self.using = using;
    }

    fn init(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn uninit(&mut self) {
        self.kind = None;
        self.template.clear();
        self.parent = None;
    }
}

impl Placeable for ItemEntity {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn set_parent(&mut self, parent: ParentId) {
        self.parent = Some(parent);
    }
}

/// Item factory that recycles a fixed set of pre-built entities.
///
/// Handles pack the pool index in the low 32 bits and the entity's reuse
/// generation in the high 32 bits, so handles of recycled entities go stale.
#[derive(Debug)]
pub(crate) struct PooledItems {
    pool: ObjectPool<ItemEntity>,
}

impl PooledItems {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            pool: ObjectPool::new(capacity, |index| ItemEntity {
                index,
                ..ItemEntity::default()
            }),
        }
    }

    pub(crate) fn live(&self) -> usize {
        self.pool.in_use()
    }
}

fn pack_handle(index: usize, generation: u32) -> ItemHandle {
    ItemHandle::new((u64::from(generation) << 32) | index as u64)
}

fn unpack_handle(item: ItemHandle) -> (usize, u32) {
    let raw = item.get();
    ((raw & 0xffff_ffff) as usize, (raw >> 32) as u32)
}

impl ItemFactory for PooledItems {
    fn instantiate(&mut self, kind: ItemTypeId, definition: &ItemDefinition) -> Option<ItemHandle> {
        let entity = self
            .pool
            .get_at_with_parent(SPAWN_ORIGIN, Quat::IDENTITY, FIELD_ROOT)?;
        entity.kind = Some(kind);
        entity.template.clone_from(&definition.template);
        debug!(
            target: LOG_TARGET,
            index = entity.index,
            generation = entity.generation,
            template = %entity.template,
            position = ?entity.position,
            rotation = ?entity.rotation,
            parent = ?entity.parent.map(|parent| parent.get()),
            "item entity acquired"
        );
        Some(pack_handle(entity.index, entity.generation))
    }

    fn destroy(&mut self, item: ItemHandle) {
        let (index, generation) = unpack_handle(item);
        let current = self.pool.entry(index).filter(|entity| entity.is_using());
        match current {
            Some(entity) if entity.generation == generation => {
                debug!(target: LOG_TARGET, index, kind = ?entity.kind, "item entity released");
                let _ = self.pool.release(index);
            }
            _ => warn!(target: LOG_TARGET, item = item.get(), "ignoring destroy of stale item handle"),
        }
    }
}

/// Totals gathered over a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Summary {
    names: Vec<String>,
    elapsed: Duration,
    final_score: i64,
    attempts: u32,
    dropped: BTreeMap<ItemTypeId, u32>,
    applied: BTreeMap<ItemTypeId, u32>,
    skipped: BTreeMap<&'static str, u32>,
    exits: u32,
    peak_on_field: usize,
    live_at_end: usize,
}

impl Summary {
    fn new(names: Vec<String>) -> Self {
        Self {
            names,
            ..Self::default()
        }
    }

    fn record(&mut self, event: &Event) {
        if event.attempt_trigger().is_some() {
            self.attempts += 1;
        }
        match event {
            Event::ItemDropped { kind, .. } => *self.dropped.entry(*kind).or_default() += 1,
            Event::DropSkipped { reason, .. } => {
                *self.skipped.entry(skip_label(*reason)).or_default() += 1;
            }
            Event::ItemExited { .. } => self.exits += 1,
            Event::ItemApplied { .. } | Event::SessionStarted { .. } => {}
        }
    }

    fn name(&self, kind: ItemTypeId) -> &str {
        self.names
            .get(kind.index())
            .map_or("<unknown>", String::as_str)
    }
}

fn skip_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::FieldFull => "field full",
        SkipReason::NoCandidates => "no candidates",
        SkipReason::UnknownItemType => "unknown item type",
        SkipReason::InstantiationFailed => "instantiation failed",
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "simulated {:.1}s, final score {}, {} drop attempts",
            self.elapsed.as_secs_f32(),
            self.final_score,
            self.attempts
        )?;
        writeln!(f, "items:")?;
        for index in 0..self.names.len() {
            let kind = ItemTypeId::new(index as u32);
            writeln!(
                f,
                "  {:<12} dropped {:>4}  applied {:>4}",
                self.name(kind),
                self.dropped.get(&kind).copied().unwrap_or(0),
                self.applied.get(&kind).copied().unwrap_or(0)
            )?;
        }
        writeln!(f, "skipped:")?;
        if self.skipped.is_empty() {
            writeln!(f, "  none")?;
        }
        for (reason, count) in &self.skipped {
            writeln!(f, "  {reason:<21} {count:>4}")?;
        }
        writeln!(
            f,
            "exits {}, peak on field {}, live at end {}",
            self.exits, self.peak_on_field, self.live_at_end
        )
    }
}

/// Replays a session for `settings.duration` in fixed frames.
///
/// Score accrues continuously and is reported whenever it grows by at least
/// one point. Every dropped item is picked up once its lifetime runs out.
pub(crate) fn run(config: DropConfig, settings: &Settings) -> Result<Summary> {
    ensure!(!settings.frame.is_zero(), "frame length must be positive");
    config
        .validate()
        .context("refusing to run with an invalid drop config")?;

    let names = config.items.iter().map(|item| item.name.clone()).collect();
    let mut summary = Summary::new(names);
    let mut session = GameSession::new(
        Config::new(config, settings.seed),
        SimField::new(settings.slots_per_side, settings.seed),
        PooledItems::new(settings.pool_size),
    );

    info!(
        target: LOG_TARGET,
        seed = settings.seed,
        duration_secs = settings.duration.as_secs_f32(),
        slots_per_side = settings.slots_per_side,
        pool_size = settings.pool_size,
        "starting headless session"
    );

    let mut events = Vec::new();
    let mut lifetimes: BTreeMap<ItemHandle, Duration> = BTreeMap::new();
    let mut elapsed = Duration::ZERO;
    let mut score = 0_i64;
    let mut pending_score = 0.0_f64;

    let _ = session.on_new_game_started(&mut events);
    while elapsed < settings.duration {
        elapsed += settings.frame;
        session.tick(settings.frame, &mut events);

        pending_score += settings.score_per_second as f64 * settings.frame.as_secs_f64();
        if pending_score >= 1.0 {
            let earned = pending_score.floor();
            pending_score -= earned;
            score = score.saturating_add(earned as i64);
            session.on_score_changed(score, &mut events);
        }

        let expired: Vec<ItemHandle> = lifetimes
            .iter_mut()
            .filter_map(|(item, remaining)| {
                *remaining = remaining.saturating_sub(settings.frame);
                remaining.is_zero().then_some(*item)
            })
            .collect();
        for item in expired {
            let _ = lifetimes.remove(&item);
            if session.on_item_applied(item, &mut events).is_some() {
                session.factory_mut().destroy(item);
            }
        }

        for event in events.drain(..) {
            if let Event::ItemDropped { item, .. } = event {
                let _ = lifetimes.insert(item, settings.item_lifetime);
            }
            summary.record(&event);
        }
        summary.peak_on_field = summary.peak_on_field.max(session.field().occupied());
    }

    for index in 0..summary.names.len() {
        let kind = ItemTypeId::new(index as u32);
        let count = session.applied_count(kind);
        if count > 0 {
            let _ = summary.applied.insert(kind, count);
        }
    }
    summary.elapsed = elapsed;
    summary.final_score = score;
    summary.live_at_end = session.factory().live();

    info!(
        target: LOG_TARGET,
        attempts = summary.attempts,
        live = summary.live_at_end,
        "headless session finished"
    );
    Ok(summary)
}
