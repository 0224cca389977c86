#![allow(dead_code)]

use std::collections::BTreeSet;

use item_drop_core::{
    DropConfig, DropLimit, DropTrigger, DropWeightEntry, Event, FieldProvider, ItemDefinition,
    ItemFactory, ItemHandle, ItemTypeId, Side, SkipReason, SlotId,
};

/// Field of numbered slots that always hands out the lowest free one.
#[derive(Debug)]
pub struct GridField {
    slots: Vec<Option<ItemHandle>>,
    pub requested_sides: Vec<Side>,
    pub exit_notifications: Vec<SlotId>,
}

impl GridField {
    pub fn with_slots(count: usize) -> Self {
        Self {
            slots: vec![None; count],
            requested_sides: Vec::new(),
            exit_notifications: Vec::new(),
        }
    }

    pub fn occupant(&self, slot: SlotId) -> Option<ItemHandle> {
        self.slots.get(slot.get() as usize).copied().flatten()
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl FieldProvider for GridField {
    fn pick_available_slot(&mut self, side: Side) -> Option<SlotId> {
        self.requested_sides.push(side);
        self.slots
            .iter()
            .position(Option::is_none)
            .map(|index| SlotId::new(index as u32))
    }

    fn notify_item_dropped(&mut self, slot: SlotId, item: ItemHandle) {
        let cell = &mut self.slots[slot.get() as usize];
        assert!(cell.is_none(), "slot {slot:?} handed out while occupied");
        *cell = Some(item);
    }

    fn notify_item_exited(&mut self, slot: SlotId) {
        self.slots[slot.get() as usize] = None;
        self.exit_notifications.push(slot);
    }
}

/// Factory that hands out sequential handles and can be told to fail.
#[derive(Debug, Default)]
pub struct CountingFactory {
    next: u64,
    pub failing: bool,
    pub live: BTreeSet<ItemHandle>,
    pub destroyed: Vec<ItemHandle>,
}

impl CountingFactory {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }
}

impl ItemFactory for CountingFactory {
    fn instantiate(&mut self, _kind: ItemTypeId, _definition: &ItemDefinition) -> Option<ItemHandle> {
        if self.failing {
            return None;
        }
        self.next += 1;
        let item = ItemHandle::new(self.next);
        assert!(self.live.insert(item));
        Some(item)
    }

    fn destroy(&mut self, item: ItemHandle) {
        assert!(self.live.remove(&item), "destroyed unknown item {item:?}");
        self.destroyed.push(item);
    }
}

pub fn weights(entries: &[(u32, f32)]) -> Vec<DropWeightEntry> {
    entries
        .iter()
        .map(|(item, weight)| DropWeightEntry::new(ItemTypeId::new(*item), *weight))
        .collect()
}

/// Two-item catalog: a single-use attack item and an unlimited speed item.
pub fn attack_speed_config() -> DropConfig {
    DropConfig {
        time_interval_secs: 1.0,
        score_interval: 500,
        drop_side: Side::Player,
        items: vec![
            ItemDefinition::new("attack", "items/attack", DropLimit::Limited(1)),
            ItemDefinition::new("speed", "items/speed", DropLimit::Unlimited),
        ],
        time_weights: weights(&[(0, 1.0), (1, 1.0)]),
        score_weights: weights(&[(1, 1.0)]),
    }
}

pub fn attempts(events: &[Event], trigger: DropTrigger) -> usize {
    events
        .iter()
        .filter(|event| event.attempt_trigger() == Some(trigger))
        .count()
}

pub fn dropped_kinds(events: &[Event]) -> Vec<ItemTypeId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ItemDropped { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect()
}

pub fn skip_reasons(events: &[Event]) -> Vec<SkipReason> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::DropSkipped { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect()
}
