use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ItemTypeId, Side};

/// Seconds between time-triggered drop attempts when no override is configured.
pub const DEFAULT_TIME_INTERVAL_SECS: f32 = 30.0;
/// Score distance between score-triggered drop attempts when no override is configured.
pub const DEFAULT_SCORE_INTERVAL: i64 = 500;

const UNLIMITED_RAW: i32 = -1;
const MIN_TIME_INTERVAL: Duration = Duration::from_nanos(1);

/// Upper bound on how many times an item type may drop within one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropLimit {
    /// The item may drop any number of times.
    Unlimited,
    /// The item may drop at most the contained number of times.
    Limited(u32),
}

impl DropLimit {
    /// Decodes the configuration encoding where any negative value means unlimited.
    #[must_use]
    pub fn from_raw(raw: i32) -> Self {
        u32::try_from(raw).map_or(Self::Unlimited, Self::Limited)
    }

    /// Encodes the limit using the configuration representation.
    #[must_use]
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Unlimited => UNLIMITED_RAW,
            Self::Limited(count) => i32::try_from(count).unwrap_or(i32::MAX),
        }
    }
}

/// Static description of a droppable item type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Human readable name used in logs and summaries.
    pub name: String,
    /// Key the item factory resolves into an entity template.
    pub template: String,
    /// Maximum drops per session; negative values mean unlimited.
    #[serde(default = "unlimited_raw")]
    pub max_drop_count: i32,
}

fn unlimited_raw() -> i32 {
    UNLIMITED_RAW
}

impl ItemDefinition {
    /// Creates a definition with the provided name, template key and drop limit.
    #[must_use]
    pub fn new(name: impl Into<String>, template: impl Into<String>, limit: DropLimit) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            max_drop_count: limit.to_raw(),
        }
    }

    /// Decoded drop limit of the item.
    #[must_use]
    pub fn drop_limit(&self) -> DropLimit {
        DropLimit::from_raw(self.max_drop_count)
    }
}

/// Weighted reference to a catalog entry inside a drop table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropWeightEntry {
    /// Catalog entry the weight applies to.
    pub item: ItemTypeId,
    /// Relative, non-negative draw weight.
    pub weight: f32,
}

impl DropWeightEntry {
    /// Creates a new weight entry.
    #[must_use]
    pub const fn new(item: ItemTypeId, weight: f32) -> Self {
        Self { item, weight }
    }
}

/// Immutable, index-addressed catalog of item definitions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemCatalog {
    items: Vec<ItemDefinition>,
}

impl ItemCatalog {
    /// Freezes the provided definitions; the position of each entry becomes its id.
    #[must_use]
    pub fn new(items: Vec<ItemDefinition>) -> Self {
        Self { items }
    }

    /// Looks up the definition addressed by `id`.
    #[must_use]
    pub fn get(&self, id: ItemTypeId) -> Option<&ItemDefinition> {
        self.items.get(id.index())
    }

    /// Reports whether `id` addresses a catalog entry.
    #[must_use]
    pub fn contains(&self, id: ItemTypeId) -> bool {
        id.index() < self.items.len()
    }

    /// Number of item types in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Reports whether the catalog holds no item types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates the catalog in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemTypeId, &ItemDefinition)> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, definition)| (ItemTypeId::new(index as u32), definition))
    }
}

/// Load-time configuration of the drop systems.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// Seconds of play between time-triggered drop attempts.
    pub time_interval_secs: f32,
    /// Score distance between score-triggered drop attempts.
    pub score_interval: i64,
    /// Side of the field that receives dropped items.
    pub drop_side: Side,
    /// Item catalog; the position of each entry is its [`ItemTypeId`].
    pub items: Vec<ItemDefinition>,
    /// Weight table consulted by time-triggered attempts.
    pub time_weights: Vec<DropWeightEntry>,
    /// Weight table consulted by score-triggered attempts.
    pub score_weights: Vec<DropWeightEntry>,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            time_interval_secs: DEFAULT_TIME_INTERVAL_SECS,
            score_interval: DEFAULT_SCORE_INTERVAL,
            drop_side: Side::default(),
            items: Vec::new(),
            time_weights: Vec::new(),
            score_weights: Vec::new(),
        }
    }
}

impl DropConfig {
    /// Interval between time-triggered attempts.
    ///
    /// Non-positive or non-finite configured values collapse to zero, which
    /// [`DropConfig::validate`] rejects. Positive values shorter than a
    /// nanosecond round up to one nanosecond.
    #[must_use]
    pub fn time_interval(&self) -> Duration {
        match Duration::try_from_secs_f32(self.time_interval_secs) {
            Ok(interval) if self.time_interval_secs > 0.0 => interval.max(MIN_TIME_INTERVAL),
            _ => Duration::ZERO,
        }
    }

    /// Builds the immutable catalog described by the configuration.
    #[must_use]
    pub fn catalog(&self) -> ItemCatalog {
        ItemCatalog::new(self.items.clone())
    }

    /// Checks the range constraints the drop systems rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_interval_secs.is_finite() || self.time_interval_secs <= 0.0 {
            return Err(ConfigError::NonPositiveTimeInterval {
                secs: self.time_interval_secs,
            });
        }
        if self.score_interval <= 0 {
            return Err(ConfigError::NonPositiveScoreInterval {
                interval: self.score_interval,
            });
        }
        if self.items.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let tables = [
            ("time", &self.time_weights),
            ("score", &self.score_weights),
        ];
        for (table, entries) in tables {
            for entry in entries {
                if !entry.weight.is_finite() || entry.weight < 0.0 {
                    return Err(ConfigError::InvalidWeight {
                        table,
                        item: entry.item,
                        weight: entry.weight,
                    });
                }
                if entry.item.index() >= self.items.len() {
                    return Err(ConfigError::UnknownItem {
                        table,
                        item: entry.item,
                        catalog_len: self.items.len(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Reasons a [`DropConfig`] fails validation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The time interval was zero, negative or not a number.
    #[error("time interval must be a positive number of seconds, got {secs}")]
    NonPositiveTimeInterval {
        /// Offending configured value.
        secs: f32,
    },
    /// The score interval was zero or negative.
    #[error("score interval must be positive, got {interval}")]
    NonPositiveScoreInterval {
        /// Offending configured value.
        interval: i64,
    },
    /// The catalog did not define any item.
    #[error("item catalog must define at least one item")]
    EmptyCatalog,
    /// A weight table entry carried a negative or non-finite weight.
    #[error("{table} weight table assigns invalid weight {weight} to item {}", .item.get())]
    InvalidWeight {
        /// Table containing the entry.
        table: &'static str,
        /// Item the weight was assigned to.
        item: ItemTypeId,
        /// Offending weight.
        weight: f32,
    },
    /// A weight table entry referenced an id outside the catalog.
    #[error("{table} weight table references item {} but the catalog holds {catalog_len} items", .item.get())]
    UnknownItem {
        /// Table containing the entry.
        table: &'static str,
        /// Unknown item identifier.
        item: ItemTypeId,
        /// Number of items in the catalog.
        catalog_len: usize,
    },
}
