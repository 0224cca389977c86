#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-capacity recycling of pre-built entities.
//!
//! An [`ObjectPool`] builds every entity up front and never grows. Acquiring
//! scans for the first idle entry, so lookups cost `O(capacity)`. Returning an
//! entity is the caller's job: clear its in-use flag (usually through
//! [`ObjectPool::release`]) before the entry can be handed out again.

use glam::{Quat, Vec3};

/// Lifecycle hooks every pooled entity exposes.
pub trait Poolable {
    /// Reports whether the entity is currently handed out.
    fn is_using(&self) -> bool;

    /// Marks the entity as handed out or idle.
    fn set_using(&mut self, using: bool);

    /// Prepares the entity for a new use.
    fn init(&mut self);

    /// Tears the entity down after use.
    fn uninit(&mut self);
}

/// Entities that can be positioned and re-parented when acquired.
pub trait Placeable {
    /// Moves the entity to `position`.
    fn set_position(&mut self, position: Vec3);

    /// Orients the entity with `rotation`.
    fn set_rotation(&mut self, rotation: Quat);

    /// Attaches the entity to `parent`.
    fn set_parent(&mut self, parent: ParentId);
}

/// Opaque handle of a scene node entities can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParentId(u64);

impl ParentId {
    /// Creates a new parent handle with the provided numeric value.
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

/// Pool of `capacity` pre-built entities.
#[derive(Clone, Debug)]
pub struct ObjectPool<T> {
    entries: Vec<T>,
}

impl<T: Poolable> ObjectPool<T> {
    /// Builds `capacity` idle entities using `spawn`, which receives each entry's index.
    #[must_use]
    pub fn new<S>(capacity: usize, mut spawn: S) -> Self
    where
        S: FnMut(usize) -> T,
    {
        let entries = (0..capacity)
            .map(|index| {
                let mut entry = spawn(index);
                entry.set_using(false);
                entry
            })
            .collect();
        Self { entries }
    }

    /// Hands out the first idle entity after re-initialising it.
    ///
    /// Returns `None` when every entity is in use.
    pub fn get(&mut self) -> Option<&mut T> {
        let entry = self.entries.iter_mut().find(|entry| !entry.is_using())?;
        entry.init();
        entry.set_using(true);
        Some(entry)
    }

    /// Returns the entity at `index` to the pool.
    ///
    /// Returns `false` if the index is out of range or the entity was idle.
    pub fn release(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if entry.is_using() => {
                entry.uninit();
                entry.set_using(false);
                true
            }
            _ => false,
        }
    }

    /// Direct access to the entity at `index`, whether idle or in use.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index)
    }

    /// Read-only access to the entity at `index`.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    /// Total number of entities, idle or not.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of entities currently handed out.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_using()).count()
    }
}

impl<T: Poolable + Placeable> ObjectPool<T> {
    /// Hands out an idle entity attached to `parent`.
    pub fn get_with_parent(&mut self, parent: ParentId) -> Option<&mut T> {
        let entry = self.get()?;
        entry.set_parent(parent);
        Some(entry)
    }

    /// Hands out an idle entity placed at `position` with `rotation`.
    pub fn get_at(&mut self, position: Vec3, rotation: Quat) -> Option<&mut T> {
        let entry = self.get()?;
        entry.set_position(position);
        entry.set_rotation(rotation);
        Some(entry)
    }

    /// Hands out an idle entity placed at `position` with `rotation` under `parent`.
    pub fn get_at_with_parent(
        &mut self,
        position: Vec3,
        rotation: Quat,
        parent: ParentId,
    ) -> Option<&mut T> {
        let entry = self.get_at(position, rotation)?;
        entry.set_parent(parent);
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Spark {
        index: usize,
        using: bool,
        inits: u32,
        uninits: u32,
        position: Vec3,
        rotation: Quat,
        parent: Option<ParentId>,
    }

    impl Poolable for Spark {
        fn is_using(&self) -> bool {
            self.using
        }

        fn set_using(&mut self, using: bool) {
            self.using = using;
        }

        fn init(&mut self) {
            self.inits += 1;
            self.parent = None;
        }

        fn uninit(&mut self) {
            self.uninits += 1;
        }
    }

    impl Placeable for Spark {
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

    fn pool(capacity: usize) -> ObjectPool<Spark> {
        ObjectPool::new(capacity, |index| Spark {
            index,
            using: true,
            ..Spark::default()
        })
    }

    #[test]
    fn entries_start_idle() {
        let pool = pool(3);
        assert_eq!(pool.capacity(), 3);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn exhausts_after_capacity_acquisitions() {
        let mut pool = pool(4);
        for expected in 0..4 {
            let spark = pool.get().expect("pool has idle entries");
            assert_eq!(spark.index, expected, "linear scan hands out lowest index");
        }
        assert!(pool.get().is_none(), "fixed capacity never grows");
        assert_eq!(pool.in_use(), 4);
    }

    #[test]
    fn released_entries_are_reinitialised_on_reuse() {
        let mut pool = pool(2);
        let _ = pool.get().map(|spark| spark.index);
        let _ = pool.get().map(|spark| spark.index);

        assert!(pool.release(1));
        assert!(!pool.release(1), "double release is ignored");
        assert!(!pool.release(9));

        let spark = pool.get().expect("released entry is reusable");
        assert_eq!(spark.index, 1);
        assert_eq!(spark.inits, 2);
        assert_eq!(spark.uninits, 1);
    }

    #[test]
    fn caller_side_flag_clear_also_returns_entry() {
        let mut pool = pool(1);
        assert!(pool.get().is_some());
        assert!(pool.get().is_none());

        if let Some(spark) = pool.get_mut(0) {
            spark.uninit();
            spark.set_using(false);
        }
        assert!(pool.get().is_some());
    }

    #[test]
    fn placement_overloads_position_and_parent_entries() {
        let mut pool = pool(3);
        let rotation = Quat::from_rotation_z(1.0);

        let parented = pool.get_with_parent(ParentId::new(7)).expect("idle entry");
        assert_eq!(parented.parent, Some(ParentId::new(7)));

        let placed = pool
            .get_at(Vec3::new(1.0, 2.0, 3.0), rotation)
            .expect("idle entry");
        assert_eq!(placed.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(placed.rotation, rotation);
        assert_eq!(placed.parent, None);

        let both = pool
            .get_at_with_parent(Vec3::ONE, rotation, ParentId::new(9))
            .expect("idle entry");
        assert_eq!(both.position, Vec3::ONE);
        assert_eq!(both.parent, Some(ParentId::new(9)));

        assert!(pool.get_at(Vec3::ZERO, Quat::IDENTITY).is_none());
        assert_eq!(pool.entry(0).map(|spark| spark.index), Some(0));
    }
}
