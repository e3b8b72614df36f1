//! Per-asset and per-collection reader/writer locks.
//!
//! One [`LockManager`] is built at service start and shared by every request
//! handler. Per-asset locks are created on first use and kept for the life of
//! the manager. Guards release on drop.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{ArcRwLockReadGuard, ArcRwLockWriteGuard, Mutex, RawRwLock, RwLock};

/// Shared-mode guard on one lock
pub type ReadGuard = ArcRwLockReadGuard<RawRwLock, ()>;
/// Exclusive-mode guard on one lock
pub type WriteGuard = ArcRwLockWriteGuard<RawRwLock, ()>;

/// Logical collections whose create sequences are serialized
///
/// A caller needing several locks takes class locks in declaration order,
/// then per-asset locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    Solutions,
    AssetSets,
    Assets,
}

impl EntityClass {
    fn index(self) -> usize {
        match self {
            EntityClass::Solutions => 0,
            EntityClass::AssetSets => 1,
            EntityClass::Assets => 2,
        }
    }
}

#[derive(Debug, Default)]
pub struct LockManager {
    assets: Mutex<HashMap<String, Arc<RwLock<()>>>>,
    classes: [Arc<RwLock<()>>; 3],
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn asset_lock(&self, asset_id: &str) -> Arc<RwLock<()>> {
        // The map mutex is held only long enough to fetch or insert the entry.
        let mut assets = self.assets.lock();
        Arc::clone(assets.entry(asset_id.to_string()).or_default())
    }

    /// Block until no writer holds `asset_id`
    pub fn read_asset(&self, asset_id: &str) -> ReadGuard {
        self.asset_lock(asset_id).read_arc()
    }

    /// Block until `asset_id` is held by nobody else
    pub fn write_asset(&self, asset_id: &str) -> WriteGuard {
        self.asset_lock(asset_id).write_arc()
    }

    pub fn read_class(&self, class: EntityClass) -> ReadGuard {
        self.classes[class.index()].read_arc()
    }

    pub fn write_class(&self, class: EntityClass) -> WriteGuard {
        self.classes[class.index()].write_arc()
    }

    /// Number of assets that have had a lock created so far
    pub fn tracked_assets(&self) -> usize {
        self.assets.lock().len()
    }
}
