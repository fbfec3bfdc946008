//! Unit lock domain
//!
//! One exclusive lock per unit id serializes every callback body for that
//! unit across tick, kline and trade channels combined. Locks are created
//! on first reference and never removed for the life of the process; the
//! leak is bounded by the number of units, not by data volume.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

/// Map of unit id to its exclusive lock
#[derive(Default)]
pub struct UnitLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl UnitLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Lock handle for a unit, created atomically on first reference.
    ///
    /// Engine threads racing on a brand-new unit all observe the same
    /// lock: the miss path goes through the map's entry API, which
    /// serializes creation per key.
    pub fn lock_for(&self, unit_id: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.get(unit_id) {
            return Arc::clone(lock.value());
        }
        Arc::clone(self.locks.entry(unit_id.to_string()).or_default().value())
    }

    /// Number of units seen so far
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
