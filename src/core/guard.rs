//! Placement guards - In-process mutual exclusion for the assignment engine.
//!
//! The capacity check and the uniqueness check are both read-then-write sequences. Each
//! `assign_student` call holds the guard of its classroom and the guard of its
//! (student, academic year) pair for the whole check-then-insert, so two requests racing
//! for the last seat, or for the same student, are serialised and exactly one wins.
//!
//! Requests for different classrooms and students still share one `SQLite` database, and two
//! pooled connections that both read and then try to write inside a deferred transaction
//! make `SQLite` fail one of them with `SQLITE_BUSY` immediately, without waiting out the
//! busy timeout. The write slot serialises those check-then-insert transactions within the
//! process so they queue instead of failing.
//!
//! Lock order is always classroom, then (student, year), then the write slot. No database
//! connection is held while waiting on a guard.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of async mutexes addressed by key. Slots are created on demand and removed
/// once nobody holds or waits on them.
#[derive(Debug)]
struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    async fn lock(self: &Arc<Self>, key: K) -> KeyGuard<K> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };
        let guard = slot.lock_owned().await;

        KeyGuard {
            locks: Arc::clone(self),
            key,
            guard: Some(guard),
        }
    }

    fn live_slots(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Held guard for one key. Dropping it releases the lock.
#[derive(Debug)]
pub struct KeyGuard<K>
where
    K: Eq + Hash + Clone,
{
    locks: Arc<KeyedLocks<K>>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K> Drop for KeyGuard<K>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut slots = self
            .locks
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Only the registry itself still references the slot: nobody holds or waits on it.
        if slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.key);
        }
    }
}

/// Guards shared by every request that places students. Cloning is cheap and clones share
/// the same registries.
#[derive(Debug, Clone, Default)]
pub struct PlacementGuards {
    classrooms: Arc<KeyedLocks<i64>>,
    student_years: Arc<KeyedLocks<(i64, i64)>>,
    writer: Arc<AsyncMutex<()>>,
}

impl PlacementGuards {
    /// Creates an empty set of guards.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to a classroom's roster.
    pub async fn lock_classroom(&self, classroom_id: i64) -> KeyGuard<i64> {
        self.classrooms.lock(classroom_id).await
    }

    /// Waits for exclusive access to a student's placement in one academic year.
    ///
    /// Callers that also need a classroom guard must take it first.
    pub async fn lock_student_year(
        &self,
        student_id: i64,
        academic_year_id: i64,
    ) -> KeyGuard<(i64, i64)> {
        self.student_years
            .lock((student_id, academic_year_id))
            .await
    }

    /// Waits for the process-wide write slot around a check-then-insert transaction.
    ///
    /// Must be taken after any keyed guard the caller needs.
    pub async fn lock_writer(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.writer).lock_owned().await
    }

    /// True when no guard is held or awaited.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.classrooms.live_slots() == 0
            && self.student_years.live_slots() == 0
            && self.writer.try_lock().is_ok()
    }
}
