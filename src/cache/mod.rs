//! Fortified function cache (Secure Core).
//!
//! Memoizes the result of an expensive computation keyed by a
//! deterministic fingerprint of its arguments, with at-most-once
//! concurrent computation per fingerprint and bounded memory.

mod context;
mod entry;
mod fingerprint;
mod policy;

pub use context::ExecutionContext;
pub use entry::CacheEntry;
pub use fingerprint::{fingerprint, Arg};
pub use policy::EvictionPolicy;

use std::mem::size_of;
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::mapref::entry::Entry as DashEntry;
use dashmap::DashMap;
use tracing::warn;

#[cfg(test)]
use crate::error::Error;
use crate::error::Result;

enum Slot<R> {
    Pending,
    Done(Result<R>),
}

struct InFlight<R> {
    mutex: Mutex<Slot<R>>,
    condvar: Condvar,
}

impl<R> InFlight<R> {
    fn new() -> Self {
        Self {
            mutex: Mutex::new(Slot::Pending),
            condvar: Condvar::new(),
        }
    }
}

/// A fingerprint-keyed memoization cache for a single result type `R`.
pub struct Cache<R> {
    max_entries: Option<usize>,
    max_memory_bytes: Option<usize>,
    default_ttl_ms: Option<u64>,
    eviction_policy: EvictionPolicy,
    fingerprint_salt: Vec<u8>,
    store: DashMap<[u8; 32], CacheEntry<R>>,
    in_flight: DashMap<[u8; 32], Arc<InFlight<R>>>,
}

impl<R: Clone + Send + Sync + 'static> Cache<R> {
    /// Build an empty cache under the given soft limits and policy.
    pub fn new(
        max_entries: Option<usize>,
        max_memory_bytes: Option<usize>,
        default_ttl_ms: Option<u64>,
        eviction_policy: EvictionPolicy,
        fingerprint_salt: Vec<u8>,
    ) -> Self {
        Self {
            max_entries,
            max_memory_bytes,
            default_ttl_ms,
            eviction_policy,
            fingerprint_salt,
            store: DashMap::new(),
            in_flight: DashMap::new(),
        }
    }

    /// Read-only lookup by fingerprint. Updates `last_access` and
    /// `hit_count` on a hit; returns `None` on a miss or an expired
    /// entry (the expired entry is removed).
    pub fn get(&self, fp: [u8; 32]) -> Option<R> {
        let now = now_unix_ms();
        let expired = match self.store.get(&fp) {
            Some(entry) => entry.is_expired(now),
            None => return None,
        };
        if expired {
            self.store.remove(&fp);
            return None;
        }

        self.store.get_mut(&fp).map(|mut entry| {
            entry.last_access = now;
            entry.hit_count += 1;
            entry.value.clone()
        })
    }

    /// Compute and return the fingerprint for `args` under this
    /// cache's fixed salt.
    pub fn fingerprint(&self, args: &[Arg]) -> [u8; 32] {
        fingerprint(args, &self.fingerprint_salt)
    }

    /// Fetch the entry for `args`, computing it with `compute` on a
    /// miss. Concurrent callers racing the same fingerprint share a
    /// single computation: exactly one calls `compute`, the rest block
    /// on its result. A computation failure is returned to every
    /// waiter and is never cached.
    pub fn get_or_compute(
        &self,
        args: &[Arg],
        ttl_ms: Option<u64>,
        compute: impl FnOnce() -> Result<R>,
    ) -> Result<R> {
        let fp = self.fingerprint(args);

        if let Some(hit) = self.get(fp) {
            return Ok(hit);
        }

        let (slot, is_leader) = match self.in_flight.entry(fp) {
            DashEntry::Occupied(existing) => (existing.get().clone(), false),
            DashEntry::Vacant(vacant) => {
                let slot = Arc::new(InFlight::new());
                vacant.insert(slot.clone());
                (slot, true)
            }
        };

        if !is_leader {
            let mut guard = slot.mutex.lock().expect("in-flight mutex poisoned");
            while matches!(&*guard, Slot::Pending) {
                guard = slot.condvar.wait(guard).expect("in-flight mutex poisoned");
            }
            return match &*guard {
                Slot::Done(result) => result.clone(),
                Slot::Pending => unreachable!("wait loop only exits once Done"),
            };
        }

        let result = compute();

        {
            let mut guard = slot.mutex.lock().expect("in-flight mutex poisoned");
            *guard = Slot::Done(result.clone());
        }
        slot.condvar.notify_all();
        self.in_flight.remove(&fp);

        if let Ok(value) = &result {
            self.put(fp, value.clone(), ttl_ms.or(self.default_ttl_ms));
        }

        result
    }

    /// Insert or replace an entry, evicting under this cache's policy
    /// first if the insert would exceed its soft limits.
    pub fn put(&self, fp: [u8; 32], value: R, ttl_ms: Option<u64>) {
        self.evict_to_make_room();
        let now = now_unix_ms();
        self.store.insert(
            fp,
            CacheEntry {
                fingerprint: fp,
                value,
                created_at: now,
                last_access: now,
                hit_count: 0,
                ttl_ms,
            },
        );
    }

    /// Remove an entry. Any `SecureBytes` it owns is wiped the moment
    /// the removed entry's last reference drops.
    pub fn invalidate(&self, fp: [u8; 32]) {
        self.store.remove(&fp);
        self.in_flight.remove(&fp);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn evict_to_make_room(&self) {
        let now = now_unix_ms();

        loop {
            let over_entries = self.max_entries.is_some_and(|max| self.store.len() >= max);
            let over_memory = self
                .max_memory_bytes
                .is_some_and(|max| self.approximate_memory_bytes() >= max);
            if !over_entries && !over_memory {
                return;
            }

            let candidates: Vec<_> = self
                .store
                .iter()
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect();
            let Some(victim) = policy::select_victim(self.eviction_policy, candidates.into_iter(), now) else {
                warn!("cache over its soft limit but no victim could be selected");
                return;
            };
            self.store.remove(&victim);
        }
    }

    fn approximate_memory_bytes(&self) -> usize {
        self.store.len() * size_of::<CacheEntry<R>>()
    }

    /// Remove every currently-expired entry, independent of the lazy
    /// expiry check `get` already performs on access.
    pub fn sweep_expired(&self) {
        let now = now_unix_ms();
        self.store.retain(|_, entry| !entry.is_expired(now));
    }

    /// Spawn the scheduled cleanup sweep: a background thread that
    /// calls [`Self::sweep_expired`] every `delay_ms`. The thread holds
    /// only a [`Weak`] reference to `self` and exits on its own the
    /// first time it wakes to find every strong reference gone, so it
    /// never keeps the cache alive past its owner.
    pub fn spawn_cleanup_sweeper(self: &Arc<Self>, delay_ms: u64) -> thread::JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let delay = Duration::from_millis(delay_ms.max(1));
        thread::spawn(move || loop {
            thread::sleep(delay);
            match weak.upgrade() {
                Some(cache) => cache.sweep_expired(),
                None => return,
            }
        })
    }
}

fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock predates the Unix epoch")
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Barrier;
    use std::thread;

    fn cache() -> Cache<u32> {
        Cache::new(None, None, None, EvictionPolicy::Lru, b"test-salt".to_vec())
    }

    #[test]
    fn miss_then_hit_after_put() {
        let c = cache();
        let fp = c.fingerprint(&[Arg::Str("key".to_string())]);
        assert!(c.get(fp).is_none());
        c.put(fp, 7, None);
        assert_eq!(c.get(fp), Some(7));
    }

    #[test]
    fn get_or_compute_runs_compute_once_on_miss() {
        let c = cache();
        let calls = AtomicU32::new(0);
        let value = c
            .get_or_compute(&[Arg::Int(1)], None, || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(99)
            })
            .expect("ok");
        assert_eq!(value, 99);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let value2 = c
            .get_or_compute(&[Arg::Int(1)], None, || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(100)
            })
            .expect("ok");
        assert_eq!(value2, 99);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_callers_compute_at_most_once() {
        let c = Arc::new(cache());
        let calls = Arc::new(AtomicU32::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = c.clone();
                let calls = calls.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    c.get_or_compute(&[Arg::Str("shared".to_string())], None, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(20));
                        Ok(123)
                    })
                    .expect("ok")
                })
            })
            .collect();

        let results: Vec<u32> = handles.into_iter().map(|h| h.join().expect("no panic")).collect();
        assert!(results.iter().all(|&v| v == 123));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn compute_failure_is_not_cached() {
        let c: Cache<u32> = cache();
        let first = c.get_or_compute(&[Arg::Int(5)], None, || {
            Err(Error::ComputeFailed {
                underlying: "boom".to_string(),
            })
        });
        assert!(first.is_err());

        let second = c.get_or_compute(&[Arg::Int(5)], None, || Ok(42));
        assert_eq!(second.expect("ok"), 42);
    }

    #[test]
    fn invalidate_removes_the_entry() {
        let c = cache();
        let fp = c.fingerprint(&[Arg::Int(1)]);
        c.put(fp, 1, None);
        c.invalidate(fp);
        assert!(c.get(fp).is_none());
    }

    #[test]
    fn clear_removes_every_entry() {
        let c = cache();
        c.put(c.fingerprint(&[Arg::Int(1)]), 1, None);
        c.put(c.fingerprint(&[Arg::Int(2)]), 2, None);
        c.clear();
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn eviction_kicks_in_over_max_entries() {
        let c: Cache<u32> = Cache::new(Some(2), None, None, EvictionPolicy::Lru, b"salt".to_vec());
        c.put(c.fingerprint(&[Arg::Int(1)]), 1, None);
        c.put(c.fingerprint(&[Arg::Int(2)]), 2, None);
        c.put(c.fingerprint(&[Arg::Int(3)]), 3, None);
        assert!(c.len() <= 2);
    }

    #[test]
    fn sweep_expired_removes_only_expired_entries() {
        let c: Cache<u32> = cache();
        let fresh = c.fingerprint(&[Arg::Int(1)]);
        let stale = c.fingerprint(&[Arg::Int(2)]);
        c.put(fresh, 1, None);
        c.put(stale, 2, Some(1));
        thread::sleep(Duration::from_millis(20));

        c.sweep_expired();

        assert_eq!(c.get(fresh), Some(1));
        assert_eq!(c.get(stale), None);
    }

    #[test]
    fn cleanup_sweeper_reclaims_expired_entries_in_the_background() {
        let c: Arc<Cache<u32>> = Arc::new(cache());
        let fp = c.fingerprint(&[Arg::Int(1)]);
        c.put(fp, 1, Some(1));

        let handle = Cache::spawn_cleanup_sweeper(&c, 10);
        thread::sleep(Duration::from_millis(100));

        assert_eq!(c.len(), 0);
        drop(c);
        handle.join().expect("sweeper thread exits once the cache is dropped");
    }
}
