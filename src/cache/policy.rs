//! Eviction policies for the fortified cache.

use super::entry::CacheEntry;

/// Strategy used to pick a victim when the cache is over a soft limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Evict the entry with the lowest `last_access`.
    #[default]
    Lru,
    /// Evict the entry with the lowest `hit_count`.
    Lfu,
    /// Evict expired entries first, then fall back to LRU.
    TtlPriority,
}

/// Pick the fingerprint of the entry `policy` would evict next, out of
/// `candidates`. Expired entries are always eligible regardless of
/// policy; `TtlPriority` additionally prefers them.
pub fn select_victim<R>(
    policy: EvictionPolicy,
    candidates: impl Iterator<Item = ([u8; 32], CacheEntry<R>)>,
    now_ms: u64,
) -> Option<[u8; 32]> {
    let mut best: Option<([u8; 32], CacheEntry<R>)> = None;

    for (fingerprint, entry) in candidates {
        let replace = match &best {
            None => true,
            Some((_, current)) => is_more_evictable(policy, &entry, current, now_ms),
        };
        if replace {
            best = Some((fingerprint, entry));
        }
    }

    best.map(|(fingerprint, _)| fingerprint)
}

fn is_more_evictable<R>(
    policy: EvictionPolicy,
    candidate: &CacheEntry<R>,
    current: &CacheEntry<R>,
    now_ms: u64,
) -> bool {
    let candidate_expired = candidate.is_expired(now_ms);
    let current_expired = current.is_expired(now_ms);
    if candidate_expired != current_expired {
        return candidate_expired;
    }

    match policy {
        EvictionPolicy::Lru | EvictionPolicy::TtlPriority => candidate.last_access < current.last_access,
        EvictionPolicy::Lfu => candidate.hit_count < current.hit_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(fingerprint: u8, last_access: u64, hit_count: u64, ttl_ms: Option<u64>, created_at: u64) -> ([u8; 32], CacheEntry<i32>) {
        let mut fp = [0u8; 32];
        fp[0] = fingerprint;
        (
            fp,
            CacheEntry {
                fingerprint: fp,
                value: 0,
                created_at,
                last_access,
                hit_count,
                ttl_ms,
            },
        )
    }

    fn fp(tag: u8) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[0] = tag;
        out
    }

    #[test]
    fn lru_picks_the_least_recently_accessed() {
        let candidates = vec![entry(1, 100, 0, None, 0), entry(2, 50, 0, None, 0)];
        let victim = select_victim(EvictionPolicy::Lru, candidates.into_iter(), 1000);
        assert_eq!(victim, Some(fp(2)));
    }

    #[test]
    fn lfu_picks_the_least_frequently_used() {
        let candidates = vec![entry(1, 0, 10, None, 0), entry(2, 0, 3, None, 0)];
        let victim = select_victim(EvictionPolicy::Lfu, candidates.into_iter(), 1000);
        assert_eq!(victim, Some(fp(2)));
    }

    #[test]
    fn expired_entries_are_preferred_under_any_policy() {
        let candidates = vec![entry(1, 1000, 0, None, 0), entry(2, 0, 0, Some(10), 0)];
        let victim = select_victim(EvictionPolicy::Lru, candidates.into_iter(), 1000);
        assert_eq!(victim, Some(fp(2)));
    }
}
