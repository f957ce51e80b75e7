//! Capacity and eviction policies.
//!
//! Every bounded collection in the subsystem enforces its cap through one
//! of these functions rather than inline splicing at the mutation site, so
//! each policy is independently testable.

use std::collections::BTreeMap;

/// Caps a log to its most recent `max` entries, dropping from the front.
pub fn cap_to_recent<T>(log: &mut Vec<T>, max: usize) {
    if log.len() > max {
        log.drain(..log.len() - max);
    }
}

/// Evicts entries with the smallest timestamp until the map holds at most
/// `max`, never evicting `keep`. Ties break on the smaller key.
///
/// Returns the evicted keys.
pub fn evict_least_recent<V>(
    entries: &mut BTreeMap<String, V>,
    max: usize,
    keep: Option<&str>,
    timestamp: impl Fn(&V) -> i64,
) -> Vec<String> {
    let mut evicted = Vec::new();
    while entries.len() > max {
        let victim = entries
            .iter()
            .filter(|(key, _)| keep != Some(key.as_str()))
            .min_by_key(|(_, value)| timestamp(value))
            .map(|(key, _)| key.clone());
        let Some(key) = victim else { break };
        entries.remove(&key);
        evicted.push(key);
    }
    evicted
}

/// Evicts the oldest `fraction` of entries by timestamp (rounded up).
///
/// Returns the evicted keys.
pub fn evict_oldest_fraction<V>(
    entries: &mut BTreeMap<String, V>,
    fraction: f64,
    timestamp: impl Fn(&V) -> i64,
) -> Vec<String> {
    if entries.is_empty() {
        return Vec::new();
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
    #[allow(clippy::cast_possible_truncation)]
    let count = ((entries.len() as f64) * fraction).ceil() as usize;

    let mut by_age: Vec<(i64, String)> = entries
        .iter()
        .map(|(key, value)| (timestamp(value), key.clone()))
        .collect();
    by_age.sort();

    let evicted: Vec<String> = by_age.into_iter().take(count).map(|(_, key)| key).collect();
    for key in &evicted {
        entries.remove(key);
    }
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(pairs: &[(&str, i64)]) -> BTreeMap<String, i64> {
        pairs
            .iter()
            .map(|(key, ts)| ((*key).to_string(), *ts))
            .collect()
    }

    #[test]
    fn test_cap_to_recent_keeps_tail() {
        let mut log: Vec<u32> = (0..10).collect();
        cap_to_recent(&mut log, 4);
        assert_eq!(log, vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_cap_to_recent_noop_under_cap() {
        let mut log = vec![1, 2, 3];
        cap_to_recent(&mut log, 3);
        assert_eq!(log, vec![1, 2, 3]);
    }

    #[test]
    fn test_evict_least_recent_drops_oldest() {
        let mut entries = map_of(&[("a", 30), ("b", 10), ("c", 20), ("d", 40)]);
        let evicted = evict_least_recent(&mut entries, 2, None, |ts| *ts);
        assert_eq!(evicted, vec!["b".to_string(), "c".to_string()]);
        assert!(entries.contains_key("a") && entries.contains_key("d"));
    }

    #[test]
    fn test_evict_least_recent_spares_keep() {
        let mut entries = map_of(&[("a", 1), ("b", 2), ("c", 3)]);
        let evicted = evict_least_recent(&mut entries, 2, Some("a"), |ts| *ts);
        assert_eq!(evicted, vec!["b".to_string()]);
        assert!(entries.contains_key("a"));
    }

    #[test]
    fn test_evict_oldest_fraction_rounds_up() {
        let mut entries = map_of(&[("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)]);
        // 25% of 5 rounds up to 2
        let evicted = evict_oldest_fraction(&mut entries, 0.25, |ts| *ts);
        assert_eq!(evicted, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_evict_oldest_fraction_empty() {
        let mut entries: BTreeMap<String, i64> = BTreeMap::new();
        assert!(evict_oldest_fraction(&mut entries, 0.25, |ts| *ts).is_empty());
    }
}
