//! Running request totals by route, instance and status code.

use std::collections::HashMap;

use serde::Serialize;

/// One row of a sorted counter listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCount {
    pub name: String,
    pub count: u64,
}

impl NameCount {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// A monotonically increasing counter map that remembers first-seen order.
///
/// First-seen order is the tie-breaker in [`Counter::to_sorted_desc`], which
/// decides chart legend order when two names have the same count.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `key`, creating it if absent.
    pub fn increment(&mut self, key: &str, amount: u64) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += amount,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), amount));
            }
        }
    }

    /// Current total for a key.
    pub fn get(&self, key: &str) -> Option<u64> {
        self.index.get(key).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum over every key.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// All names, sorted lexically.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|(name, _)| name.clone()).collect();
        names.sort();
        names
    }

    /// All entries, count descending, ties in first-seen order.
    pub fn to_sorted_desc(&self) -> Vec<NameCount> {
        let mut sorted: Vec<NameCount> = self
            .entries
            .iter()
            .map(|(name, count)| NameCount::new(name.clone(), *count))
            .collect();
        // sort_by is stable, so equal counts keep insertion order
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted
    }

    /// The `limit` largest entries.
    pub fn top(&self, limit: usize) -> Vec<NameCount> {
        let mut sorted = self.to_sorted_desc();
        sorted.truncate(limit);
        sorted
    }
}

/// The three global counters fed by the flattener.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    /// Route name -> cumulative requests.
    pub routes: Counter,
    /// Instance name -> cumulative requests.
    pub instances: Counter,
    /// Status code -> cumulative requests.
    pub status_codes: Counter,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.instances.is_empty() && self.status_codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_creates_then_adds() {
        let mut counter = Counter::new();
        counter.increment("GET /", 3);
        assert_eq!(counter.get("GET /"), Some(3));

        counter.increment("GET /", 4);
        assert_eq!(counter.get("GET /"), Some(7));
        assert_eq!(counter.get("POST /"), None);
        assert_eq!(counter.len(), 1);
        assert_eq!(counter.total(), 7);
    }

    #[test]
    fn test_increment_is_order_independent() {
        let amounts = [5, 0, 12, 3, 7];

        let mut forward = Counter::new();
        for amount in amounts {
            forward.increment("k", amount);
        }

        let mut backward = Counter::new();
        for amount in amounts.iter().rev() {
            backward.increment("k", *amount);
        }

        assert_eq!(forward.get("k"), Some(27));
        assert_eq!(backward.get("k"), Some(27));
    }

    #[test]
    fn test_sorted_desc_keeps_insertion_order_on_ties() {
        let mut counter = Counter::new();
        counter.increment("a", 5);
        counter.increment("b", 5);
        counter.increment("c", 3);

        assert_eq!(
            counter.to_sorted_desc(),
            vec![NameCount::new("a", 5), NameCount::new("b", 5), NameCount::new("c", 3)]
        );
    }

    #[test]
    fn test_tie_order_is_first_seen_not_last_updated() {
        let mut counter = Counter::new();
        counter.increment("late", 1);
        counter.increment("early", 2);
        counter.increment("late", 1);

        let sorted = counter.to_sorted_desc();
        assert_eq!(sorted[0].name, "late");
        assert_eq!(sorted[1].name, "early");
    }

    #[test]
    fn test_top_truncates() {
        let mut counter = Counter::new();
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            counter.increment(name, i as u64);
        }

        let top = counter.top(2);
        assert_eq!(top, vec![NameCount::new("d", 3), NameCount::new("c", 2)]);
        assert_eq!(counter.top(10).len(), 4);
    }

    #[test]
    fn test_names_sorted() {
        let mut counter = Counter::new();
        counter.increment("zeta", 1);
        counter.increment("alpha", 9);
        assert_eq!(counter.names(), vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
