//! Label keys and accumulators for request metrics.

use std::collections::HashMap;
use std::hash::Hash;

/// Labels for the request counter.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct RequestKey {
    pub method: String,
    pub path: String,
    pub status: u16,
}

impl RequestKey {
    pub fn new(method: &str, path: &str, status: u16) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            status,
        }
    }

    /// Route portion of the key, as used by the duration series.
    pub fn route(&self) -> RouteKey {
        RouteKey {
            method: self.method.clone(),
            path: self.path.clone(),
        }
    }
}

/// Labels for the duration summary. Status is not part of the key.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct RouteKey {
    pub method: String,
    pub path: String,
}

impl RouteKey {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
        }
    }
}

/// Accumulated request durations for one route.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DurationStats {
    /// Sum of observed durations in seconds.
    pub sum: f64,
    /// Number of observations.
    pub count: u64,
}

impl DurationStats {
    /// Add one observation.
    pub fn observe(&mut self, seconds: f64) {
        self.sum += seconds;
        self.count += 1;
    }

    /// Mean duration, or `None` before the first observation.
    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// A keyed series that iterates in first-seen order.
#[derive(Clone, Debug)]
pub struct Series<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, V)>,
}

impl<K, V> Default for Series<K, V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K, V> Series<K, V>
where
    K: Clone + Hash + Eq,
    V: Default,
{
    /// Get the value for `key`, inserting the default at the end if absent.
    pub fn entry(&mut self, key: K) -> &mut V {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(key.clone(), slot);
                self.entries.push((key, V::default()));
                slot
            }
        };
        &mut self.entries[slot].1
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}
