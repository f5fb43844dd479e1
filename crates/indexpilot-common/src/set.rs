//! Keyed set collection
//!
//! Workload objects (columns, indexes, statements, schemas) are identified
//! by a string key, and the advisor stores them in `Set`, a keyed collection
//! that always iterates in key order. The search algorithm's determinism
//! depends on that ordering, so the storage is a `BTreeMap` rather than a
//! hash map.

use std::collections::BTreeMap;

/// Capability of workload objects: a string key that is their identity.
/// Two values with the same key are interchangeable.
pub trait Keyed {
    fn key(&self) -> String;
}

/// A set of keyed elements. Inserting an element with an existing key
/// replaces the old one; iteration is in ascending key order.
#[derive(Debug, Clone)]
pub struct Set<T: Keyed + Clone> {
    items: BTreeMap<String, T>,
}

impl<T: Keyed + Clone> Set<T> {
    pub fn new() -> Self {
        Set {
            items: BTreeMap::new(),
        }
    }

    pub fn from_list(items: impl IntoIterator<Item = T>) -> Self {
        let mut set = Set::new();
        for item in items {
            set.insert(item);
        }
        set
    }

    pub fn insert(&mut self, item: T) {
        self.items.insert(item.key(), item);
    }

    pub fn remove(&mut self, item: &T) -> Option<T> {
        self.items.remove(&item.key())
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains_key(&item.key())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.get(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate elements in key order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    /// Elements as a vector, in key order.
    pub fn to_list(&self) -> Vec<T> {
        self.items.values().cloned().collect()
    }

    /// Keys in order. Mostly useful in tests and log output.
    pub fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    /// Insert every element of `other` into `self`.
    pub fn add_set(&mut self, other: &Set<T>) {
        for item in other.iter() {
            self.insert(item.clone());
        }
    }

    pub fn union(&self, other: &Set<T>) -> Set<T> {
        let mut out = self.clone();
        out.add_set(other);
        out
    }

    /// Elements of `self` whose key is absent from `other`.
    pub fn difference(&self, other: &Set<T>) -> Set<T> {
        let mut out = Set::new();
        for item in self.iter() {
            if !other.contains(item) {
                out.insert(item.clone());
            }
        }
        out
    }
}

impl<T: Keyed + Clone> Default for Set<T> {
    fn default() -> Self {
        Set::new()
    }
}

impl<T: Keyed + Clone> PartialEq for Set<T> {
    /// Sets are equal when they hold the same keys; elements with equal
    /// keys are interchangeable by contract.
    fn eq(&self, other: &Self) -> bool {
        self.items.keys().eq(other.items.keys())
    }
}

impl<T: Keyed + Clone> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Set::from_list(iter)
    }
}

/// Every k-subset of `s` as an independent set, ordered by the sorted keys
/// of the source. Each result owns its elements, so mutating one subset
/// never affects another.
pub fn comb_set<T: Keyed + Clone>(s: &Set<T>, k: usize) -> Vec<Set<T>> {
    let items = s.to_list();
    let mut results = Vec::new();
    if k == 0 || k > items.len() {
        return results;
    }
    let mut current: Vec<T> = Vec::with_capacity(k);
    comb_rec(&items, k, 0, &mut current, &mut results);
    results
}

fn comb_rec<T: Keyed + Clone>(
    items: &[T],
    k: usize,
    start: usize,
    current: &mut Vec<T>,
    results: &mut Vec<Set<T>>,
) {
    if current.len() == k {
        results.push(Set::from_list(current.iter().cloned()));
        return;
    }
    let remaining = k - current.len();
    // leave enough tail elements to finish the subset
    for i in start..=(items.len() - remaining) {
        current.push(items[i].clone());
        comb_rec(items, k, i + 1, current, results);
        current.pop();
    }
}
