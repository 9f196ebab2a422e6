//! Bounded best-first collection with a deterministic total order.

use std::cmp::Ordering;

/// An item with the keys it is ranked by.
#[derive(Debug, Clone)]
pub struct Ranked<T> {
    pub score: f64,
    pub cost: f64,
    /// Flat grid index; earlier candidates win exact ties.
    pub index: usize,
    pub item: T,
}

impl<T> Ranked<T> {
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        rank_keys((self.score, self.cost, self.index), (other.score, other.cost, other.index))
    }
}

/// Score descending, then cost ascending, then index ascending.
fn rank_keys(a: (f64, f64, usize), b: (f64, f64, usize)) -> Ordering {
    b.0.total_cmp(&a.0)
        .then_with(|| a.1.total_cmp(&b.1))
        .then_with(|| a.2.cmp(&b.2))
}

/// Keeps the best `capacity` entries, sorted best first.
///
/// The order depends only on the ranking keys, so merging partial
/// collections from any number of workers in any order gives the same result.
#[derive(Debug, Clone)]
pub struct TopK<T> {
    capacity: usize,
    entries: Vec<Ranked<T>>,
}

impl<T> TopK<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity.min(1024) + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Whether an entry with these keys would be kept.
    pub fn accepts(&self, score: f64, cost: f64, index: usize) -> bool {
        if self.capacity == 0 {
            return false;
        }
        match self.entries.last() {
            Some(worst) if self.is_full() => {
                rank_keys((score, cost, index), (worst.score, worst.cost, worst.index))
                    == Ordering::Less
            }
            _ => true,
        }
    }

    /// Inserts `entry` if it ranks inside the bound; returns whether it was kept.
    pub fn offer(&mut self, entry: Ranked<T>) -> bool {
        if !self.accepts(entry.score, entry.cost, entry.index) {
            return false;
        }
        let at = self
            .entries
            .partition_point(|e| e.rank_cmp(&entry) == Ordering::Less);
        self.entries.insert(at, entry);
        self.entries.truncate(self.capacity);
        true
    }

    /// Folds another collection into this one.
    pub fn merge(mut self, other: TopK<T>) -> Self {
        for entry in other.entries {
            self.offer(entry);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ranked<T>> {
        self.entries.iter()
    }

    pub fn into_sorted_vec(self) -> Vec<Ranked<T>> {
        self.entries
    }
}
