//! Transposition table.
//!
//! LRU cache from position hash to evaluated score. Avoids re-evaluating
//! positions reached through different move orders during deeper searches.
//!
//! Store policy: insert when no prior entry exists, or when the new entry
//! was searched at the same or greater depth. Probe policy: an entry only
//! answers queries at depths it was searched to cover.

use std::collections::{BTreeMap, HashMap};

use crate::score::Score;

/// How the cached score relates to the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Exact score at this depth.
    Exact,
    /// Lower bound (cutoff stopped the search early).
    LowerBound,
    /// Upper bound.
    UpperBound,
}

/// Entry storing the evaluated score and the depth it was searched at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub score: Score,
    pub depth: u32,
    pub bound: Bound,
}

/// Transposition table with least-recently-used eviction.
///
/// Recency is tracked with a monotonically increasing access stamp per
/// entry plus a stamp-ordered index, which gives O(log n) touch/evict.
#[derive(Debug)]
pub struct TranspositionTable {
    entries: HashMap<u64, (TtEntry, u64)>,
    recency: BTreeMap<u64, u64>,
    next_stamp: u64,
    max_size: usize,
    hits: u64,
    misses: u64,
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TranspositionTable {
    /// Default capacity of 100 000 entries.
    pub fn new() -> Self {
        Self::with_capacity(100_000)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            next_stamp: 0,
            max_size,
            hits: 0,
            misses: 0,
        }
    }

    fn touch(&mut self, hash: u64) {
        if let Some((_, stamp)) = self.entries.get_mut(&hash) {
            self.recency.remove(stamp);
            self.next_stamp += 1;
            *stamp = self.next_stamp;
            self.recency.insert(self.next_stamp, hash);
        }
    }

    /// Store an entry, replacing an existing one only when the new search
    /// was at least as deep.
    pub fn store(&mut self, hash: u64, score: Score, depth: u32, bound: Bound) {
        let replace = match self.entries.get(&hash) {
            None => true,
            Some((existing, _)) => depth >= existing.depth,
        };
        if !replace {
            // Reading the shallower entry still counts as a use.
            self.touch(hash);
            return;
        }

        if let Some((_, stamp)) = self.entries.remove(&hash) {
            self.recency.remove(&stamp);
        }
        self.next_stamp += 1;
        self.entries
            .insert(hash, (TtEntry { score, depth, bound }, self.next_stamp));
        self.recency.insert(self.next_stamp, hash);

        while self.entries.len() > self.max_size {
            if let Some((&oldest, &victim)) = self.recency.iter().next() {
                self.recency.remove(&oldest);
                self.entries.remove(&victim);
            } else {
                break;
            }
        }
    }

    /// Look up an entry, counting hit/miss telemetry.
    pub fn probe(&mut self, hash: u64) -> Option<TtEntry> {
        if self.entries.contains_key(&hash) {
            self.hits += 1;
            self.touch(hash);
            self.entries.get(&hash).map(|(e, _)| *e)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Look up an entry usable at the given search depth: the entry must
    /// have been searched at `depth` or deeper.
    pub fn probe_for_depth(&mut self, hash: u64, depth: u32) -> Option<TtEntry> {
        self.probe(hash).filter(|entry| entry.depth >= depth)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }

    /// Summary string for diagnostics.
    pub fn stats_summary(&self) -> String {
        format!(
            "TranspositionTable: size={}, hits={}, misses={}, hitRate={:.2}%",
            self.len(),
            self.hits,
            self.misses,
            self.hit_rate() * 100.0
        )
    }
}
