//! Fixed-size transposition table keyed by Zobrist hash.
//!
//! Slots are indexed by `hash % capacity`. Collisions evict; nothing is
//! chained or probed. [`TranspositionTable::find`] hands back the slot whether
//! or not it matches, so callers compare [`TTEntry::hash`] before trusting it.

use crate::moves::chess_move::{Move, NULL_MOVE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
    Uninitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    pub hash: u64,
    pub bound: Bound,
    /// Remaining search depth the score was computed with.
    pub depth: u32,
    pub score: i32,
    /// Set when a lookup relied on this entry during the current root search.
    pub useful: bool,
    pub best_move: Move,
}

impl TTEntry {
    pub const EMPTY: TTEntry = TTEntry {
        hash: 0,
        bound: Bound::Uninitialized,
        depth: 0,
        score: 0,
        useful: false,
        best_move: NULL_MOVE,
    };

    #[inline]
    pub fn matches(&self, hash: u64) -> bool {
        self.bound != Bound::Uninitialized && self.hash == hash
    }
}

impl Default for TTEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TTStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    stats: TTStats,
}

impl TranspositionTable {
    pub fn new_with_mb(size_mb: usize) -> Self {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let entry_size = std::mem::size_of::<TTEntry>().max(1);
        Self::with_capacity(bytes / entry_size)
    }

    pub fn with_capacity(count: usize) -> Self {
        Self {
            entries: vec![TTEntry::EMPTY; count.max(1)],
            stats: TTStats::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every slot, occupied or not.
    #[inline]
    pub fn entries(&self) -> &[TTEntry] {
        &self.entries
    }

    #[inline]
    pub fn stats(&self) -> TTStats {
        self.stats
    }

    #[inline]
    fn idx(&self, hash: u64) -> usize {
        (hash % self.entries.len() as u64) as usize
    }

    /// The slot `hash` maps to, matching or not.
    pub fn find(&mut self, hash: u64) -> &mut TTEntry {
        self.stats.probes += 1;
        let idx = self.idx(hash);
        let slot = &mut self.entries[idx];
        if slot.matches(hash) {
            self.stats.hits += 1;
        }
        slot
    }

    /// Stores `entry` if the replacement policy allows it. Returns whether it was written.
    pub fn put(&mut self, entry: TTEntry) -> bool {
        let idx = self.idx(entry.hash);
        if !Self::should_replace(&self.entries[idx], &entry) {
            return false;
        }
        self.stats.stores += 1;
        self.entries[idx] = entry;
        true
    }

    /// Exact entries are only displaced by exact ones; otherwise a slot consulted
    /// during the current search is kept.
    #[inline]
    fn should_replace(existing: &TTEntry, incoming: &TTEntry) -> bool {
        let existing_exact = existing.bound == Bound::Exact;
        let incoming_exact = incoming.bound == Bound::Exact;
        match (existing_exact, incoming_exact) {
            (true, false) => false,
            (false, true) => true,
            _ => !existing.useful,
        }
    }

    /// Clears every `useful` mark. Called once per root search.
    pub fn invalidate_all(&mut self) {
        for entry in &mut self.entries {
            entry.useful = false;
        }
    }

    pub fn clear(&mut self) {
        self.entries.fill(TTEntry::EMPTY);
        self.stats = TTStats::default();
    }
}
