//! Per-round tally of proposed moves
//!
//! The ledger accumulates support counts for each distinct move proposed
//! since the last finalization. It is owned by the coordinator and mutated
//! only on the coordinator task, which is what makes concurrent identical
//! proposals count exactly once each.

use log::debug;
use shared::{Move, MoveKey};
use std::collections::HashMap;

/// A distinct proposed move and its accumulated support within the round.
#[derive(Debug, Clone)]
pub struct ProposalEntry {
    pub mv: Move,
    pub count: u32,
}

/// Proposal tallies for the current round, keyed by move identity.
#[derive(Debug)]
pub struct ProposalLedger {
    entries: HashMap<MoveKey, ProposalEntry>,
}

impl ProposalLedger {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Records one vote of support for `mv` and returns the updated count.
    ///
    /// The first proposal of a move within a round creates its entry with
    /// count 1; identical proposals increment it. Coordinates are not
    /// validated here; bounds checking is layered outside the tally.
    pub fn propose(&mut self, mv: Move) -> u32 {
        let entry = self
            .entries
            .entry(mv.key())
            .or_insert(ProposalEntry { mv, count: 0 });
        entry.count += 1;
        entry.count
    }

    /// Discards every entry, starting a new round.
    pub fn clear(&mut self) {
        debug!("Starting new round, discarding {} proposal(s)", self.entries.len());
        self.entries.clear();
    }

    /// Current support for a move; 0 if it has not been proposed this round.
    pub fn support_for(&self, mv: &Move) -> u32 {
        self.entries.get(&mv.key()).map_or(0, |entry| entry.count)
    }

    /// Number of distinct moves proposed this round
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
