//! Position hashing and infinite-loop detection.
//!
//! The hash is deliberately lossy: it mixes only the fields that matter
//! for "have we been here before" during simulation, in a fixed order. Two
//! games equal under that projection hash identically; in particular a
//! game and its snapshot.

use std::collections::HashSet;

use rules_core::{Game, PlayerId, Zone};

const PRIME: u64 = 31;

/// Tracks positions seen during one search to detect simulation loops.
#[derive(Debug)]
pub struct StateHasher {
    seen_states: HashSet<u64>,
    max_seen_states: usize,
}

impl Default for StateHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHasher {
    /// Default cap of 10 000 tracked states; the set clears itself when
    /// the cap is reached.
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(max_seen_states: usize) -> Self {
        Self {
            seen_states: HashSet::new(),
            max_seen_states,
        }
    }

    /// Compute the 64-bit position hash. Field order is fixed: turn, phase
    /// ordinal, per-player (life, hand, graveyard, library, poison), each
    /// battlefield permanent (id, tapped; creatures add sick, net power,
    /// net toughness), stack depth.
    pub fn compute_hash<G: Game>(game: &G) -> u64 {
        let mut hash: u64 = 17;

        let mut mix = |value: i64| {
            hash = hash.wrapping_mul(PRIME).wrapping_add(value as u64);
        };

        mix(game.turn() as i64);
        mix(game.phase().ordinal() as i64);

        for p in game.players() {
            mix(game.life(p) as i64);
            mix(game.zone_size(p, Zone::Hand) as i64);
            mix(game.zone_size(p, Zone::Graveyard) as i64);
            mix(game.zone_size(p, Zone::Library) as i64);
            mix(game.poison_counters(p) as i64);
        }

        for c in game.battlefield() {
            mix(c.id.0 as i64);
            mix(if c.tapped { 1 } else { 0 });
            if c.is_creature() {
                mix(if c.sick { 1 } else { 0 });
                mix(c.net_power() as i64);
                mix(c.net_toughness() as i64);
            }
        }

        mix(game.stack_size() as i64);

        hash
    }

    /// Record the state and report whether it was already present (a
    /// potential loop). The set clears itself at capacity.
    pub fn has_seen_state<G: Game>(&mut self, game: &G, _ai_player: PlayerId) -> bool {
        if self.seen_states.len() >= self.max_seen_states {
            self.seen_states.clear();
        }
        let hash = Self::compute_hash(game);
        !self.seen_states.insert(hash)
    }

    pub fn clear(&mut self) {
        self.seen_states.clear();
    }

    pub fn seen_state_count(&self) -> usize {
        self.seen_states.len()
    }
}
