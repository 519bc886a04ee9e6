//! Move ordering.
//!
//! Orders candidate actions so the most promising are searched first,
//! which is what makes the pruning in the minimax layer bite. Three
//! signals, combined into one priority:
//!
//! 1. Killer moves: actions that caused a cutoff at the same depth in a
//!    sibling branch.
//! 2. History heuristic: actions that kept showing up on best lines.
//! 3. Static priority from the action's API kind (removal before card
//!    advantage before bodies before utility).
//!
//! Keys are `cardName:apiKind` strings: object identity does not survive
//! game copies, names do. The tables are owned by a single decision's
//! search state and the type is deliberately not `Sync`; history persists
//! across searches within a game (`clear` keeps it), `clear_all` resets
//! everything at game boundaries.

use std::cell::Cell;
use std::collections::HashMap;
use std::marker::PhantomData;

use rules_core::{Action, ApiKind, Game};

const MAX_KILLER_DEPTH: u32 = 20;
const KILLER_SLOTS: usize = 2;
const KILLER_PRIORITY: i32 = 10_000;
const HISTORY_LIMIT: usize = 10_000;

#[derive(Debug, Default)]
pub struct MoveOrderer {
    killer_moves: HashMap<u32, [Option<String>; KILLER_SLOTS]>,
    history_table: HashMap<String, i32>,
    // Per-thread by contract.
    _not_sync: PhantomData<Cell<()>>,
}

impl MoveOrderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Order candidate actions for search. Returns candidate indices,
    /// best first. Equal priorities keep their original order, so the
    /// permutation is deterministic for identical inputs and history.
    pub fn order_moves<G: Game>(&self, game: &G, actions: &[Action], depth: u32) -> Vec<usize> {
        let mut prioritized: Vec<(usize, i32)> = actions
            .iter()
            .enumerate()
            .map(|(i, a)| (i, self.compute_priority(game, a, depth)))
            .collect();
        prioritized.sort_by(|a, b| b.1.cmp(&a.1));
        prioritized.into_iter().map(|(i, _)| i).collect()
    }

    fn compute_priority<G: Game>(&self, game: &G, action: &Action, depth: u32) -> i32 {
        let key = Self::move_key(game, action);
        let mut priority = 0;

        if self.is_killer_move(&key, depth) {
            priority += KILLER_PRIORITY;
        }
        if let Some(history) = self.history_table.get(&key) {
            priority += history;
        }
        priority + Self::static_priority(action.api)
    }

    /// Static ordering by effect class.
    fn static_priority(api: ApiKind) -> i32 {
        match api {
            // Removal and damage first.
            ApiKind::Destroy
            | ApiKind::DestroyAll
            | ApiKind::Sacrifice
            | ApiKind::SacrificeAll
            | ApiKind::DealDamage
            | ApiKind::DamageAll
            | ApiKind::LoseLife
            | ApiKind::Counter => 500,

            // Card advantage.
            ApiKind::Draw | ApiKind::Mill | ApiKind::Discard | ApiKind::Pump | ApiKind::PumpAll => {
                400
            }

            // Bodies.
            ApiKind::Token
            | ApiKind::CopyPermanent
            | ApiKind::PermanentCreature
            | ApiKind::PermanentNoncreature => 300,

            // Mana and ramp.
            ApiKind::Mana | ApiKind::ManaReflected | ApiKind::ChangeZone => 250,

            // Utility.
            ApiKind::Attach | ApiKind::Animate | ApiKind::Regenerate | ApiKind::GainLife => 200,

            ApiKind::Other => 100,
        }
    }

    fn is_killer_move(&self, key: &str, depth: u32) -> bool {
        match self.killer_moves.get(&depth) {
            Some(killers) => killers.iter().flatten().any(|k| k.as_str() == key),
            None => false,
        }
    }

    /// Record a cutoff-causing action as a killer at its depth. The two
    /// slots act as a tiny MRU: new killers shift the old ones right.
    pub fn record_killer_move<G: Game>(&mut self, game: &G, action: &Action, depth: u32) {
        if depth >= MAX_KILLER_DEPTH {
            return;
        }
        let key = Self::move_key(game, action);
        let killers = self.killer_moves.entry(depth).or_default();
        if killers.iter().flatten().any(|k| *k == key) {
            return;
        }
        killers.rotate_right(1);
        killers[0] = Some(key);
    }

    /// Reward an action on the best line with `depth²` history bonus.
    pub fn update_history<G: Game>(&mut self, game: &G, action: &Action, depth: u32) {
        let key = Self::move_key(game, action);
        let bonus = (depth * depth) as i32;
        *self.history_table.entry(key).or_insert(0) += bonus;

        if self.history_table.len() > HISTORY_LIMIT {
            self.scale_down_history();
        }
    }

    fn scale_down_history(&mut self) {
        for value in self.history_table.values_mut() {
            *value /= 2;
        }
        self.history_table.retain(|_, v| *v != 0);
    }

    fn move_key<G: Game>(game: &G, action: &Action) -> String {
        let card_name = action
            .host
            .and_then(|id| game.card(id))
            .map(|c| c.name.as_str())
            .unwrap_or("unknown");
        format!("{}:{}", card_name, action.api.as_str())
    }

    /// Reset killers for a new search. History persists across searches
    /// within a game.
    pub fn clear(&mut self) {
        self.killer_moves.clear();
    }

    /// Reset everything at a game boundary.
    pub fn clear_all(&mut self) {
        self.killer_moves.clear();
        self.history_table.clear();
    }

    pub fn stats(&self) -> String {
        format!(
            "MoveOrderer: killerDepths={}, historyEntries={}",
            self.killer_moves.len(),
            self.history_table.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_skirmish::{cards, SkirmishBuilder};
    use rules_core::{Phase, PlayerId};

    fn game_with_candidates() -> (games_skirmish::SkirmishGame, Vec<Action>) {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .hand(
                p,
                vec![
                    cards::mountain(p),
                    cards::hill_giant(p),
                    cards::lava_spike(p),
                ],
            )
            .battlefield(p, vec![cards::mountain(p), cards::mountain(p), cards::mountain(p)])
            .phase(Phase::Main1)
            .build();
        let candidates = game.candidate_actions(p);
        (game, candidates)
    }

    #[test]
    fn test_static_ordering() {
        let (game, candidates) = game_with_candidates();
        assert_eq!(candidates.len(), 3);
        let orderer = MoveOrderer::new();
        let order = orderer.order_moves(&game, &candidates, 0);

        // Damage (500) before the creature (300) before the land (100).
        assert_eq!(candidates[order[0]].api, ApiKind::DealDamage);
        assert_eq!(candidates[order[1]].api, ApiKind::PermanentCreature);
        assert!(candidates[order[2]].is_land_play);
    }

    #[test]
    fn test_killer_move_jumps_the_queue() {
        let (game, candidates) = game_with_candidates();
        let mut orderer = MoveOrderer::new();
        let land = candidates.iter().find(|a| a.is_land_play).unwrap();

        orderer.record_killer_move(&game, land, 1);
        let order = orderer.order_moves(&game, &candidates, 1);
        assert!(candidates[order[0]].is_land_play);

        // At a different depth the killer does not apply.
        let order = orderer.order_moves(&game, &candidates, 2);
        assert_eq!(candidates[order[0]].api, ApiKind::DealDamage);
    }

    #[test]
    fn test_killer_depth_cap() {
        let (game, candidates) = game_with_candidates();
        let mut orderer = MoveOrderer::new();
        orderer.record_killer_move(&game, &candidates[0], MAX_KILLER_DEPTH);
        let order = orderer.order_moves(&game, &candidates, MAX_KILLER_DEPTH);
        // Nothing was recorded; static ordering still rules.
        assert_eq!(candidates[order[0]].api, ApiKind::DealDamage);
    }

    #[test]
    fn test_history_accumulates() {
        let (game, candidates) = game_with_candidates();
        let mut orderer = MoveOrderer::new();
        let creature = candidates
            .iter()
            .find(|a| a.api == ApiKind::PermanentCreature)
            .unwrap();

        // depth² per update: 16 + 16 + 16 ... needs to overcome the
        // static gap of 200 to the damage spell.
        for _ in 0..15 {
            orderer.update_history(&game, creature, 4);
        }
        let order = orderer.order_moves(&game, &candidates, 0);
        assert_eq!(candidates[order[0]].api, ApiKind::PermanentCreature);
    }

    #[test]
    fn test_clear_keeps_history() {
        let (game, candidates) = game_with_candidates();
        let mut orderer = MoveOrderer::new();
        let land = candidates.iter().find(|a| a.is_land_play).unwrap();

        orderer.record_killer_move(&game, land, 1);
        orderer.update_history(&game, land, 5);
        orderer.clear();

        // Killer gone, history survives.
        let order = orderer.order_moves(&game, &candidates, 1);
        assert_eq!(candidates[order[0]].api, ApiKind::DealDamage);
        assert!(orderer.stats().contains("historyEntries=1"));

        orderer.clear_all();
        assert!(orderer.stats().contains("historyEntries=0"));
    }

    #[test]
    fn test_ordering_reproducible_after_clear() {
        let (game, candidates) = game_with_candidates();
        let mut orderer = MoveOrderer::new();
        let before = orderer.order_moves(&game, &candidates, 0);
        orderer.clear();
        let after = orderer.order_moves(&game, &candidates, 0);
        assert_eq!(before, after);
    }

    #[test]
    fn test_history_scale_down() {
        let (game, candidates) = game_with_candidates();
        let mut orderer = MoveOrderer::new();
        // Seed one real entry with a large score.
        orderer.update_history(&game, &candidates[0], 10);
        // Force the table over the limit with synthetic keys.
        for i in 0..=HISTORY_LIMIT {
            orderer.history_table.insert(format!("filler-{i}:Other"), 1);
        }
        orderer.update_history(&game, &candidates[0], 1);
        // Everything halved; the filler entries at 1 dropped to 0 and out.
        assert!(orderer.history_table.len() <= 2);
    }
}
