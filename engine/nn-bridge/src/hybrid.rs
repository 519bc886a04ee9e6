//! Hybrid controller: policy routing for the six highest-impact decisions
//! only. Everything else stays with the surrounding engine's heuristic
//! controller.
//!
//! Overridden decisions:
//! 1. spell selection (kept as a delegation seam, see
//!    [`HybridController::choose_spell_ability`]),
//! 2. keep-or-mulligan,
//! 3. London-mulligan tuck selection,
//! 4. declare attackers,
//! 5. declare blockers,
//! 6. single-entity targeting.

use rules_core::{Card, CardId, Combat, Game, PlayerId, Zone};

use crate::bridge::{PolicyBridge, PolicyError};
use crate::constants::CARD_FEATURES;
use crate::controller::BridgeCore;
use crate::decision::DecisionKind;
use crate::encoder::{encode_card, encode_state};
use crate::options::EntityRef;
use crate::OptionRow;

pub struct HybridController<P: PolicyBridge> {
    core: BridgeCore<P>,
    player: PlayerId,
}

impl<P: PolicyBridge> HybridController<P> {
    pub fn new(player: PlayerId, core: BridgeCore<P>) -> Self {
        HybridController { core, player }
    }

    pub fn core(&self) -> &BridgeCore<P> {
        &self.core
    }

    /// Spell selection stays with the heuristic layer for now: candidate
    /// enumeration (lands, castable spells, activations with payable
    /// costs) is owned by the heuristic controller, and routing the pick
    /// without owning the enumeration would choose among moves this layer
    /// cannot see.
    /// TODO: route spell selection here once candidate enumeration moves
    /// behind the rules facade's `candidate_actions` for the real engine.
    pub fn choose_spell_ability(&self) -> Option<usize> {
        None
    }

    /// Keep (true) or mulligan (false).
    pub fn mulligan_keep_hand<G: Game>(&self, game: &G) -> Result<bool, PolicyError> {
        self.core
            .choose_boolean(game, self.player, DecisionKind::Mulligan)
    }

    /// Which cards to put back under a London mulligan. Picks one card at
    /// a time; when the hand is not larger than the requirement there is
    /// no choice to make and the whole hand comes back.
    pub fn tuck_cards_via_mulligan<G: Game>(
        &self,
        game: &G,
        cards_to_return: usize,
    ) -> Result<Vec<CardId>, PolicyError> {
        let hand: Vec<&Card> = game.cards_in(self.player, Zone::Hand);
        if hand.len() <= cards_to_return {
            return Ok(hand.iter().map(|c| c.id).collect());
        }
        self.core.choose_multiple_cards(
            game,
            self.player,
            &hand,
            cards_to_return,
            cards_to_return,
            false,
            DecisionKind::CardChoice,
        )
    }

    /// Per-creature attack decisions. Returns `false` when the resulting
    /// declaration did not validate (attackers cleared; the caller should
    /// fall back to its heuristic declaration).
    pub fn declare_attackers<G: Game, C: Combat>(
        &self,
        game: &G,
        combat: &mut C,
    ) -> Result<bool, PolicyError> {
        let default_defender = match combat.defenders().first() {
            Some(&d) => d,
            None => return Ok(true),
        };
        let can_attack: Vec<CardId> = game
            .creatures_in_play(self.player)
            .iter()
            .filter(|c| combat.can_attack(c.id, default_defender))
            .map(|c| c.id)
            .collect();
        if can_attack.is_empty() {
            return Ok(true);
        }

        let state = encode_state(self.player, game);
        for id in can_attack {
            let card = match game.card(id) {
                Some(c) => c,
                None => continue,
            };
            // Option 0 = attack (the card itself), option 1 = stay back.
            let mut rows: Vec<OptionRow> = vec![[0.0; CARD_FEATURES]; 2];
            rows[0] = encode_card(card);
            let chosen = self.core.choose_logged(
                game,
                self.player,
                DecisionKind::Attack,
                &state,
                &rows,
                2,
            )?;
            if chosen == 0 {
                combat.add_attacker(id, default_defender);
            }
        }

        if !combat.validate_attackers() {
            combat.clear_attackers();
            return Ok(false);
        }
        Ok(true)
    }

    /// Per-attacker block decisions: for each attacker, pick a legal
    /// blocker or the trailing no-block slot.
    pub fn declare_blockers<G: Game, C: Combat>(
        &self,
        game: &G,
        combat: &mut C,
    ) -> Result<(), PolicyError> {
        let attackers = combat.attackers();
        if attackers.is_empty() {
            return Ok(());
        }
        let mut available: Vec<CardId> = game
            .creatures_in_play(self.player)
            .iter()
            .filter(|c| combat.can_block(c.id))
            .map(|c| c.id)
            .collect();
        if available.is_empty() {
            return Ok(());
        }

        let state = encode_state(self.player, game);
        for attacker in attackers {
            let block_options: Vec<CardId> = available
                .iter()
                .copied()
                .filter(|&b| combat.can_block_attacker(attacker, b))
                .collect();
            if block_options.is_empty() {
                continue;
            }

            // N blocker rows plus one zeroed "no block" row.
            let num_opts = block_options.len() + 1;
            let mut rows: Vec<OptionRow> = vec![[0.0; CARD_FEATURES]; num_opts];
            for (i, &id) in block_options.iter().enumerate() {
                if let Some(card) = game.card(id) {
                    rows[i] = encode_card(card);
                }
            }

            let chosen = self.core.choose_logged(
                game,
                self.player,
                DecisionKind::Block,
                &state,
                &rows,
                num_opts,
            )?;
            if chosen < block_options.len() {
                let blocker = block_options[chosen];
                combat.add_blocker(attacker, blocker);
                available.retain(|&b| b != blocker);
            }
        }
        Ok(())
    }

    /// Choose one entity for an effect. `None` when declining (only when
    /// `is_optional`).
    pub fn choose_single_entity<G: Game>(
        &self,
        game: &G,
        entities: &[EntityRef<'_>],
        is_optional: bool,
    ) -> Result<Option<usize>, PolicyError> {
        if entities.is_empty() {
            return Ok(None);
        }
        if entities.len() == 1 {
            return Ok(if is_optional { None } else { Some(0) });
        }
        self.core.choose_from_entities(
            game,
            self.player,
            entities,
            DecisionKind::CardChoice,
            is_optional,
        )
    }

    /// Record the game outcome and close the training data writer.
    pub fn finish_game(&self, won: bool, turns: u32, reason: &str) {
        self.core.finish_game(won, turns, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_skirmish::{cards, SkirmishBuilder};

    struct Always(usize);

    impl PolicyBridge for Always {
        fn choose_option(
            &self,
            _state: &[f32],
            _kind: DecisionKind,
            _options: &[OptionRow],
            _valid_count: usize,
        ) -> Result<usize, PolicyError> {
            Ok(self.0)
        }
    }

    fn controller(policy_answer: usize) -> HybridController<Always> {
        HybridController::new(PlayerId(0), BridgeCore::new(Always(policy_answer), None))
    }

    #[test]
    fn test_mulligan_answer_zero_keeps() {
        let game = SkirmishBuilder::new().build();
        assert!(controller(0).mulligan_keep_hand(&game).unwrap());
        assert!(!controller(1).mulligan_keep_hand(&game).unwrap());
    }

    #[test]
    fn test_tuck_returns_requested_count() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .hand(
                p,
                vec![cards::bear(p), cards::mountain(p), cards::shock(p)],
            )
            .build();
        let tucked = controller(0).tuck_cards_via_mulligan(&game, 2).unwrap();
        assert_eq!(tucked.len(), 2);
        // Distinct cards.
        assert_ne!(tucked[0], tucked[1]);
    }

    #[test]
    fn test_tuck_whole_hand_when_no_choice() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new().hand(p, vec![cards::bear(p)]).build();
        let tucked = controller(0).tuck_cards_via_mulligan(&game, 1).unwrap();
        assert_eq!(tucked.len(), 1);
    }

    #[test]
    fn test_declare_attackers_all_in() {
        let p = PlayerId(0);
        let opp = PlayerId(1);
        let game = SkirmishBuilder::new()
            .battlefield(p, vec![cards::bear(p), cards::hill_giant(p)])
            .battlefield(opp, vec![cards::bear(opp)])
            .build();
        let mut combat = game.new_combat(p);

        // Policy always answers 0 ("attack").
        assert!(controller(0).declare_attackers(&game, &mut combat).unwrap());
        assert_eq!(combat.attackers().len(), 2);

        // Policy always answers 1 ("stay back").
        let mut combat = game.new_combat(p);
        assert!(controller(1).declare_attackers(&game, &mut combat).unwrap());
        assert!(combat.attackers().is_empty());
    }

    #[test]
    fn test_declare_blockers_assigns_each_blocker_once() {
        let p = PlayerId(0);
        let opp = PlayerId(1);
        let game = SkirmishBuilder::new()
            .battlefield(p, vec![cards::bear(p)])
            .battlefield(opp, vec![cards::hill_giant(opp), cards::bear(opp)])
            .build();

        // Opponent attacks with both creatures.
        let mut combat = game.new_combat(opp);
        for c in game.creatures_in_play(opp) {
            combat.add_attacker(c.id, p);
        }

        // Our bear blocks the first attacker; nothing left for the second.
        controller(0).declare_blockers(&game, &mut combat).unwrap();
        assert_eq!(combat.blocks().len(), 1);
    }

    #[test]
    fn test_single_entity_shortcuts() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new().build();
        let bear = cards::bear(p);
        let entities = [EntityRef::Card(&bear)];

        let ctl = controller(0);
        assert_eq!(ctl.choose_single_entity(&game, &entities, false).unwrap(), Some(0));
        // Optional with one candidate declines without consulting anyone.
        assert_eq!(ctl.choose_single_entity(&game, &entities, true).unwrap(), None);
    }

    #[test]
    fn test_spell_selection_delegates() {
        assert!(controller(0).choose_spell_ability().is_none());
    }
}
