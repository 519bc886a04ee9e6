//! Full controller: routes every discrete choice through the policy.
//!
//! Informational calls (reveal, notify), mana payment, combat damage
//! assignment, opening-hand side-boarding and coin flips remain with the
//! heuristic layer; either because they carry no decision or because they
//! need engine interaction this layer does not own. The helper set in
//! [`BridgeCore`] collapses the remaining surface into a few patterns:
//! pick-a-card, pick-an-entity, yes/no, number-in-range, multi-pick.

use rules_core::{Card, CardId, Combat, Game, ManaColor, PlayerId, Zone};

use crate::bridge::{PolicyBridge, PolicyError};
use crate::controller::BridgeCore;
use crate::decision::DecisionKind;
use crate::hybrid::HybridController;
use crate::options::EntityRef;

/// Outcome of a spell-selection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellChoice {
    /// Index into the candidate list.
    Chosen(usize),
    /// Let the heuristic layer decide.
    Delegate,
}

/// Policy routing for the whole discrete-decision surface. Wraps the
/// hybrid controller for the six decisions it already covers.
pub struct FullController<P: PolicyBridge> {
    inner: HybridController<P>,
    player: PlayerId,
}

impl<P: PolicyBridge> FullController<P> {
    pub fn new(player: PlayerId, core: BridgeCore<P>) -> Self {
        FullController {
            inner: HybridController::new(player, core),
            player,
        }
    }

    fn core(&self) -> &BridgeCore<P> {
        self.inner.core()
    }

    // --- the hybrid six ------------------------------------------------

    /// TODO: route spell selection here once candidate enumeration moves
    /// behind the rules facade's `candidate_actions` for the real engine.
    /// Until then the heuristic layer owns the pick.
    pub fn choose_spell_ability(&self) -> SpellChoice {
        SpellChoice::Delegate
    }

    pub fn mulligan_keep_hand<G: Game>(&self, game: &G) -> Result<bool, PolicyError> {
        self.inner.mulligan_keep_hand(game)
    }

    pub fn tuck_cards_via_mulligan<G: Game>(
        &self,
        game: &G,
        cards_to_return: usize,
    ) -> Result<Vec<CardId>, PolicyError> {
        self.inner.tuck_cards_via_mulligan(game, cards_to_return)
    }

    pub fn declare_attackers<G: Game, C: Combat>(
        &self,
        game: &G,
        combat: &mut C,
    ) -> Result<bool, PolicyError> {
        self.inner.declare_attackers(game, combat)
    }

    pub fn declare_blockers<G: Game, C: Combat>(
        &self,
        game: &G,
        combat: &mut C,
    ) -> Result<(), PolicyError> {
        self.inner.declare_blockers(game, combat)
    }

    pub fn choose_single_entity<G: Game>(
        &self,
        game: &G,
        entities: &[EntityRef<'_>],
        is_optional: bool,
    ) -> Result<Option<usize>, PolicyError> {
        self.inner.choose_single_entity(game, entities, is_optional)
    }

    // --- the broad surface ---------------------------------------------

    /// Yes/no confirmation (ability confirms, replacement choices, ...).
    pub fn confirm_action<G: Game>(&self, game: &G) -> Result<bool, PolicyError> {
        self.core()
            .choose_boolean(game, self.player, DecisionKind::Boolean)
    }

    pub fn confirm_mulligan_scry<G: Game>(&self, game: &G) -> Result<bool, PolicyError> {
        self.core()
            .choose_boolean(game, self.player, DecisionKind::Boolean)
    }

    /// Choose a number in `[min, max]` (announcements, X values, charge
    /// counters, ...). Equal bounds never consult the policy.
    pub fn choose_number<G: Game>(&self, game: &G, min: i32, max: i32) -> Result<i32, PolicyError> {
        self.core()
            .choose_number(game, self.player, DecisionKind::Number, min, max)
    }

    /// Pick one card from a list (discard, sacrifice, search, ...).
    pub fn choose_card<'a, G: Game>(
        &self,
        game: &G,
        cards: &[&'a Card],
    ) -> Result<Option<&'a Card>, PolicyError> {
        self.core()
            .choose_from_cards(game, self.player, cards, DecisionKind::CardChoice)
    }

    /// Choose between `min` and `max` cards from a list.
    pub fn choose_cards<G: Game>(
        &self,
        game: &G,
        cards: &[&Card],
        min: usize,
        max: usize,
        is_optional: bool,
    ) -> Result<Vec<CardId>, PolicyError> {
        self.core().choose_multiple_cards(
            game,
            self.player,
            cards,
            min,
            max,
            is_optional,
            DecisionKind::CardChoice,
        )
    }

    /// Pick a color (protection choices, hoofprint effects, ...).
    pub fn choose_color<G: Game>(
        &self,
        game: &G,
        colors: &[ManaColor],
    ) -> Result<Option<ManaColor>, PolicyError> {
        let names: Vec<String> = colors.iter().map(|c| format!("{:?}", c)).collect();
        let chosen = self
            .core()
            .choose_from_strings(game, self.player, &names, DecisionKind::Generic)?;
        Ok(chosen.map(|i| colors[i]))
    }

    /// Pick one mode text from a modal list.
    pub fn choose_mode<G: Game>(
        &self,
        game: &G,
        modes: &[String],
    ) -> Result<Option<usize>, PolicyError> {
        self.core()
            .choose_from_strings(game, self.player, modes, DecisionKind::Generic)
    }

    /// Pick an arbitrary string option (card names, variants, ...).
    pub fn choose_string<G: Game>(
        &self,
        game: &G,
        choices: &[String],
    ) -> Result<Option<usize>, PolicyError> {
        self.core()
            .choose_from_strings(game, self.player, choices, DecisionKind::Generic)
    }

    /// Discard down to the maximum hand size at end of turn.
    pub fn choose_cards_to_discard<G: Game>(
        &self,
        game: &G,
        count: usize,
    ) -> Result<Vec<CardId>, PolicyError> {
        let hand: Vec<&Card> = game.cards_in(self.player, Zone::Hand);
        if hand.len() <= count {
            return Ok(hand.iter().map(|c| c.id).collect());
        }
        self.core().choose_multiple_cards(
            game,
            self.player,
            &hand,
            count,
            count,
            false,
            DecisionKind::CardChoice,
        )
    }

    /// Who plays first after winning the die roll: a genuine boolean
    /// choice between going first ourselves and handing the opponent the
    /// play.
    pub fn choose_starting_player<G: Game>(&self, game: &G) -> Result<PlayerId, PolicyError> {
        let go_first = self
            .core()
            .choose_boolean(game, self.player, DecisionKind::Boolean)?;
        if go_first {
            Ok(self.player)
        } else {
            Ok(game
                .opponents(self.player)
                .into_iter()
                .next()
                .unwrap_or(self.player))
        }
    }

    pub fn finish_game(&self, won: bool, turns: u32, reason: &str) {
        self.inner.finish_game(won, turns, reason);
    }
}
