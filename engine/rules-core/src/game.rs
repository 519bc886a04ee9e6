//! The `Game` and `Combat` traits.

use crate::action::Action;
use crate::card::Card;
use crate::color::ManaColor;
use crate::ids::{CardId, PlayerId};
use crate::phase::Phase;
use crate::zone::Zone;

/// How a finished game ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub is_draw: bool,
    pub winning_team: Option<u8>,
    pub winning_player: Option<PlayerId>,
    /// Name of the win condition ("Life", "Milled", "Poison", ...).
    pub win_condition: String,
}

/// Deck-level statistics the evaluator's mana-base score compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeckStatistics {
    /// Most pips of each color appearing in any single cost, WUBRGC order.
    pub max_pips: [u32; ManaColor::COUNT],
    /// Highest converted cost in the deck.
    pub max_cost: u32,
}

/// An opaque match state plus the operations the decision core needs from
/// the rules engine.
///
/// Implementations must guarantee:
///
/// - `snapshot` produces a deep copy: mutating the copy never affects the
///   original.
/// - Card ids are stable across snapshots; ids of entities created *after*
///   a snapshot (tokens, copies) do not resolve in the original.
/// - `candidate_actions` produces descriptions that are reproducible: the
///   corresponding action in a snapshot's candidate list carries the same
///   description string.
pub trait Game: Sized {
    type Combat: Combat;

    // --- copying -------------------------------------------------------

    /// Deep-copy the match state.
    fn snapshot(&self) -> Self;

    /// Map a card handle from a copy back to the original game. Returns
    /// `None` when the entity has no antecedent there (e.g. a token created
    /// during simulation).
    fn reverse_map(&self, copied: CardId, original: &Self) -> Option<CardId>;

    // --- players -------------------------------------------------------

    fn players(&self) -> Vec<PlayerId>;
    fn opponents(&self, p: PlayerId) -> Vec<PlayerId>;
    fn team(&self, p: PlayerId) -> u8;

    fn life(&self, p: PlayerId) -> i32;
    fn poison_counters(&self, p: PlayerId) -> u32;
    fn max_hand_size(&self, p: PlayerId) -> usize;
    fn has_unlimited_hand_size(&self, p: PlayerId) -> bool {
        false
    }

    // --- zones ---------------------------------------------------------

    fn zone_size(&self, p: PlayerId, zone: Zone) -> usize;
    fn cards_in(&self, p: PlayerId, zone: Zone) -> Vec<&Card>;
    /// All permanents on the battlefield, every player.
    fn battlefield(&self) -> Vec<&Card>;
    fn creatures_in_play(&self, p: PlayerId) -> Vec<&Card>;
    fn card(&self, id: CardId) -> Option<&Card>;

    // --- turn structure ------------------------------------------------

    fn turn(&self) -> u32;
    fn phase(&self) -> Phase;
    fn is_player_turn(&self, p: PlayerId) -> bool;
    fn stack_size(&self) -> usize;

    /// Deterministically fast-forward to the given phase of the current
    /// turn, resolving the stack (and combat) along the way.
    fn advance_to_phase(&mut self, phase: Phase);

    // --- outcome -------------------------------------------------------

    fn is_over(&self) -> bool;
    fn outcome(&self) -> Option<Outcome>;

    // --- decisions -----------------------------------------------------

    fn deck_statistics(&self, p: PlayerId) -> DeckStatistics;

    /// Legal spell/ability activations in the current priority window.
    fn candidate_actions(&self, p: PlayerId) -> Vec<Action>;

    /// Legal targets for an action with `requires_target`.
    fn legal_targets(&self, p: PlayerId, action: &Action) -> Vec<CardId>;

    /// Apply a chosen action and resolve the stack. Returns `false` when
    /// the action could not be played (stale handle, cost unpayable).
    fn play_action(
        &mut self,
        p: PlayerId,
        action: &Action,
        targets: &[CardId],
        x: Option<u32>,
    ) -> bool;
}

/// Attack/block declaration surface for one combat.
pub trait Combat {
    fn attackers(&self) -> Vec<CardId>;
    /// Entities that can be attacked this combat (defending players).
    fn defenders(&self) -> Vec<PlayerId>;

    fn can_attack(&self, attacker: CardId, defender: PlayerId) -> bool;
    /// Whether the creature may block anything at all this combat.
    fn can_block(&self, blocker: CardId) -> bool;
    fn can_block_attacker(&self, attacker: CardId, blocker: CardId) -> bool;

    fn add_attacker(&mut self, attacker: CardId, defender: PlayerId);
    fn add_blocker(&mut self, attacker: CardId, blocker: CardId);
    fn clear_attackers(&mut self);
    /// Whether the current attack declaration is legal as a whole.
    fn validate_attackers(&self) -> bool;
}
