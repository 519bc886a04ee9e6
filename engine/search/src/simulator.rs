//! Simulation of a single action on a game snapshot.

use rules_core::{Action, CardId, Game, PlayerId};
use thiserror::Error;
use tracing::trace;

use crate::evaluator::GameStateEvaluator;
use crate::score::Score;

/// Why a branch could not be simulated. Either way the search abandons
/// the branch and moves on to the remaining candidates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    /// The action did not re-resolve in the copy's candidate list.
    #[error("stale action: {0}")]
    StaleAction(String),

    /// The rules engine refused to play the resolved action.
    #[error("action refused: {0}")]
    ActionRefused(String),
}

/// Owns one game copy and applies one action to it. Frames of the search
/// each own their simulator; the copy is dropped when the frame unwinds.
pub struct GameSimulator<G: Game> {
    game: G,
    player: PlayerId,
}

impl<G: Game> GameSimulator<G> {
    /// Snapshot `parent` as this simulator's working copy.
    pub fn new(parent: &G, player: PlayerId) -> Self {
        GameSimulator {
            game: parent.snapshot(),
            player,
        }
    }

    /// Re-resolve the action in the copy's candidate list (descriptions
    /// are the stable identity across copies), play it and score the
    /// resulting state.
    pub fn simulate(
        &mut self,
        action: &Action,
        targets: &[CardId],
        x: Option<u32>,
        evaluator: &mut GameStateEvaluator,
    ) -> Result<Score, SimulationError> {
        let candidates = self.game.candidate_actions(self.player);
        let resolved = candidates
            .iter()
            .find(|a| a.description == action.description)
            .cloned()
            .ok_or_else(|| SimulationError::StaleAction(action.description.clone()))?;

        if !self.game.play_action(self.player, &resolved, targets, x) {
            trace!(action = %action.description, "action refused by rules engine");
            return Err(SimulationError::ActionRefused(action.description.clone()));
        }
        Ok(evaluator.score_for_game_state(&self.game, self.player))
    }

    pub fn game(&self) -> &G {
        &self.game
    }
}
