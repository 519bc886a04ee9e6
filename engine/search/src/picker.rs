//! The minimax decision entry point.
//!
//! One `ActionPicker` serves one AI player for one game: the move
//! orderer's history persists across its decisions and is dropped with it
//! (or via [`ActionPicker::new_game`]). Each decision snapshots the game,
//! explores candidate actions depth-first and materializes the best line
//! as a [`Plan`].

use ai_config::AiProfile;
use rules_core::{Action, CardId, Game, PlayerId};
use tracing::debug;

use crate::controller::SearchController;
use crate::evaluator::GameStateEvaluator;
use crate::orderer::MoveOrderer;
use crate::plan::Plan;
use crate::score::Score;
use crate::simulator::GameSimulator;
use crate::ttable::Bound;

pub struct ActionPicker<G: Game> {
    player: PlayerId,
    profile: AiProfile,
    evaluator: GameStateEvaluator,
    orderer: MoveOrderer,
    _marker: std::marker::PhantomData<G>,
}

impl<G: Game> ActionPicker<G> {
    pub fn new(player: PlayerId, profile: AiProfile) -> Self {
        let evaluator = GameStateEvaluator::with_combo_bonus(profile.search.combo_state_bonus);
        ActionPicker {
            player,
            profile,
            evaluator,
            orderer: MoveOrderer::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Reset per-game state (killer and history tables).
    pub fn new_game(&mut self) {
        self.orderer.clear_all();
    }

    /// Pick the best action for the current priority window, or `None`
    /// when no candidate improves on doing nothing.
    pub fn choose_action(&mut self, game: &G) -> Option<Action> {
        let plan = self.build_plan(game)?;
        let first = plan.decisions().first()?;
        let candidates = game.candidate_actions(self.player);
        first.action.find_in(&candidates).cloned()
    }

    /// Run the search and return the full best line, or `None` when no
    /// line improves on the current position.
    pub fn build_plan(&mut self, game: &G) -> Option<Plan> {
        let initial = self.evaluator.score_for_game_state(game, self.player);
        if initial.is_terminal() {
            return None;
        }

        let mut controller = SearchController::new(initial, self.player, &self.profile.search);
        // Killers are per-search; history carries over.
        self.orderer.clear();

        self.explore(&mut controller, game, game);

        debug!(
            best = controller.best_score().value,
            initial = initial.value,
            elapsed_ms = controller.elapsed_ms(),
            tt = %controller.transposition_stats(),
            "minimax decision complete"
        );

        if controller.best_score().value > initial.value {
            let plan = controller.best_plan();
            (!plan.is_empty()).then_some(plan)
        } else {
            None
        }
    }

    /// The step loop at one depth: order candidates, simulate each (per
    /// target where the action needs one), recurse where worthwhile,
    /// update pruning state and the move orderer.
    fn explore(&mut self, controller: &mut SearchController, game: &G, root: &G) {
        let candidates = game.candidate_actions(self.player);
        if candidates.is_empty() {
            return;
        }
        let depth = controller.depth();
        let order = self.orderer.order_moves(game, &candidates, depth);
        let entry_alpha = controller.alpha();
        let mut best_here: Option<(i32, usize)> = None;

        'candidates: for idx in order {
            let action = candidates[idx].clone();

            let target_variants: Vec<Option<CardId>> = if action.requires_target {
                let targets = game.legal_targets(self.player, &action);
                if targets.is_empty() {
                    continue;
                }
                targets.into_iter().map(Some).collect()
            } else {
                vec![None]
            };

            for target in target_variants {
                if let Some(value) =
                    self.evaluate_candidate(controller, game, root, &candidates, idx, target)
                {
                    if best_here.map_or(true, |(best, _)| value > best) {
                        best_here = Some((value, idx));
                    }
                }
                if controller.should_beta_cutoff() {
                    self.orderer.record_killer_move(game, &action, depth);
                    break 'candidates;
                }
            }
        }

        if let Some((value, idx)) = best_here {
            if value > entry_alpha {
                self.orderer.update_history(game, &candidates[idx], depth);
            }
        }
    }

    /// Evaluate one (action, target) branch. Returns the branch's final
    /// score value, or `None` when the branch was abandoned.
    fn evaluate_candidate(
        &mut self,
        controller: &mut SearchController,
        game: &G,
        root: &G,
        candidates: &[Action],
        index: usize,
        target: Option<CardId>,
    ) -> Option<i32> {
        let action = &candidates[index];

        // Push the decision nodes for this branch. Targets go last so the
        // effect-cache hook sees them on top of the stack when the branch
        // completes.
        let mut pushed = 1;
        controller.evaluate_action(game, candidates, index);
        let x = action.x_range.map(|(lo, hi)| hi.max(lo));
        if let Some(x) = x {
            controller.evaluate_x(x);
            pushed += 1;
        }
        if let Some((mask, text)) = &action.mode_mask {
            controller.evaluate_modes(*mask, text.clone());
            pushed += 1;
        }
        if let Some(t) = target {
            controller.evaluate_targets(vec![t]);
            pushed += 1;
        }

        // Known-useless branch? The cache only ever holds non-positive
        // deltas, so skipping is safe.
        if let Some(t) = target {
            if let Some(short) =
                controller.should_skip_target(game, root, action, t, &mut self.evaluator)
            {
                for _ in 0..pushed {
                    controller.done_evaluating(short);
                }
                controller.update_alpha(short.value);
                return Some(short.value);
            }
            controller.set_host_and_target(game, root, action, t, &mut self.evaluator);
        }

        let mut simulator = GameSimulator::new(game, self.player);
        let targets: Vec<CardId> = target.into_iter().collect();
        let base = match simulator.simulate(action, &targets, x, &mut self.evaluator) {
            Ok(score) => score,
            Err(e) => {
                debug!(action = %action.description, error = %e, "branch abandoned");
                controller.abandon(pushed);
                return None;
            }
        };

        if controller.is_loop_detected(simulator.game()) {
            controller.abandon(pushed);
            return None;
        }

        let final_score = if let Some(entry) = controller.probe_transposition_table(simulator.game())
        {
            entry.score
        } else if base.is_win() {
            // A winning line short-circuits all further exploration here.
            base
        } else if controller.should_recurse() && !controller.should_skip_recursion(base.value) {
            controller.push(base);
            self.explore(controller, simulator.game(), root);
            let achieved = controller.pop();
            let score = Score::new(achieved, base.summon_sick_value);
            controller.store_in_transposition_table(simulator.game(), score, Bound::Exact);
            score
        } else {
            controller.store_in_transposition_table(simulator.game(), base, Bound::Exact);
            base
        };

        if target.is_some() {
            controller.possibly_cache_result(final_score, action);
        }
        for _ in 0..pushed {
            controller.done_evaluating(final_score);
        }
        controller.update_alpha(final_score.value);
        Some(final_score.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_skirmish::{cards, SkirmishBuilder};
    use rules_core::Phase;

    fn profile() -> AiProfile {
        AiProfile::default()
    }

    #[test]
    fn test_finds_lethal_line() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .life(PlayerId(1), 3)
            .hand(p, vec![cards::lava_spike(p), cards::bear(p)])
            .battlefield(p, vec![cards::mountain(p), cards::mountain(p)])
            .phase(Phase::Main1)
            .build();

        let mut picker = ActionPicker::new(p, profile());
        let action = picker.choose_action(&game).expect("lethal line exists");
        assert!(action.description.contains("Ember Lance"));

        let plan = picker.build_plan(&game).unwrap();
        assert!(plan.final_score().is_win());
    }

    #[test]
    fn test_targets_recorded_in_plan() {
        let p = PlayerId(0);
        let opp = PlayerId(1);
        let game = SkirmishBuilder::new()
            .hand(p, vec![cards::shock(p)])
            .battlefield(p, vec![cards::mountain(p)])
            .battlefield(opp, vec![cards::bear(opp)])
            .phase(Phase::Main1)
            .build();
        let bear_id = game.creatures_in_play(opp)[0].id;

        let mut picker = ActionPicker::new(p, profile());
        let plan = picker.build_plan(&game).expect("removal improves position");
        let first = &plan.decisions()[0];
        assert!(first.action.description().contains("Singe"));
        assert_eq!(first.targets.as_deref(), Some(&[bear_id][..]));
    }

    #[test]
    fn test_x_value_recorded_in_plan() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .life(PlayerId(1), 2)
            .hand(p, vec![cards::blaze(p)])
            .battlefield(
                p,
                vec![cards::mountain(p), cards::mountain(p), cards::mountain(p)],
            )
            .phase(Phase::Main1)
            .build();

        let mut picker = ActionPicker::new(p, profile());
        let plan = picker.build_plan(&game).expect("lethal X exists");
        let first = &plan.decisions()[0];
        assert!(first.action.description().contains("Wildfire Surge"));
        assert_eq!(first.x_value, Some(2));
        assert!(plan.final_score().is_win());
    }

    #[test]
    fn test_no_candidates_means_no_plan() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new().phase(Phase::Main1).build();
        let mut picker = ActionPicker::new(p, profile());
        assert!(picker.choose_action(&game).is_none());
    }

    #[test]
    fn test_multi_step_line() {
        // Playing the land enables casting the spike next: only the
        // two-step line reaches lethal.
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .life(PlayerId(1), 3)
            .hand(p, vec![cards::mountain(p), cards::lava_spike(p)])
            .phase(Phase::Main1)
            .build();

        let mut picker = ActionPicker::new(p, profile());
        let plan = picker.build_plan(&game).expect("two-step lethal exists");
        assert!(plan.final_score().is_win());
        assert_eq!(plan.decisions().len(), 2);
        assert!(plan.decisions()[0].action.description().contains("Mountain"));
        assert!(plan.decisions()[1]
            .action
            .description()
            .contains("Ember Lance"));
    }
}
