//! Minimax search bookkeeping.
//!
//! The search is all-MAX: the evaluator already prices in the opponent's
//! imminent combat, so there is no min layer to cut with classical
//! alpha-beta. Instead the controller tracks the best score per depth (the
//! "alpha stack") and applies two prunings on top:
//!
//! - **Futility**: skip recursion for a move whose immediate score sits
//!   more than the configured margin below this depth's best.
//! - **Soft beta**: at depth >= 2, stop evaluating siblings once this
//!   depth's best has reached the parent depth's best. Not applied at
//!   depth 1 where inaccuracy would feed the root decision directly.
//!
//! The controller also owns the negative-effect cache ("action A from host
//! H on target T was worth delta <= 0; don't recurse into it again"), the
//! loop-detection hasher and the transposition table.

use std::time::Instant;

use ai_config::SearchConfig;
use rules_core::{Action, CardId, Game, PlayerId};
use tracing::trace;

use crate::evaluator::GameStateEvaluator;
use crate::hasher::StateHasher;
use crate::plan::{ActionRef, DecisionKind, DecisionNode, Plan};
use crate::score::Score;
use crate::ttable::{Bound, TranspositionTable, TtEntry};

#[derive(Debug, Clone)]
struct CachedEffect {
    /// Host card, reverse-mapped into the root game.
    host: CardId,
    /// Target card, reverse-mapped into the root game.
    target: CardId,
    action_description: String,
    /// The target's card score when the effect was cached; the shortcut
    /// only fires while the target still evaluates to this.
    target_score: i32,
    score_delta: i32,
}

/// Bookkeeping for one minimax decision.
pub struct SearchController {
    player: PlayerId,

    nodes: Vec<DecisionNode>,
    current_stack: Vec<usize>,
    score_stack: Vec<Score>,
    alpha_stack: Vec<i32>,

    best_score: Score,
    best_leaf: Option<usize>,

    effect_cache: Vec<CachedEffect>,
    current_host_target: Option<(CardId, CardId, i32)>,

    max_depth: u32,
    time_limit_ms: u64,
    pruning: bool,
    futility_margin: i32,
    loop_detection: bool,
    use_ttable: bool,

    hasher: StateHasher,
    ttable: TranspositionTable,
    start: Instant,
}

impl SearchController {
    pub fn new(initial_score: Score, player: PlayerId, config: &SearchConfig) -> Self {
        SearchController {
            player,
            nodes: Vec::new(),
            current_stack: Vec::new(),
            score_stack: vec![initial_score],
            alpha_stack: vec![initial_score.value],
            best_score: initial_score,
            best_leaf: None,
            effect_cache: Vec::new(),
            current_host_target: None,
            max_depth: config.max_depth,
            time_limit_ms: config.time_limit_ms,
            pruning: config.pruning,
            futility_margin: config.futility_margin,
            loop_detection: config.loop_detection,
            use_ttable: config.use_transposition_table,
            hasher: StateHasher::new(),
            ttable: TranspositionTable::new(),
            start: Instant::now(),
        }
    }

    pub fn depth(&self) -> u32 {
        (self.score_stack.len() - 1) as u32
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Gate on descending further: stop once a winning line is known, the
    /// depth budget is spent, or the wall clock has run out.
    pub fn should_recurse(&self) -> bool {
        if self.best_score.is_win() {
            return false;
        }
        if self.depth() >= self.max_depth {
            return false;
        }
        self.elapsed_ms() <= self.time_limit_ms
    }

    /// Loop guard: has this simulated state been seen during this search?
    pub fn is_loop_detected<G: Game>(&mut self, game: &G) -> bool {
        if !self.loop_detection {
            return false;
        }
        self.hasher.has_seen_state(game, self.player)
    }

    /// Probe the transposition table for the current depth.
    pub fn probe_transposition_table<G: Game>(&mut self, game: &G) -> Option<TtEntry> {
        if !self.use_ttable {
            return None;
        }
        let hash = StateHasher::compute_hash(game);
        self.ttable.probe_for_depth(hash, self.depth())
    }

    pub fn store_in_transposition_table<G: Game>(&mut self, game: &G, score: Score, bound: Bound) {
        if !self.use_ttable {
            return;
        }
        let hash = StateHasher::compute_hash(game);
        self.ttable.store(hash, score, self.depth(), bound);
    }

    pub fn transposition_stats(&self) -> String {
        self.ttable.stats_summary()
    }

    // --- alpha tracking ------------------------------------------------

    /// Best score found so far at the current depth.
    pub fn alpha(&self) -> i32 {
        *self.alpha_stack.last().expect("alpha stack never empty")
    }

    /// Parent depth's best, the soft beta bound. `i32::MAX` at the root.
    pub fn parent_alpha(&self) -> i32 {
        if self.alpha_stack.len() < 2 {
            return i32::MAX;
        }
        self.alpha_stack[self.alpha_stack.len() - 2]
    }

    pub fn update_alpha(&mut self, score_value: i32) {
        let idx = self.alpha_stack.len() - 1;
        if score_value > self.alpha_stack[idx] {
            self.alpha_stack[idx] = score_value;
        }
    }

    /// Futility pruning: the move's immediate score is so far below this
    /// depth's best that deeper search cannot make it competitive.
    pub fn should_skip_recursion(&self, base_score_value: i32) -> bool {
        if !self.pruning {
            return false;
        }
        base_score_value.saturating_add(self.futility_margin) < self.alpha()
    }

    /// Soft beta cutoff: stop evaluating remaining siblings once this
    /// depth has matched the parent's best. Depth >= 2 only.
    pub fn should_beta_cutoff(&self) -> bool {
        if !self.pruning {
            return false;
        }
        if self.depth() < 2 {
            return false;
        }
        self.alpha() >= self.parent_alpha()
    }

    // --- decision stack ------------------------------------------------

    fn current_score(&self) -> Score {
        *self.score_stack.last().expect("score stack never empty")
    }

    fn last_decision(&self) -> Option<usize> {
        self.current_stack.last().copied()
    }

    fn push_decision(&mut self, kind: DecisionKind) {
        let node = DecisionNode {
            initial_score: self.current_score(),
            prev: self.last_decision(),
            kind,
        };
        self.nodes.push(node);
        self.current_stack.push(self.nodes.len() - 1);
    }

    pub fn evaluate_action<G: Game>(&mut self, game: &G, candidates: &[Action], index: usize) {
        self.push_decision(DecisionKind::Action(ActionRef::new(game, candidates, index)));
    }

    pub fn evaluate_targets(&mut self, targets: Vec<CardId>) {
        self.push_decision(DecisionKind::Targets(targets));
    }

    pub fn evaluate_modes(&mut self, mask: u32, description: String) {
        self.push_decision(DecisionKind::Modes(mask, description));
    }

    pub fn evaluate_cards(&mut self, cards: Vec<String>) {
        self.push_decision(DecisionKind::Cards(cards));
    }

    pub fn evaluate_x(&mut self, x: u32) {
        self.push_decision(DecisionKind::XValue(x));
    }

    /// Number of decisions currently pending on the stack.
    pub fn pending_decisions(&self) -> usize {
        self.current_stack.len()
    }

    /// Finish the innermost pending decision with its final score. When the
    /// decision both improved on its entry score and beats the global best,
    /// it becomes the new best leaf (the plan is its root path).
    pub fn done_evaluating(&mut self, score: Score) {
        if let Some(idx) = self.last_decision() {
            let improved_local = self.nodes[idx].initial_score.value < score.value;
            if improved_local && score.value > self.best_score.value {
                self.best_score = score;
                self.best_leaf = Some(idx);
            }
        }
        self.current_stack.pop();
    }

    /// Drop the innermost `count` pending decisions without scoring them
    /// (branch abandoned: stale action, loop, rules failure).
    pub fn abandon(&mut self, count: usize) {
        for _ in 0..count {
            self.current_stack.pop();
        }
    }

    /// Enter a recursion level rooted at a move with the given base score.
    pub fn push(&mut self, score: Score) {
        trace!(depth = self.depth(), "recursing");
        self.score_stack.push(score);
        // The child level's bar starts at "just play the move and stop".
        self.alpha_stack.push(score.value);
    }

    /// Leave a recursion level, returning the best score achieved in it.
    pub fn pop(&mut self) -> i32 {
        let achieved = self.alpha();
        self.score_stack.pop();
        self.alpha_stack.pop();
        achieved
    }

    pub fn best_score(&self) -> Score {
        self.best_score
    }

    /// Materialize the best line. Must only be called once the decision
    /// stack has fully unwound.
    pub fn best_plan(&self) -> Plan {
        assert!(
            self.current_stack.is_empty(),
            "best_plan() expects the decision stack to be empty"
        );
        let mut sequence = Vec::new();
        let mut cursor = self.best_leaf;
        while let Some(idx) = cursor {
            sequence.push(self.nodes[idx].clone());
            cursor = self.nodes[idx].prev;
        }
        sequence.reverse();
        Plan::from_sequence(sequence, self.best_score)
    }

    // --- effect cache --------------------------------------------------

    /// Record which original-game (host, target) pair the decision being
    /// evaluated acts on, for caching when it completes. `game` is the
    /// state the action is being simulated from.
    pub fn set_host_and_target<G: Game>(
        &mut self,
        game: &G,
        root: &G,
        action: &Action,
        target: CardId,
        evaluator: &mut GameStateEvaluator,
    ) {
        let player = self.player;
        self.current_host_target = Self::map_to_root(game, root, action, target).map(
            |(root_host, root_target)| {
                let target_score = game
                    .card(target)
                    .map(|c| evaluator.eval_card(game, player, c))
                    .unwrap_or_default();
                (root_host, root_target, target_score)
            },
        );
    }

    fn map_to_root<G: Game>(
        game: &G,
        root: &G,
        action: &Action,
        target: CardId,
    ) -> Option<(CardId, CardId)> {
        // Entities born during simulation (tokens, copies) have no
        // antecedent in the root game and cannot be cached.
        let host = action.host?;
        let root_host = game.reverse_map(host, root)?;
        let root_target = game.reverse_map(target, root)?;
        Some((root_host, root_target))
    }

    /// Effect-cache shortcut: if "action on this target" was already seen
    /// with a non-positive delta and the target still evaluates the same,
    /// return the implied score and skip the simulation entirely.
    pub fn should_skip_target<G: Game>(
        &mut self,
        game: &G,
        root: &G,
        action: &Action,
        target: CardId,
        evaluator: &mut GameStateEvaluator,
    ) -> Option<Score> {
        let (root_host, root_target) = Self::map_to_root(game, root, action, target)?;
        let card = game.card(target)?;
        let card_score = evaluator.eval_card(game, self.player, card);
        for effect in &self.effect_cache {
            if effect.host == root_host
                && effect.target == root_target
                && effect.action_description == action.description
                && effect.target_score == card_score
            {
                let current = self.current_score();
                return Some(Score::new(
                    current.value.saturating_add(effect.score_delta),
                    current.summon_sick_value,
                ));
            }
        }
        None
    }

    /// Called when a targeted decision finishes: negative-delta effects are
    /// cached so equivalent branches can be skipped outright. Only negative
    /// deltas are safe to cache; they only ever prove "don't bother".
    pub fn possibly_cache_result(&mut self, score: Score, action: &Action) {
        if let Some(idx) = self.last_decision() {
            let node = &self.nodes[idx];
            let score_delta = score.value.saturating_sub(node.initial_score.value);
            if score_delta <= 0 && matches!(node.kind, DecisionKind::Targets(_)) {
                if let Some((host, target, target_score)) = self.current_host_target {
                    self.effect_cache.push(CachedEffect {
                        host,
                        target,
                        action_description: action.description.clone(),
                        target_score,
                        score_delta,
                    });
                    trace!(
                        action = %action.description,
                        score_delta,
                        "cached negative effect"
                    );
                }
            }
        }
        self.current_host_target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_config::SearchConfig;

    fn config() -> SearchConfig {
        SearchConfig::default()
    }

    fn controller(initial: i32) -> SearchController {
        SearchController::new(Score::uniform(initial), PlayerId(0), &config())
    }

    #[test]
    fn test_depth_tracks_pushes() {
        let mut ctl = controller(0);
        assert_eq!(ctl.depth(), 0);
        ctl.push(Score::uniform(10));
        assert_eq!(ctl.depth(), 1);
        ctl.pop();
        assert_eq!(ctl.depth(), 0);
    }

    #[test]
    fn test_should_recurse_stops_on_win() {
        let mut ctl = controller(0);
        assert!(ctl.should_recurse());
        ctl.best_score = Score::WIN;
        assert!(!ctl.should_recurse());
    }

    #[test]
    fn test_should_recurse_depth_cap() {
        let mut ctl = controller(0);
        for _ in 0..config().max_depth {
            ctl.push(Score::uniform(0));
        }
        assert!(!ctl.should_recurse());
    }

    #[test]
    fn test_futility_pruning() {
        let mut ctl = controller(0);
        ctl.update_alpha(1000);
        // 1000 - 300 margin: 699 is futile, 700 is not.
        assert!(ctl.should_skip_recursion(699));
        assert!(!ctl.should_skip_recursion(700));
    }

    #[test]
    fn test_soft_beta_needs_depth_two() {
        let mut ctl = controller(0);
        ctl.push(Score::uniform(500));
        // Depth 1: never cut, even though alpha >= parent alpha.
        ctl.update_alpha(600);
        assert!(!ctl.should_beta_cutoff());

        ctl.push(Score::uniform(550));
        // Depth 2, child alpha 550 < parent alpha 600: keep searching.
        assert!(!ctl.should_beta_cutoff());
        ctl.update_alpha(600);
        assert!(ctl.should_beta_cutoff());
    }

    #[test]
    fn test_alpha_parent_alpha() {
        let mut ctl = controller(100);
        assert_eq!(ctl.alpha(), 100);
        assert_eq!(ctl.parent_alpha(), i32::MAX);
        ctl.push(Score::uniform(150));
        assert_eq!(ctl.alpha(), 150);
        assert_eq!(ctl.parent_alpha(), 100);
    }

    #[test]
    fn test_best_plan_walks_parents() {
        use rules_core::ApiKind;

        let mut ctl = controller(0);
        let candidates = vec![
            Action::simple("Cast Alpha [1]", None, ApiKind::Draw),
            Action::simple("Cast Beta [2]", None, ApiKind::Draw),
        ];
        let game = games_skirmish::SkirmishBuilder::new().build();

        // Root action improves to 50...
        ctl.evaluate_action(&game, &candidates, 0);
        ctl.push(Score::uniform(50));
        // ...and a nested action improves further to 120.
        ctl.evaluate_action(&game, &candidates, 1);
        ctl.done_evaluating(Score::uniform(120));
        ctl.update_alpha(120);
        let achieved = ctl.pop();
        ctl.done_evaluating(Score::new(achieved, 50));
        ctl.update_alpha(achieved);

        let plan = ctl.best_plan();
        assert_eq!(plan.decisions().len(), 2);
        assert_eq!(plan.decisions()[0].action.description(), "Cast Alpha [1]");
        assert_eq!(plan.decisions()[1].action.description(), "Cast Beta [2]");
        assert_eq!(plan.final_score().value, 120);
    }

    #[test]
    fn test_effect_cache_round_trip() {
        use games_skirmish::{cards, SkirmishBuilder};
        use rules_core::Phase;

        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .hand(p, vec![cards::shock(p)])
            .battlefield(p, vec![cards::mountain(p), cards::bear(p)])
            .phase(Phase::Main1)
            .build();
        let bear_id = game.creatures_in_play(p)[0].id;
        let candidates = game.candidate_actions(p);
        let action = candidates
            .iter()
            .find(|a| a.requires_target)
            .unwrap()
            .clone();

        let mut evaluator = crate::evaluator::GameStateEvaluator::new();
        let initial = Score::uniform(100);
        let mut ctl = SearchController::new(initial, p, &config());

        // Nothing cached yet.
        assert!(ctl
            .should_skip_target(&game, &game, &action, bear_id, &mut evaluator)
            .is_none());

        // Record a losing targeted branch (killing our own bear).
        ctl.evaluate_action(&game, &candidates, 0);
        ctl.evaluate_targets(vec![bear_id]);
        ctl.set_host_and_target(&game, &game, &action, bear_id, &mut evaluator);
        let bad = Score::uniform(40);
        ctl.possibly_cache_result(bad, &action);
        ctl.done_evaluating(bad);
        ctl.done_evaluating(bad);

        // The cache now short-circuits the same branch with the delta.
        let short = ctl
            .should_skip_target(&game, &game, &action, bear_id, &mut evaluator)
            .expect("negative effect cached");
        assert_eq!(short.value, 100 - 60);
    }

    #[test]
    fn test_positive_deltas_never_cached() {
        use games_skirmish::{cards, SkirmishBuilder};
        use rules_core::Phase;

        let p = PlayerId(0);
        let opp = PlayerId(1);
        let game = SkirmishBuilder::new()
            .hand(p, vec![cards::shock(p)])
            .battlefield(p, vec![cards::mountain(p)])
            .battlefield(opp, vec![cards::bear(opp)])
            .phase(Phase::Main1)
            .build();
        let bear_id = game.creatures_in_play(opp)[0].id;
        let candidates = game.candidate_actions(p);
        let action = candidates[0].clone();

        let mut evaluator = crate::evaluator::GameStateEvaluator::new();
        let mut ctl = SearchController::new(Score::uniform(100), p, &config());

        ctl.evaluate_action(&game, &candidates, 0);
        ctl.evaluate_targets(vec![bear_id]);
        ctl.set_host_and_target(&game, &game, &action, bear_id, &mut evaluator);
        let good = Score::uniform(250);
        ctl.possibly_cache_result(good, &action);
        ctl.done_evaluating(good);
        ctl.done_evaluating(good);

        assert!(ctl
            .should_skip_target(&game, &game, &action, bear_id, &mut evaluator)
            .is_none());
    }

    #[test]
    fn test_should_recurse_time_limit() {
        let mut cfg = config();
        cfg.time_limit_ms = 1;
        let ctl = SearchController::new(Score::uniform(0), PlayerId(0), &cfg);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(!ctl.should_recurse());
    }

    #[test]
    fn test_done_evaluating_requires_improvement() {
        use rules_core::ApiKind;

        let mut ctl = controller(100);
        let candidates = vec![Action::simple("Cast Alpha [1]", None, ApiKind::Draw)];
        let game = games_skirmish::SkirmishBuilder::new().build();

        // Scores above the global best but not above the entry score do
        // not become the plan (the move didn't actually help).
        ctl.evaluate_action(&game, &candidates, 0);
        ctl.done_evaluating(Score::uniform(100));
        assert!(ctl.best_plan().is_empty());
    }
}
