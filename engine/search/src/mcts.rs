//! Monte Carlo Tree Search decision making.
//!
//! Nodes do not store game states; a node's state is reconstructed by
//! snapshotting the root game and replaying the action path, re-resolving
//! each [`MctsAction`] against that copy's candidate list (and aborting
//! the iteration when a step no longer resolves). Each iteration:
//!
//! 1. **Select**: walk down via UCB1 until a node is expandable or
//!    terminal; unvisited children score `+inf` so each gets tried once.
//! 2. **Expand**: replay the path on a fresh snapshot, discover legal
//!    actions (plus a trailing `PASS` pseudo-action) on first visit, and
//!    execute the next unexpanded action on the copy.
//! 3. **Rollout**: play a short heuristic playout (first land, else the
//!    highest-cost spell, for each side in turn), then evaluate.
//! 4. **Backpropagate**: bump visit counts and rewards up to the root.
//!
//! Thread safety: one `MctsSearch` instance serves one thread. Game copies
//! per iteration are isolated; there is no shared mutable state.

use std::time::Instant;

use ai_config::AiProfile;
use rules_core::{Action, Game, PlayerId};
use tracing::debug;

use crate::evaluator::GameStateEvaluator;
use crate::plan::{ActionRef, DecisionKind, Plan};
use crate::score::Score;

/// Score normalization scale (sigmoid steepness). Typical score
/// differences between actions are 50-300 points; a smaller scale means a
/// steeper sigmoid and better differentiation.
const SCORE_SCALE: f64 = 150.0;

/// Early termination: once one root child holds this fraction of visits
/// after the minimum iteration count, the search stops.
const EARLY_TERMINATION_MIN_ITERATIONS: u32 = 50;
const EARLY_TERMINATION_THRESHOLD: f64 = 0.80;

/// Root selection: a non-pass child within this mean-reward distance of
/// PASS is preferred over passing.
const PASS_PREFERENCE_MARGIN: f64 = 0.03;
/// Below this mean reward, passing beats the best action.
const MIN_ACTION_REWARD: f64 = 0.35;

/// Neutral reward for branches that could not be expanded.
const NEUTRAL_REWARD: f64 = 0.5;

/// An action edge in the tree: enough identity to re-find "the same"
/// action in a copied game's candidate list. `candidate_index == -1` is
/// the PASS pseudo-action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MctsAction {
    candidate_index: i32,
    description: String,
    host_card_name: String,
}

impl MctsAction {
    pub const PASS_INDEX: i32 = -1;

    pub fn pass() -> Self {
        MctsAction {
            candidate_index: Self::PASS_INDEX,
            description: "PASS".into(),
            host_card_name: String::new(),
        }
    }

    pub fn from_candidate<G: Game>(game: &G, candidates: &[Action], index: usize) -> Self {
        let action = &candidates[index];
        MctsAction {
            candidate_index: index as i32,
            description: action.description.clone(),
            host_card_name: action
                .host
                .and_then(|id| game.card(id))
                .map(|c| c.name.clone())
                .unwrap_or_default(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.candidate_index == Self::PASS_INDEX
    }

    /// Index-first, description-fallback resolution against a candidate
    /// list from a copied game.
    pub fn find_in<'a>(&self, candidates: &'a [Action]) -> Option<&'a Action> {
        if self.is_pass() {
            return None;
        }
        if self.candidate_index >= 0 {
            if let Some(action) = candidates.get(self.candidate_index as usize) {
                if action.description == self.description {
                    return Some(action);
                }
            }
        }
        candidates
            .iter()
            .find(|a| a.description == self.description)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(u32);

#[derive(Debug)]
struct MctsNode {
    parent: Option<NodeId>,
    action: Option<MctsAction>,
    children: Vec<NodeId>,
    /// Legal actions at this node, discovered on first expansion.
    legal_actions: Option<Vec<MctsAction>>,
    next_unexpanded: usize,
    visit_count: u32,
    total_reward: f64,
    terminal: bool,
    terminal_score: i32,
}

impl MctsNode {
    fn new(parent: Option<NodeId>, action: Option<MctsAction>) -> Self {
        MctsNode {
            parent,
            action,
            children: Vec::new(),
            legal_actions: None,
            next_unexpanded: 0,
            visit_count: 0,
            total_reward: 0.0,
            terminal: false,
            terminal_score: 0,
        }
    }

    fn is_fully_expanded(&self) -> bool {
        match &self.legal_actions {
            Some(actions) => self.next_unexpanded >= actions.len(),
            None => false,
        }
    }

    fn mean_reward(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.total_reward / self.visit_count as f64
        }
    }

    /// UCB1 = Q/N + c * sqrt(ln(parentN) / N); unvisited nodes win ties
    /// outright.
    fn ucb1(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visit_count == 0 {
            return f64::INFINITY;
        }
        let exploitation = self.total_reward / self.visit_count as f64;
        let exploration_term =
            exploration * ((parent_visits as f64).ln() / self.visit_count as f64).sqrt();
        exploitation + exploration_term
    }
}

/// One MCTS decision. Single-threaded; thread safety comes from instance
/// isolation.
pub struct MctsSearch<'g, G: Game> {
    root_game: &'g G,
    player: PlayerId,
    orig_score: Score,
    evaluator: GameStateEvaluator,

    max_iterations: u32,
    exploration_constant: f64,
    rollout_depth: u32,
    time_limit_ms: u64,

    nodes: Vec<MctsNode>,

    total_iterations: u32,
    total_time_ms: u64,
}

impl<'g, G: Game> MctsSearch<'g, G> {
    pub fn new(game: &'g G, player: PlayerId, profile: &AiProfile) -> Self {
        let mut evaluator =
            GameStateEvaluator::with_combo_bonus(profile.search.combo_state_bonus);
        let orig_score = evaluator.score_for_game_state(game, player);
        MctsSearch {
            root_game: game,
            player,
            orig_score,
            evaluator,
            max_iterations: profile.mcts.iterations,
            exploration_constant: profile.mcts.exploration_constant,
            rollout_depth: profile.mcts.rollout_depth,
            time_limit_ms: profile.search.time_limit_ms,
            nodes: Vec::new(),
            total_iterations: 0,
            total_time_ms: 0,
        }
    }

    fn node(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0 as usize]
    }

    fn allocate(&mut self, node: MctsNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Run the search and return the best action to play, or `None` when
    /// passing priority is the best move found.
    pub fn find_best_action(&mut self, candidates: &[Action]) -> Option<Action> {
        if candidates.is_empty() {
            return None;
        }

        let mut root_actions: Vec<MctsAction> = (0..candidates.len())
            .map(|i| MctsAction::from_candidate(self.root_game, candidates, i))
            .collect();
        root_actions.push(MctsAction::pass());

        self.nodes.clear();
        let root = self.allocate(MctsNode::new(None, None));
        self.node_mut(root).legal_actions = Some(root_actions);

        let start = Instant::now();
        let mut iterations = 0;
        while iterations < self.max_iterations {
            if start.elapsed().as_millis() as u64 > self.time_limit_ms {
                break;
            }
            self.run_iteration(root);
            iterations += 1;

            if iterations >= EARLY_TERMINATION_MIN_ITERATIONS && self.should_terminate_early(root)
            {
                break;
            }
        }
        self.total_iterations = iterations;
        self.total_time_ms = start.elapsed().as_millis() as u64;

        self.log_results(root);

        // Most-visited child wins; PASS only if no close non-pass rival.
        let mut best = self.best_child(root)?;
        if self.node(best).action.as_ref().is_some_and(|a| a.is_pass()) {
            let pass_reward = self.node(best).mean_reward();
            let rival = self
                .node(root)
                .children
                .iter()
                .copied()
                .filter(|&c| {
                    let n = self.node(c);
                    n.visit_count > 0 && !n.action.as_ref().is_some_and(|a| a.is_pass())
                })
                .filter(|&c| self.node(c).mean_reward() >= pass_reward - PASS_PREFERENCE_MARGIN)
                .max_by(|&a, &b| {
                    self.node(a)
                        .mean_reward()
                        .total_cmp(&self.node(b).mean_reward())
                });
            match rival {
                Some(r) => best = r,
                None => return None,
            }
        }

        // A weak best action loses to passing outright.
        if self.node(best).mean_reward() < MIN_ACTION_REWARD {
            return None;
        }

        self.node(best)
            .action
            .as_ref()
            .and_then(|a| a.find_in(candidates))
            .cloned()
    }

    /// Wrap the chosen action as a single-decision plan, for callers that
    /// consume minimax-style plans.
    pub fn build_plan(&self, chosen: &Action, candidates: &[Action]) -> Option<Plan> {
        let index = candidates
            .iter()
            .position(|a| a.description == chosen.description)?;
        let sequence = vec![crate::plan::DecisionNode {
            initial_score: self.orig_score,
            prev: None,
            kind: DecisionKind::Action(ActionRef::new(self.root_game, candidates, index)),
        }];
        Some(Plan::from_sequence(sequence, self.orig_score))
    }

    pub fn total_iterations(&self) -> u32 {
        self.total_iterations
    }

    pub fn total_time_ms(&self) -> u64 {
        self.total_time_ms
    }

    // --- iteration ----------------------------------------------------

    fn run_iteration(&mut self, root: NodeId) {
        // 1. SELECT
        let node = self.select(root);

        // 2. EXPAND
        let (expanded, sim_game) = match self.expand(node) {
            Some(result) => result,
            None => {
                // Expansion failed: neutral reward so the branch neither
                // attracts nor repels future iterations.
                self.backpropagate(node, NEUTRAL_REWARD);
                return;
            }
        };

        // 3. ROLLOUT (or terminal score)
        let reward = if self.node(expanded).terminal {
            self.normalize_score(self.node(expanded).terminal_score)
        } else {
            match sim_game {
                Some(mut game) => self.rollout(&mut game),
                None => NEUTRAL_REWARD,
            }
        };

        // 4. BACKPROPAGATE
        self.backpropagate(expanded, reward);
    }

    fn select(&self, root: NodeId) -> NodeId {
        let mut current = root;
        loop {
            let node = self.node(current);
            if !node.is_fully_expanded() || node.children.is_empty() || node.terminal {
                return current;
            }
            let parent_visits = node.visit_count;
            let best = node
                .children
                .iter()
                .copied()
                .max_by(|&a, &b| {
                    self.node(a)
                        .ucb1(parent_visits, self.exploration_constant)
                        .total_cmp(&self.node(b).ucb1(parent_visits, self.exploration_constant))
                });
            match best {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Replay the path to `node` on a fresh snapshot and expand one child.
    /// Returns the expanded node and the game copy positioned after the
    /// child's action (None for the copy when the node was terminal).
    fn expand(&mut self, node: NodeId) -> Option<(NodeId, Option<G>)> {
        if self.node(node).terminal {
            return Some((node, None));
        }

        let path = self.action_path(node);
        let mut game = self.root_game.snapshot();
        if !self.replay_actions(&mut game, &path) {
            return None;
        }

        // Replay ended the game: the next child is terminal right away.
        if game.is_over() {
            let next = self.next_unexpanded_action(node)?;
            let child = self.expand_child(node, next);
            let score = self.evaluator.score_for_game_state(&game, self.player);
            let child_node = self.node_mut(child);
            child_node.terminal = true;
            child_node.terminal_score = score.value;
            return Some((child, Some(game)));
        }

        if self.node(node).legal_actions.is_none() {
            let candidates = game.candidate_actions(self.player);
            let mut actions: Vec<MctsAction> = (0..candidates.len())
                .map(|i| MctsAction::from_candidate(&game, &candidates, i))
                .collect();
            actions.push(MctsAction::pass());
            self.node_mut(node).legal_actions = Some(actions);
        }

        let next = self.next_unexpanded_action(node)?;
        let child = self.expand_child(node, next.clone());

        if next.is_pass() {
            // Passing: the rollout shows what happens if we do nothing.
            return Some((child, Some(game)));
        }

        let candidates = game.candidate_actions(self.player);
        let resolved = next.find_in(&candidates).cloned();
        let played = match resolved {
            Some(action) => Self::play_heuristic_action(&mut game, self.player, &action),
            None => false,
        };
        if !played {
            // Game-copy mismatch or refused action: park the child as
            // terminal at the original score (neutral).
            let orig = self.orig_score.value;
            let child_node = self.node_mut(child);
            child_node.terminal = true;
            child_node.terminal_score = orig;
            return Some((child, Some(game)));
        }

        if game.is_over() {
            let score = self.evaluator.score_for_game_state(&game, self.player);
            let child_node = self.node_mut(child);
            child_node.terminal = true;
            child_node.terminal_score = score.value;
        }

        Some((child, Some(game)))
    }

    fn next_unexpanded_action(&self, node: NodeId) -> Option<MctsAction> {
        let n = self.node(node);
        let actions = n.legal_actions.as_ref()?;
        actions.get(n.next_unexpanded).cloned()
    }

    fn expand_child(&mut self, parent: NodeId, action: MctsAction) -> NodeId {
        let child = self.allocate(MctsNode::new(Some(parent), Some(action)));
        let parent_node = self.node_mut(parent);
        parent_node.children.push(child);
        parent_node.next_unexpanded += 1;
        child
    }

    fn action_path(&self, node: NodeId) -> Vec<MctsAction> {
        let mut path = Vec::new();
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            let n = self.node(id);
            if let Some(action) = &n.action {
                path.push(action.clone());
            }
            cursor = n.parent;
        }
        path.reverse();
        path
    }

    fn replay_actions(&self, game: &mut G, path: &[MctsAction]) -> bool {
        for action in path {
            if action.is_pass() {
                continue;
            }
            if game.is_over() {
                return false;
            }
            let candidates = game.candidate_actions(self.player);
            let resolved = match action.find_in(&candidates) {
                Some(a) => a.clone(),
                None => return false,
            };
            if !Self::play_heuristic_action(game, self.player, &resolved) {
                return false;
            }
        }
        true
    }

    /// Play an action, auto-resolving its open choices the way a playout
    /// would: first legal target, maximum affordable X.
    fn play_heuristic_action(game: &mut G, player: PlayerId, action: &Action) -> bool {
        let targets: Vec<_> = if action.requires_target {
            match game.legal_targets(player, action).first() {
                Some(&t) => vec![t],
                None => return false,
            }
        } else {
            Vec::new()
        };
        let x = action.x_range.map(|(lo, hi)| hi.max(lo));
        game.play_action(player, action, &targets, x)
    }

    /// Heuristic playout: each side in turn plays its first land, else its
    /// highest-cost spell, for at most `rollout_depth` half-turns.
    fn rollout(&mut self, game: &mut G) -> f64 {
        let opponent = self
            .root_game
            .opponents(self.player)
            .into_iter()
            .next();
        for _ in 0..self.rollout_depth {
            if game.is_over() {
                break;
            }
            let ai_played = Self::try_play_best_candidate(game, self.player);
            if game.is_over() {
                break;
            }
            let opp_played = match opponent {
                Some(opp) => Self::try_play_best_candidate(game, opp),
                None => false,
            };
            if !ai_played && !opp_played {
                break;
            }
        }
        let score = self.evaluator.score_for_game_state(game, self.player);
        self.normalize_score(score.value)
    }

    fn try_play_best_candidate(game: &mut G, player: PlayerId) -> bool {
        let candidates = game.candidate_actions(player);
        if candidates.is_empty() {
            return false;
        }
        let best = Self::select_best_heuristic(game, &candidates);
        Self::play_heuristic_action(game, player, &best.clone())
    }

    /// Lands first (a free resource), then the biggest spell.
    fn select_best_heuristic<'a>(game: &G, candidates: &'a [Action]) -> &'a Action {
        let mut best_land = None;
        let mut best_spell: Option<(&Action, u32)> = None;
        for action in candidates {
            if action.is_land_play {
                best_land = Some(action);
            } else {
                let cmc = action
                    .host
                    .and_then(|id| game.card(id))
                    .map(|c| c.cmc)
                    .unwrap_or(0);
                if best_spell.map_or(true, |(_, best_cmc)| cmc > best_cmc) {
                    best_spell = Some((action, cmc));
                }
            }
        }
        best_land
            .or(best_spell.map(|(a, _)| a))
            .unwrap_or(&candidates[0])
    }

    fn backpropagate(&mut self, from: NodeId, reward: f64) {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let node = self.node_mut(id);
            node.visit_count += 1;
            node.total_reward += reward;
            cursor = node.parent;
        }
    }

    /// Map an evaluator score into [0, 1]: a logistic centered on the
    /// pre-decision score, with the win/loss sentinels pinned to the ends.
    fn normalize_score(&self, score_value: i32) -> f64 {
        if score_value == i32::MAX {
            return 1.0;
        }
        if score_value == i32::MIN {
            return 0.0;
        }
        let relative = (score_value - self.orig_score.value) as f64;
        1.0 / (1.0 + (-relative / SCORE_SCALE).exp())
    }

    fn should_terminate_early(&self, root: NodeId) -> bool {
        let root_node = self.node(root);
        if root_node.children.len() < 2 {
            return false;
        }
        let best = match self.best_child(root) {
            Some(b) => b,
            None => return false,
        };
        let total = root_node.visit_count;
        total > 0
            && self.node(best).visit_count as f64 / total as f64 >= EARLY_TERMINATION_THRESHOLD
    }

    fn best_child(&self, root: NodeId) -> Option<NodeId> {
        self.node(root)
            .children
            .iter()
            .copied()
            .max_by_key(|&c| self.node(c).visit_count)
    }

    fn log_results(&self, root: NodeId) {
        debug!(
            iterations = self.total_iterations,
            elapsed_ms = self.total_time_ms,
            orig_score = self.orig_score.value,
            "mcts decision complete"
        );
        let best = self.best_child(root);
        for &child in &self.node(root).children {
            let node = self.node(child);
            let name = node
                .action
                .as_ref()
                .map(|a| a.description().to_string())
                .unwrap_or_else(|| "ROOT".into());
            debug!(
                action = %name,
                visits = node.visit_count,
                mean_reward = node.mean_reward(),
                best = Some(child) == best,
                "mcts child"
            );
        }
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
    fn test_normalize_score_endpoints() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new().phase(Phase::Main2).build();
        let search = MctsSearch::new(&game, p, &profile());

        assert!((search.normalize_score(i32::MAX) - 1.0).abs() < f64::EPSILON);
        assert!((search.normalize_score(i32::MIN)).abs() < f64::EPSILON);
        let neutral = search.normalize_score(search.orig_score.value);
        assert!((neutral - 0.5).abs() < 1e-9);
        assert!(search.normalize_score(search.orig_score.value + 150) > 0.7);
    }

    #[test]
    fn test_finds_lethal_action() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .life(PlayerId(1), 3)
            .hand(p, vec![cards::lava_spike(p), cards::bear(p)])
            .battlefield(p, vec![cards::mountain(p), cards::mountain(p)])
            .phase(Phase::Main1)
            .build();

        let candidates = game.candidate_actions(p);
        let mut search = MctsSearch::new(&game, p, &profile());
        let chosen = search.find_best_action(&candidates).expect("lethal exists");
        assert!(chosen.description.contains("Ember Lance"));
        assert!(search.total_iterations() > 0);
    }

    #[test]
    fn test_no_candidates_returns_none() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new().phase(Phase::Main1).build();
        let mut search = MctsSearch::new(&game, p, &profile());
        assert!(search.find_best_action(&[]).is_none());
    }

    #[test]
    fn test_self_harm_prefers_pass() {
        // The only playable action kills our own creature; every line
        // scores worse than passing, so the search returns no action.
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .hand(p, vec![cards::shock(p)])
            .battlefield(p, vec![cards::mountain(p), cards::bear(p)])
            .phase(Phase::Main1)
            .build();

        let candidates = game.candidate_actions(p);
        assert_eq!(candidates.len(), 1);
        let mut search = MctsSearch::new(&game, p, &profile());
        assert!(search.find_best_action(&candidates).is_none());
    }

    #[test]
    fn test_early_termination_on_dominant_child() {
        let p = PlayerId(0);
        // The spike is an instant win; the alternative draw spell decks us
        // (empty library), so one root child dominates quickly.
        let game = SkirmishBuilder::new()
            .life(PlayerId(1), 3)
            .hand(p, vec![cards::lava_spike(p), cards::divination(p)])
            .battlefield(
                p,
                vec![cards::mountain(p), cards::mountain(p), cards::island(p)],
            )
            .phase(Phase::Main1)
            .build();

        let candidates = game.candidate_actions(p);
        let mut profile = profile();
        profile.mcts.iterations = 10_000;
        let mut search = MctsSearch::new(&game, p, &profile);
        let chosen = search.find_best_action(&candidates);
        assert!(chosen.is_some());
        // The lethal child dominates long before the iteration cap.
        assert!(search.total_iterations() < 10_000);
    }

    #[test]
    fn test_build_plan_wraps_choice() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .life(PlayerId(1), 3)
            .hand(p, vec![cards::lava_spike(p)])
            .battlefield(p, vec![cards::mountain(p)])
            .phase(Phase::Main1)
            .build();

        let candidates = game.candidate_actions(p);
        let mut search = MctsSearch::new(&game, p, &profile());
        let chosen = search.find_best_action(&candidates).unwrap();
        let plan = search.build_plan(&chosen, &candidates).unwrap();
        assert_eq!(plan.decisions().len(), 1);
        assert_eq!(
            plan.decisions()[0].action.description(),
            chosen.description
        );
    }
}
