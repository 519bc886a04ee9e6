//! Decision search for the AI decision core.
//!
//! Two search strategies share one static evaluator:
//!
//! 1. A bounded-depth **minimax-style search** ([`ActionPicker`]). The
//!    search is all-MAX from the AI's perspective: the opponent's combat is
//!    folded into the evaluation by fast-forwarding each scored position to
//!    the combat damage step, so classical alpha-beta alternation does not
//!    apply. Pruning is futility pruning plus a soft beta cutoff, with
//!    killer/history move ordering and a transposition table.
//! 2. A **Monte Carlo Tree Search** ([`MctsSearch`]) over replayed action
//!    paths, with heuristic rollouts and UCB1 selection.
//!
//! Both hand back one concrete action (or "pass") per decision, and both
//! are single-threaded per decision: run N decisions on N threads by giving
//! each its own search state.

pub mod controller;
pub mod evaluator;
pub mod hasher;
pub mod mcts;
pub mod orderer;
pub mod picker;
pub mod plan;
pub mod score;
pub mod simulator;
pub mod ttable;

mod creature;
mod synergy;

pub use controller::SearchController;
pub use evaluator::GameStateEvaluator;
pub use hasher::StateHasher;
pub use mcts::{MctsAction, MctsSearch};
pub use orderer::MoveOrderer;
pub use picker::ActionPicker;
pub use plan::{ActionRef, DecisionKind, Plan, PlanDecision};
pub use score::Score;
pub use simulator::{GameSimulator, SimulationError};
pub use ttable::{Bound, TranspositionTable, TtEntry};
