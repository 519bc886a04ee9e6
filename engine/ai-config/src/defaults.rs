//! Default configuration values.
//!
//! Single source of truth for every default used across the decision core.

// Common defaults
pub const LOG_LEVEL: &str = "info";

// Minimax search defaults
pub const SEARCH_MAX_DEPTH: u32 = 3;
pub const SEARCH_TIME_LIMIT_MS: u64 = 5000;
pub const USE_TRANSPOSITION_TABLE: bool = true;
pub const LOOP_DETECTION: bool = true;
pub const PRUNING: bool = true;
pub const FUTILITY_MARGIN: i32 = 300;
pub const COMBO_STATE_BONUS: i32 = 0;

// MCTS defaults
pub const MCTS_ITERATIONS: u32 = 200;
pub const MCTS_EXPLORATION_CONSTANT: f64 = 1.414;
pub const MCTS_ROLLOUT_DEPTH: u32 = 4;

// Neural bridge defaults
pub const BRIDGE_MODE: &str = "hybrid";
pub const BRIDGE_EPSILON: f64 = 0.0;
pub const MODEL_PATH: &str = "";
pub const TRAINING_DATA_DIR: &str = "";
