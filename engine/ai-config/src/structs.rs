//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct AiProfile {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.into(),
        }
    }
}

/// Minimax search configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Recursion cap for the minimax search.
    pub max_depth: u32,
    /// Wall-clock cap per decision, in milliseconds.
    pub time_limit_ms: u64,
    /// Enable transposition-table probe/store.
    pub use_transposition_table: bool,
    /// Enable the seen-hash infinite-loop guard.
    pub loop_detection: bool,
    /// Enable futility pruning and the soft beta cutoff.
    pub pruning: bool,
    /// Score gap below the depth's best at which recursion is skipped.
    pub futility_margin: i32,
    /// Magnitude of the evaluator's synergy bonus. 0 disables the scan.
    pub combo_state_bonus: i32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: defaults::SEARCH_MAX_DEPTH,
            time_limit_ms: defaults::SEARCH_TIME_LIMIT_MS,
            use_transposition_table: defaults::USE_TRANSPOSITION_TABLE,
            loop_detection: defaults::LOOP_DETECTION,
            pruning: defaults::PRUNING,
            futility_margin: defaults::FUTILITY_MARGIN,
            combo_state_bonus: defaults::COMBO_STATE_BONUS,
        }
    }
}

/// MCTS configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    /// Iteration cap per decision.
    pub iterations: u32,
    /// `c` in the UCB1 formula.
    pub exploration_constant: f64,
    /// Half-turns played in each rollout.
    pub rollout_depth: u32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: defaults::MCTS_ITERATIONS,
            exploration_constant: defaults::MCTS_EXPLORATION_CONSTANT,
            rollout_depth: defaults::MCTS_ROLLOUT_DEPTH,
        }
    }
}

/// Neural decision-bridge configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BridgeConfig {
    /// "hybrid" routes only the six high-impact decisions through the
    /// policy; "full" routes every discrete choice.
    pub mode: String,
    /// Epsilon-greedy exploration rate (0 disables the wrapper).
    pub epsilon: f64,
    /// Path to the ONNX policy model. Empty = use the random policy.
    pub model_path: String,
    /// Directory for per-game training records. Empty disables recording.
    pub training_data_dir: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mode: defaults::BRIDGE_MODE.into(),
            epsilon: defaults::BRIDGE_EPSILON,
            model_path: defaults::MODEL_PATH.into(),
            training_data_dir: defaults::TRAINING_DATA_DIR.into(),
        }
    }
}
