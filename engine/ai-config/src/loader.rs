//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::AiProfile;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from a subdirectory)
];

/// Load the AI profile from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by the SKIRMISH_AI_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> AiProfile {
    // Check for explicit config path
    if let Ok(path) = std::env::var("SKIRMISH_AI_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from SKIRMISH_AI_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "SKIRMISH_AI_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(AiProfile::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &PathBuf) -> AiProfile {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(AiProfile::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(AiProfile::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, u64, f64, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: SKIRMISH_AI_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: AiProfile) -> AiProfile {
    // Common
    env_override!(config, common.log_level, "SKIRMISH_AI_COMMON_LOG_LEVEL");

    // Search
    env_override!(config, search.max_depth, "SKIRMISH_AI_SEARCH_MAX_DEPTH", parse);
    env_override!(
        config,
        search.time_limit_ms,
        "SKIRMISH_AI_SEARCH_TIME_LIMIT_MS",
        parse
    );
    env_override!(
        config,
        search.use_transposition_table,
        "SKIRMISH_AI_SEARCH_USE_TRANSPOSITION_TABLE",
        parse
    );
    env_override!(
        config,
        search.loop_detection,
        "SKIRMISH_AI_SEARCH_LOOP_DETECTION",
        parse
    );
    env_override!(config, search.pruning, "SKIRMISH_AI_SEARCH_PRUNING", parse);
    env_override!(
        config,
        search.futility_margin,
        "SKIRMISH_AI_SEARCH_FUTILITY_MARGIN",
        parse
    );
    env_override!(
        config,
        search.combo_state_bonus,
        "SKIRMISH_AI_SEARCH_COMBO_STATE_BONUS",
        parse
    );

    // MCTS
    env_override!(config, mcts.iterations, "SKIRMISH_AI_MCTS_ITERATIONS", parse);
    env_override!(
        config,
        mcts.exploration_constant,
        "SKIRMISH_AI_MCTS_EXPLORATION_CONSTANT",
        parse
    );
    env_override!(
        config,
        mcts.rollout_depth,
        "SKIRMISH_AI_MCTS_ROLLOUT_DEPTH",
        parse
    );

    // Bridge
    env_override!(config, bridge.mode, "SKIRMISH_AI_BRIDGE_MODE");
    env_override!(config, bridge.epsilon, "SKIRMISH_AI_BRIDGE_EPSILON", parse);
    env_override!(config, bridge.model_path, "SKIRMISH_AI_BRIDGE_MODEL_PATH");
    env_override!(
        config,
        bridge.training_data_dir,
        "SKIRMISH_AI_BRIDGE_TRAINING_DATA_DIR"
    );

    config
}
