//! Centralized AI profile configuration.
//!
//! Every tunable of the decision core lives here: search depth and time
//! budget, pruning toggles, evaluator bonuses, MCTS parameters and the
//! neural-bridge settings.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`SKIRMISH_AI_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! SKIRMISH_AI_<SECTION>_<KEY>=value
//!
//! Examples:
//!     SKIRMISH_AI_SEARCH_MAX_DEPTH=8
//!     SKIRMISH_AI_SEARCH_TIME_LIMIT_MS=3000
//!     SKIRMISH_AI_MCTS_ITERATIONS=400
//!     SKIRMISH_AI_BRIDGE_MODE=full
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;

#[cfg(test)]
mod tests;
