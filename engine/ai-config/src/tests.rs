//! Tests for the configuration module.

use super::*;

#[test]
fn test_default_config() {
    let config = AiProfile::default();
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.search.max_depth, 3);
    assert_eq!(config.search.time_limit_ms, 5000);
    assert!(config.search.use_transposition_table);
    assert!(config.search.loop_detection);
    assert!(config.search.pruning);
    assert_eq!(config.search.futility_margin, 300);
    assert_eq!(config.search.combo_state_bonus, 0);
}

#[test]
fn test_mcts_defaults() {
    let config = AiProfile::default();
    assert_eq!(config.mcts.iterations, 200);
    assert!((config.mcts.exploration_constant - 1.414).abs() < f64::EPSILON);
    assert_eq!(config.mcts.rollout_depth, 4);
}

#[test]
fn test_bridge_defaults() {
    let config = AiProfile::default();
    assert_eq!(config.bridge.mode, "hybrid");
    assert!((config.bridge.epsilon).abs() < f64::EPSILON);
    assert!(config.bridge.model_path.is_empty());
    assert!(config.bridge.training_data_dir.is_empty());
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[search]
max_depth = 8
time_limit_ms = 3000
futility_margin = 150

[mcts]
iterations = 800
exploration_constant = 1.0

[bridge]
mode = "full"
epsilon = 0.1
"#;
    let config: AiProfile = toml::from_str(toml_content).unwrap();
    assert_eq!(config.search.max_depth, 8);
    assert_eq!(config.search.time_limit_ms, 3000);
    assert_eq!(config.search.futility_margin, 150);
    assert_eq!(config.mcts.iterations, 800);
    assert!((config.mcts.exploration_constant - 1.0).abs() < f64::EPSILON);
    assert_eq!(config.bridge.mode, "full");
    assert!((config.bridge.epsilon - 0.1).abs() < f64::EPSILON);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[search]
max_depth = 6
"#;
    let config: AiProfile = toml::from_str(toml_content).unwrap();
    assert_eq!(config.search.max_depth, 6);
    assert_eq!(config.search.futility_margin, 300); // Default
    assert_eq!(config.mcts.iterations, 200); // Default
    assert_eq!(config.bridge.mode, "hybrid"); // Default
}

#[test]
fn test_env_overrides() {
    std::env::set_var("SKIRMISH_AI_SEARCH_MAX_DEPTH", "5");
    std::env::set_var("SKIRMISH_AI_SEARCH_PRUNING", "false");
    std::env::set_var("SKIRMISH_AI_BRIDGE_MODE", "full");

    let config = apply_env_overrides(AiProfile::default());
    assert_eq!(config.search.max_depth, 5);
    assert!(!config.search.pruning);
    assert_eq!(config.bridge.mode, "full");

    std::env::remove_var("SKIRMISH_AI_SEARCH_MAX_DEPTH");
    std::env::remove_var("SKIRMISH_AI_SEARCH_PRUNING");
    std::env::remove_var("SKIRMISH_AI_BRIDGE_MODE");
}

#[test]
fn test_config_clone() {
    let config = AiProfile::default();
    let cloned = config.clone();
    assert_eq!(config.search.max_depth, cloned.search.max_depth);
    assert_eq!(config.bridge.mode, cloned.bridge.mode);
}
