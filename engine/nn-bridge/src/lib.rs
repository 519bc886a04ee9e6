//! Neural decision bridge.
//!
//! Routes the "atomic" in-game choices that are not worth a tree search
//! (mulligans, attack/block declarations, targeting, yes/no, numbers, card
//! picks) to an external policy through a fixed feature encoding:
//!
//! - a 664-float **state vector** (global features, both battlefields, own
//!   hand),
//! - an `N x 16` **options matrix** (one row per choice), and
//! - for the ONNX policy, a flattened 1760-float input tensor with a
//!   decision-kind one-hot and a legality mask.
//!
//! The byte layout is a bit-exact contract with external policies; see
//! [`constants`].
//!
//! Policies: [`RandomPolicy`] (uniform), [`OnnxPolicy`] (model inference,
//! behind the `onnx` feature) and the [`EpsilonGreedy`] exploration
//! wrapper. Decisions and game outcomes can be recorded one file per game
//! by [`TrainingDataWriter`] for later training.
//!
//! Two controllers consume the bridge: [`HybridController`] overrides only
//! the six highest-impact decisions, [`FullController`] routes every
//! discrete choice it can express. Both delegate what they do not handle
//! back to the caller's heuristic layer.

pub mod bridge;
pub mod constants;
pub mod controller;
pub mod decision;
pub mod encoder;
pub mod full;
pub mod hybrid;
pub mod options;
pub mod recorder;

#[cfg(feature = "onnx")]
pub mod onnx;

pub use bridge::{EpsilonGreedy, PolicyBridge, PolicyError, RandomPolicy};
pub use controller::BridgeCore;
pub use decision::DecisionKind;
pub use full::{FullController, SpellChoice};
pub use hybrid::HybridController;
pub use options::EntityRef;
pub use recorder::{TrainingDataWriter, TrainingRecord};

#[cfg(feature = "onnx")]
pub use onnx::OnnxPolicy;

/// One option's 16 features.
pub type OptionRow = [f32; constants::CARD_FEATURES];
