//! The policy interface and its model-free implementations.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::sync::Mutex;
use thiserror::Error;

use crate::decision::DecisionKind;
use crate::OptionRow;

/// Errors from the policy layer. These are fatal for the decision call
/// that hit them; the surrounding engine decides whether to fall back to
/// its heuristic controller.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// A policy that picks one option index from `[0, valid_count)`.
///
/// Implementations must be safe to call from several game threads at once;
/// the bridge never serializes calls on their behalf.
pub trait PolicyBridge: Send + Sync {
    fn choose_option(
        &self,
        state: &[f32],
        kind: DecisionKind,
        options: &[OptionRow],
        valid_count: usize,
    ) -> Result<usize, PolicyError>;

    /// Value estimate for the current position, in `[-1, 1]`. Policies
    /// without a value head return 0.
    fn evaluate_state(&self, _state: &[f32]) -> f32 {
        0.0
    }
}

/// Uniformly random choice. The default construction draws from the
/// thread-local generator (safe under concurrent calls); tests can pin a
/// seed instead.
#[derive(Debug, Default)]
pub struct RandomPolicy {
    seeded: Option<Mutex<ChaCha20Rng>>,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic variant for tests and reproducible self-play.
    pub fn with_seed(seed: u64) -> Self {
        RandomPolicy {
            seeded: Some(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
        }
    }

    fn pick(&self, bound: usize) -> usize {
        match &self.seeded {
            Some(rng) => rng
                .lock()
                .expect("rng lock poisoned")
                .gen_range(0..bound),
            None => rand::thread_rng().gen_range(0..bound),
        }
    }
}

impl PolicyBridge for RandomPolicy {
    fn choose_option(
        &self,
        _state: &[f32],
        _kind: DecisionKind,
        _options: &[OptionRow],
        valid_count: usize,
    ) -> Result<usize, PolicyError> {
        if valid_count == 0 {
            return Err(PolicyError::InvalidInput("no valid options".into()));
        }
        Ok(self.pick(valid_count))
    }
}

/// Epsilon-greedy exploration wrapper: with probability `epsilon` return a
/// uniformly random legal index, otherwise delegate to the inner policy.
pub struct EpsilonGreedy<P: PolicyBridge> {
    inner: P,
    epsilon: f32,
    rng: Mutex<ChaCha20Rng>,
}

impl<P: PolicyBridge> EpsilonGreedy<P> {
    pub fn new(inner: P, epsilon: f32) -> Self {
        EpsilonGreedy {
            inner,
            epsilon,
            rng: Mutex::new(ChaCha20Rng::from_entropy()),
        }
    }

    pub fn with_seed(inner: P, epsilon: f32, seed: u64) -> Self {
        EpsilonGreedy {
            inner,
            epsilon,
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }
}

impl<P: PolicyBridge> PolicyBridge for EpsilonGreedy<P> {
    fn choose_option(
        &self,
        state: &[f32],
        kind: DecisionKind,
        options: &[OptionRow],
        valid_count: usize,
    ) -> Result<usize, PolicyError> {
        if valid_count == 0 {
            return Err(PolicyError::InvalidInput("no valid options".into()));
        }
        let explore = {
            let mut rng = self.rng.lock().expect("rng lock poisoned");
            rng.gen::<f32>() < self.epsilon
        };
        if explore {
            let mut rng = self.rng.lock().expect("rng lock poisoned");
            return Ok(rng.gen_range(0..valid_count));
        }
        self.inner.choose_option(state, kind, options, valid_count)
    }

    fn evaluate_state(&self, state: &[f32]) -> f32 {
        self.inner.evaluate_state(state)
    }
}
