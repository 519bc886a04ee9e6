//! ONNX Runtime policy.
//!
//! # Model Format
//!
//! - Input: `"input"`: shape `(1, 1760)` float32: state[664] +
//!   decision-kind one-hot[8] + options flattened to 64x16 + legality
//!   mask[64].
//! - Output: `"policy"`: shape `(1, 64)` float32 logits.
//! - Output: `"value"`: shape `(1, 1)` float32 in `[-1, 1]`, optional.
//!
//! The chosen index is the argmax of the policy logits over legal indices
//! only. Inputs are little-endian in-memory floats; the layout is a
//! bit-exact contract with the trainer.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use ort::{session::Session, value::Value};
use tracing::{debug, info};

use crate::bridge::{PolicyBridge, PolicyError};
use crate::constants::{CARD_FEATURES, DECISION_KINDS, INPUT_SIZE, MAX_OPTIONS, STATE_SIZE};
use crate::decision::DecisionKind;
use crate::OptionRow;

/// ONNX-backed policy.
///
/// Uses a Mutex internally because `Session::run` requires `&mut self`,
/// but the `PolicyBridge` trait uses `&self` for thread-safe sharing.
/// Hot-reload builds the replacement session before the old one is
/// dropped, and the swap itself happens under the same lock; in-flight
/// inferences finish on the session they started with.
pub struct OnnxPolicy {
    session: Mutex<Session>,
    inference_count: AtomicU64,
    total_inference_time_us: AtomicU64,
}

impl std::fmt::Debug for OnnxPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxPolicy")
            .field(
                "inference_count",
                &self.inference_count.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}

fn build_session(model_path: &Path) -> Result<Session, PolicyError> {
    Session::builder()
        .map_err(|e| PolicyError::Model(format!("Failed to create session builder: {}", e)))?
        .with_intra_threads(1)
        .map_err(|e| PolicyError::Model(format!("Failed to set intra threads: {}", e)))?
        .commit_from_file(model_path)
        .map_err(|e| PolicyError::Model(format!("Failed to load model: {}", e)))
}

impl OnnxPolicy {
    /// Load an ONNX model from the given path.
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, PolicyError> {
        let session = build_session(model_path.as_ref())?;
        info!(path = %model_path.as_ref().display(), "loaded ONNX policy");
        Ok(Self {
            session: Mutex::new(session),
            inference_count: AtomicU64::new(0),
            total_inference_time_us: AtomicU64::new(0),
        })
    }

    /// Hot-swap the model. The new session is fully constructed before the
    /// old one is replaced; on failure the previous session stays live and
    /// the error is returned.
    pub fn reload<P: AsRef<Path>>(&self, model_path: P) -> Result<(), PolicyError> {
        let new_session = build_session(model_path.as_ref())?;
        {
            let mut guard = self
                .session
                .lock()
                .map_err(|e| PolicyError::InferenceFailed(format!("session lock poisoned: {}", e)))?;
            *guard = new_session;
        }
        info!(path = %model_path.as_ref().display(), "reloaded ONNX policy");
        Ok(())
    }

    /// Assemble the flat 1760-float input tensor.
    fn build_input(
        state: &[f32],
        kind: DecisionKind,
        options: &[OptionRow],
        valid_count: usize,
    ) -> Result<Vec<f32>, PolicyError> {
        if state.len() != STATE_SIZE {
            return Err(PolicyError::InvalidInput(format!(
                "expected {} state floats, got {}",
                STATE_SIZE,
                state.len()
            )));
        }
        let mut input = vec![0.0f32; INPUT_SIZE];
        input[..STATE_SIZE].copy_from_slice(state);

        let dt_offset = STATE_SIZE;
        input[dt_offset + kind.ordinal()] = 1.0;

        let opt_offset = dt_offset + DECISION_KINDS;
        for (i, row) in options.iter().take(valid_count.min(MAX_OPTIONS)).enumerate() {
            let at = opt_offset + i * CARD_FEATURES;
            input[at..at + CARD_FEATURES].copy_from_slice(row);
        }

        let mask_offset = opt_offset + MAX_OPTIONS * CARD_FEATURES;
        for slot in input
            .iter_mut()
            .skip(mask_offset)
            .take(valid_count.min(MAX_OPTIONS))
        {
            *slot = 1.0;
        }

        Ok(input)
    }

    /// Argmax of the logits over legal indices only.
    fn argmax_legal(logits: &[f32], valid_count: usize) -> usize {
        let mut best_idx = 0;
        let mut best_val = f32::NEG_INFINITY;
        for (i, &logit) in logits.iter().enumerate().take(valid_count.min(MAX_OPTIONS)) {
            if logit > best_val {
                best_val = logit;
                best_idx = i;
            }
        }
        best_idx
    }
}

impl PolicyBridge for OnnxPolicy {
    fn choose_option(
        &self,
        state: &[f32],
        kind: DecisionKind,
        options: &[OptionRow],
        valid_count: usize,
    ) -> Result<usize, PolicyError> {
        let input = Self::build_input(state, kind, options, valid_count)?;

        let input_array = ndarray::Array2::from_shape_vec((1, INPUT_SIZE), input)
            .map_err(|e| PolicyError::InvalidInput(format!("Failed to shape input: {}", e)))?;
        let input_value = Value::from_array(input_array)
            .map_err(|e| PolicyError::Model(format!("Failed to create input tensor: {}", e)))?;

        let inference_start = Instant::now();
        let logits: Vec<f32> = {
            let mut session = self.session.lock().map_err(|e| {
                PolicyError::InferenceFailed(format!("session lock poisoned: {}", e))
            })?;
            let outputs = session
                .run(ort::inputs!["input" => input_value])
                .map_err(|e| PolicyError::InferenceFailed(format!("Inference failed: {}", e)))?;

            let policy_output = outputs
                .get("policy")
                .ok_or_else(|| PolicyError::Model("Missing policy output".to_string()))?;
            let (_shape, policy_data) = policy_output
                .try_extract_tensor::<f32>()
                .map_err(|e| PolicyError::Model(format!("Failed to extract policy: {}", e)))?;
            policy_data.to_vec()
        };

        let inference_time_us = inference_start.elapsed().as_micros() as u64;
        self.total_inference_time_us
            .fetch_add(inference_time_us, Ordering::Relaxed);
        let count = self.inference_count.fetch_add(1, Ordering::Relaxed) + 1;
        if count % 10_000 == 0 {
            let total_us = self.total_inference_time_us.load(Ordering::Relaxed);
            debug!(
                inferences = count,
                avg_ms = (total_us / count) as f64 / 1000.0,
                "ONNX inference stats"
            );
        }

        Ok(Self::argmax_legal(&logits, valid_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_respects_legality() {
        let mut logits = vec![0.0f32; MAX_OPTIONS];
        logits[2] = 1.0;
        logits[10] = 9.0; // illegal: index >= valid_count
        assert_eq!(OnnxPolicy::argmax_legal(&logits, 5), 2);
        assert_eq!(OnnxPolicy::argmax_legal(&logits, 11), 10);
    }

    #[test]
    fn test_build_input_layout() {
        let state = vec![0.5f32; STATE_SIZE];
        let mut row = [0.0f32; CARD_FEATURES];
        row[0] = 1.0;
        let options = vec![row, row];

        let input =
            OnnxPolicy::build_input(&state, DecisionKind::Block, &options, 2).unwrap();
        assert_eq!(input.len(), INPUT_SIZE);
        // State copied verbatim.
        assert_eq!(input[STATE_SIZE - 1], 0.5);
        // One-hot at the BLOCK ordinal.
        assert_eq!(input[STATE_SIZE + DecisionKind::Block.ordinal()], 1.0);
        // Two option rows present.
        let opt_offset = STATE_SIZE + DECISION_KINDS;
        assert_eq!(input[opt_offset], 1.0);
        assert_eq!(input[opt_offset + CARD_FEATURES], 1.0);
        assert_eq!(input[opt_offset + 2 * CARD_FEATURES], 0.0);
        // Mask covers exactly the two legal slots.
        let mask_offset = opt_offset + MAX_OPTIONS * CARD_FEATURES;
        assert_eq!(input[mask_offset], 1.0);
        assert_eq!(input[mask_offset + 1], 1.0);
        assert_eq!(input[mask_offset + 2], 0.0);
    }

    #[test]
    fn test_build_input_rejects_bad_state() {
        assert!(OnnxPolicy::build_input(&[0.0; 10], DecisionKind::Boolean, &[], 0).is_err());
    }
}
