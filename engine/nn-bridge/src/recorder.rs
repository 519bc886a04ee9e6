//! Training-data recording.
//!
//! One newline-delimited JSON file per game: any number of decision
//! records followed by exactly one outcome record. File creation is lazy;
//! nothing is opened until the first decision lands, so short-lived
//! scratch controllers (snapshot restores, simulations) leave no empty
//! files behind.
//!
//! All write methods are mutually exclusive per instance: the surrounding
//! engine may call from several game threads through one controller. IO
//! failures are logged and mark the writer closed; they never crash the
//! game. Writes after close are silently dropped.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::decision::DecisionKind;
use crate::OptionRow;

/// One line of a training file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TrainingRecord {
    #[serde(rename = "decision")]
    #[serde(rename_all = "camelCase")]
    Decision {
        turn: u32,
        phase: String,
        decision_type: String,
        state: Vec<f32>,
        options: Vec<Vec<f32>>,
        num_options: usize,
        chosen_index: usize,
    },
    #[serde(rename = "outcome")]
    Outcome {
        result: f32,
        turns: u32,
        reason: String,
    },
}

#[derive(Debug)]
struct WriterState {
    file: Option<BufWriter<File>>,
    closed: bool,
}

/// Append-only per-game record writer.
#[derive(Debug)]
pub struct TrainingDataWriter {
    output_dir: PathBuf,
    state: Mutex<WriterState>,
}

impl TrainingDataWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        TrainingDataWriter {
            output_dir: output_dir.into(),
            state: Mutex::new(WriterState {
                file: None,
                closed: false,
            }),
        }
    }

    fn ensure_open(&self, state: &mut WriterState) -> std::io::Result<()> {
        if state.file.is_none() && !state.closed {
            fs::create_dir_all(&self.output_dir)?;
            let epoch_ms = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0);
            let name = format!("game_{}_{}.jsonl", Uuid::new_v4(), epoch_ms);
            let file = File::create(self.output_dir.join(name))?;
            state.file = Some(BufWriter::new(file));
        }
        Ok(())
    }

    fn write_record(&self, state: &mut WriterState, record: &TrainingRecord) {
        if state.closed {
            return;
        }
        let result = self.ensure_open(state).and_then(|()| {
            let writer = state.file.as_mut().expect("file opened by ensure_open");
            serde_json::to_writer(&mut *writer, record)?;
            writer.write_all(b"\n")?;
            writer.flush()
        });
        if let Err(e) = result {
            error!("training data writer failed, closing: {}", e);
            state.closed = true;
            state.file = None;
        }
    }

    pub fn record_decision(
        &self,
        turn: u32,
        phase: &str,
        kind: DecisionKind,
        state_vec: &[f32],
        options: &[OptionRow],
        num_options: usize,
        chosen_index: usize,
    ) {
        let record = TrainingRecord::Decision {
            turn,
            phase: phase.to_string(),
            decision_type: kind.name().to_string(),
            state: state_vec.to_vec(),
            options: options
                .iter()
                .take(num_options)
                .map(|row| row.to_vec())
                .collect(),
            num_options,
            chosen_index,
        };
        let mut guard = self.state.lock().expect("writer lock poisoned");
        self.write_record(&mut guard, &record);
    }

    pub fn record_outcome(&self, result: f32, turns: u32, reason: &str) {
        let record = TrainingRecord::Outcome {
            result,
            turns,
            reason: reason.to_string(),
        };
        let mut guard = self.state.lock().expect("writer lock poisoned");
        self.write_record(&mut guard, &record);
    }

    /// Flush and close. Subsequent writes are dropped.
    pub fn close(&self) {
        let mut guard = self.state.lock().expect("writer lock poisoned");
        if guard.closed {
            return;
        }
        guard.closed = true;
        if let Some(mut file) = guard.file.take() {
            if let Err(e) = file.flush() {
                error!("training data writer failed to flush on close: {}", e);
            }
        }
    }

    /// Whether a file has been created (i.e. something was recorded).
    pub fn has_output(&self) -> bool {
        self.state.lock().expect("writer lock poisoned").file.is_some()
    }
}
