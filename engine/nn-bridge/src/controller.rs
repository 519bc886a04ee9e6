//! Shared decision plumbing for the bridge controllers.
//!
//! Every choice funnels through [`BridgeCore::choose_logged`]: encode the
//! state, hand the options to the policy, clamp the answer into range,
//! optionally append a training record. The hybrid and full controllers
//! are thin method collections over these helpers.

use rules_core::{Card, CardId, Game, PlayerId};

use crate::bridge::{PolicyBridge, PolicyError};
use crate::constants::MAX_OPTIONS;
use crate::decision::DecisionKind;
use crate::encoder::encode_state;
use crate::options::{self, EntityRef};
use crate::recorder::TrainingDataWriter;
use crate::OptionRow;

/// Policy + optional recorder, shared by both controller flavors.
pub struct BridgeCore<P: PolicyBridge> {
    policy: P,
    recorder: Option<TrainingDataWriter>,
}

impl<P: PolicyBridge> BridgeCore<P> {
    pub fn new(policy: P, recorder: Option<TrainingDataWriter>) -> Self {
        BridgeCore { policy, recorder }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Record the final result and close the training file. After this,
    /// further decisions are no longer recorded.
    pub fn finish_game(&self, won: bool, turns: u32, reason: &str) {
        if let Some(recorder) = &self.recorder {
            recorder.record_outcome(if won { 1.0 } else { 0.0 }, turns, reason);
            recorder.close();
        }
    }

    /// Ask the policy for one option, clamped into `[0, valid_count)`,
    /// logging the call for training when a recorder is attached.
    pub fn choose_logged<G: Game>(
        &self,
        game: &G,
        _player: PlayerId,
        kind: DecisionKind,
        state: &[f32],
        options: &[OptionRow],
        valid_count: usize,
    ) -> Result<usize, PolicyError> {
        if valid_count == 0 {
            return Ok(0);
        }
        let chosen = self
            .policy
            .choose_option(state, kind, options, valid_count)?;
        let chosen = chosen.min(valid_count - 1);

        if let Some(recorder) = &self.recorder {
            recorder.record_decision(
                game.turn(),
                game.phase().name(),
                kind,
                state,
                options,
                valid_count,
                chosen,
            );
        }
        Ok(chosen)
    }

    /// Pick one card from a list. A single candidate is returned without
    /// consulting the policy.
    pub fn choose_from_cards<'a, G: Game>(
        &self,
        game: &G,
        player: PlayerId,
        cards: &[&'a Card],
        kind: DecisionKind,
    ) -> Result<Option<&'a Card>, PolicyError> {
        if cards.is_empty() {
            return Ok(None);
        }
        if cards.len() == 1 {
            return Ok(Some(cards[0]));
        }
        let state = encode_state(player, game);
        let rows = options::encode_cards(cards);
        let valid = cards.len().min(MAX_OPTIONS);
        let chosen = self.choose_logged(game, player, kind, &state, &rows, valid)?;
        Ok(Some(cards[chosen]))
    }

    /// Pick one entity, with an optional trailing "choose nothing" slot.
    /// Returns `None` for "nothing" (only when `is_optional`).
    pub fn choose_from_entities<G: Game>(
        &self,
        game: &G,
        player: PlayerId,
        entities: &[EntityRef<'_>],
        kind: DecisionKind,
        is_optional: bool,
    ) -> Result<Option<usize>, PolicyError> {
        if entities.is_empty() {
            return Ok(None);
        }
        if entities.len() == 1 && !is_optional {
            return Ok(Some(0));
        }

        let entity_count = entities.len();
        let num_opts = if is_optional {
            entity_count + 1
        } else {
            entity_count
        };
        // Cap at the policy's maximum; when optional and at the cap, the
        // "none" slot replaces the last entity.
        let num_opts = num_opts.min(MAX_OPTIONS);
        let encode_count = entity_count.min(if is_optional {
            num_opts - 1
        } else {
            num_opts
        });

        let state = encode_state(player, game);
        let mut rows = vec![[0.0; crate::constants::CARD_FEATURES]; num_opts];
        for (i, row) in options::encode_entities(&entities[..encode_count])
            .into_iter()
            .enumerate()
        {
            rows[i] = row;
        }
        // When optional, the last slot stays zeroed: "choose nothing".

        let chosen = self.choose_logged(game, player, kind, &state, &rows, num_opts)?;
        if is_optional && chosen >= encode_count {
            return Ok(None);
        }
        Ok(Some(chosen.min(encode_count - 1)))
    }

    /// Binary yes/no. Index 0 means yes.
    pub fn choose_boolean<G: Game>(
        &self,
        game: &G,
        player: PlayerId,
        kind: DecisionKind,
    ) -> Result<bool, PolicyError> {
        let state = encode_state(player, game);
        let rows = options::encode_boolean_choice();
        let chosen = self.choose_logged(game, player, kind, &state, &rows, 2)?;
        Ok(chosen == 0)
    }

    /// Pick a number in `[min, max]`. Equal bounds short-circuit without
    /// consulting the policy.
    pub fn choose_number<G: Game>(
        &self,
        game: &G,
        player: PlayerId,
        kind: DecisionKind,
        min: i32,
        max: i32,
    ) -> Result<i32, PolicyError> {
        if min == max {
            return Ok(min);
        }
        let state = encode_state(player, game);
        let rows = options::encode_number_range(min, max);
        let valid = rows.len().min(MAX_OPTIONS);
        let chosen = self.choose_logged(game, player, kind, &state, &rows, valid)?;
        Ok(min + chosen as i32)
    }

    /// Choose up to `max` cards, one at a time, with a "stop" slot once
    /// the minimum is satisfied (or from the start when optional).
    pub fn choose_multiple_cards<G: Game>(
        &self,
        game: &G,
        player: PlayerId,
        source: &[&Card],
        min: usize,
        max: usize,
        is_optional: bool,
        kind: DecisionKind,
    ) -> Result<Vec<CardId>, PolicyError> {
        let mut result: Vec<CardId> = Vec::new();
        let mut remaining: Vec<&Card> = source.to_vec();

        for _ in 0..max {
            if remaining.is_empty() {
                break;
            }
            let can_stop = is_optional || result.len() >= min;

            let num_opts = if can_stop {
                remaining.len() + 1
            } else {
                remaining.len()
            };
            let num_opts = num_opts.min(MAX_OPTIONS);
            let encode_count = remaining.len().min(if can_stop {
                num_opts - 1
            } else {
                num_opts
            });

            let state = encode_state(player, game);
            let mut rows = vec![[0.0; crate::constants::CARD_FEATURES]; num_opts];
            for (i, row) in options::encode_cards(&remaining[..encode_count])
                .into_iter()
                .enumerate()
            {
                rows[i] = row;
            }

            let chosen = self.choose_logged(game, player, kind, &state, &rows, num_opts)?;
            if can_stop && chosen >= encode_count {
                break;
            }
            let chosen = chosen.min(encode_count - 1);
            result.push(remaining[chosen].id);
            remaining.remove(chosen);
        }
        Ok(result)
    }

    /// Pick one string from a list by ordinal encoding.
    pub fn choose_from_strings<G: Game>(
        &self,
        game: &G,
        player: PlayerId,
        choices: &[String],
        kind: DecisionKind,
    ) -> Result<Option<usize>, PolicyError> {
        if choices.is_empty() {
            return Ok(None);
        }
        if choices.len() == 1 {
            return Ok(Some(0));
        }
        let state = encode_state(player, game);
        let n = choices.len().min(MAX_OPTIONS);
        let rows: Vec<OptionRow> = (0..n)
            .map(|i| {
                let mut row = [0.0; crate::constants::CARD_FEATURES];
                row[0] = (i + 1) as f32 / n as f32;
                row
            })
            .collect();
        let chosen = self.choose_logged(game, player, kind, &state, &rows, n)?;
        Ok(Some(chosen))
    }

}
