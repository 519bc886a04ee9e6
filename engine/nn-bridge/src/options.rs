//! Option encoding.
//!
//! Each choice becomes a 16-float row matching the per-card schema of
//! [`crate::encoder::encode_card`]. Non-card options (players, strings,
//! numbers) use degenerate encodings in the first features.

use rules_core::{Action, Card, Game, PlayerId};

use crate::constants::CARD_FEATURES;
use crate::encoder::encode_card;
use crate::OptionRow;

/// A choosable entity: a card, or something opaque like a player.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Card(&'a Card),
    Player(PlayerId),
}

/// Encode a collection of cards as options.
pub fn encode_cards(cards: &[&Card]) -> Vec<OptionRow> {
    cards.iter().map(|c| encode_card(c)).collect()
}

/// Encode actions as options, using each action's host card. Actions with
/// no host get the ordinal fallback.
pub fn encode_actions<G: Game>(game: &G, actions: &[Action]) -> Vec<OptionRow> {
    let n = actions.len();
    actions
        .iter()
        .enumerate()
        .map(|(i, action)| match action.host.and_then(|id| game.card(id)) {
            Some(card) => encode_card(card),
            None => ordinal_row(i, n),
        })
        .collect()
}

/// Encode entities: cards use the card schema, anything else gets the
/// ordinal fallback `present = (i+1)/N`.
pub fn encode_entities(entities: &[EntityRef<'_>]) -> Vec<OptionRow> {
    let n = entities.len();
    entities
        .iter()
        .enumerate()
        .map(|(i, entity)| match entity {
            EntityRef::Card(card) => encode_card(card),
            EntityRef::Player(_) => ordinal_row(i, n),
        })
        .collect()
}

/// Encode a yes/no choice as two rows:
/// row 0 (yes) = `[1, 0, ...]`, row 1 (no) = `[0, 1, 0, ...]`.
pub fn encode_boolean_choice() -> Vec<OptionRow> {
    let mut rows = vec![[0.0; CARD_FEATURES]; 2];
    rows[0][0] = 1.0;
    rows[1][1] = 1.0;
    rows
}

/// Encode a numeric range as one row per integer in `[min, max]`, the
/// first feature ramping `(i - min) / (max - min)`. A single-value range
/// encodes as `1.0`.
pub fn encode_number_range(min: i32, max: i32) -> Vec<OptionRow> {
    let count = (max - min + 1).max(1) as usize;
    let range = (max - min) as f32;
    (0..count)
        .map(|i| {
            let mut row = [0.0; CARD_FEATURES];
            row[0] = if range == 0.0 { 1.0 } else { i as f32 / range };
            row
        })
        .collect()
}

fn ordinal_row(index: usize, count: usize) -> OptionRow {
    let mut row = [0.0; CARD_FEATURES];
    row[0] = (index + 1) as f32 / count as f32;
    row
}
