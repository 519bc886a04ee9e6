//! Game-state feature encoding.
//!
//! Layout (STATE_SIZE = 664 floats):
//!
//! | offset | width | content                                          |
//! |--------|-------|--------------------------------------------------|
//! | 0      | 24    | global features (life, hand, phase, mana, ...)   |
//! | 24     | 256   | my battlefield, 16 slots x 16 card features      |
//! | 280    | 256   | opponent battlefield, same layout                |
//! | 536    | 128   | my hand, 8 slots x 16                            |
//!
//! Slots are filled creatures-first, then by converted cost descending;
//! overflow is discarded and empty slots stay zero.

use rules_core::{Card, Game, Phase, PlayerId, Zone};

use crate::constants::{
    BATTLEFIELD_SLOTS, CARD_FEATURES, GLOBAL_FEATURES, HAND_SLOTS, STATE_SIZE,
};
use crate::OptionRow;

const MY_BATTLEFIELD_OFFSET: usize = GLOBAL_FEATURES;
const OPP_BATTLEFIELD_OFFSET: usize = MY_BATTLEFIELD_OFFSET + BATTLEFIELD_SLOTS * CARD_FEATURES;
const MY_HAND_OFFSET: usize = OPP_BATTLEFIELD_OFFSET + BATTLEFIELD_SLOTS * CARD_FEATURES;

/// Encode the full game state from `me`'s perspective.
pub fn encode_state<G: Game>(me: PlayerId, game: &G) -> Vec<f32> {
    let mut state = vec![0.0f32; STATE_SIZE];

    let opp = game.opponents(me).into_iter().next().unwrap_or(me);

    // Global features.
    state[0] = game.life(me) as f32 / 20.0;
    state[1] = game.life(opp) as f32 / 20.0;
    state[2] = game.zone_size(me, Zone::Hand) as f32 / 7.0;
    state[3] = game.zone_size(opp, Zone::Hand) as f32 / 7.0;
    state[4] = game.zone_size(me, Zone::Graveyard) as f32 / 20.0;
    state[5] = game.zone_size(opp, Zone::Graveyard) as f32 / 20.0;
    state[6] = game.zone_size(me, Zone::Library) as f32 / 60.0;
    state[7] = game.zone_size(opp, Zone::Library) as f32 / 60.0;
    state[8] = (game.turn() as f32 / 20.0).min(1.0);
    state[9] = if game.is_player_turn(me) { 1.0 } else { 0.0 };

    // Phase one-hot, indices 10..22.
    let phase = game.phase();
    for (i, p) in Phase::ALL.iter().enumerate() {
        state[10 + i] = if *p == phase { 1.0 } else { 0.0 };
    }

    // Untapped lands.
    let untapped_lands = game
        .cards_in(me, Zone::Battlefield)
        .iter()
        .filter(|c| c.is_land() && !c.tapped)
        .count();
    state[23] = untapped_lands as f32 / 10.0;

    encode_zone_slots(
        &mut state[MY_BATTLEFIELD_OFFSET..OPP_BATTLEFIELD_OFFSET],
        game.cards_in(me, Zone::Battlefield),
        BATTLEFIELD_SLOTS,
    );
    encode_zone_slots(
        &mut state[OPP_BATTLEFIELD_OFFSET..MY_HAND_OFFSET],
        game.cards_in(opp, Zone::Battlefield),
        BATTLEFIELD_SLOTS,
    );
    encode_zone_slots(
        &mut state[MY_HAND_OFFSET..],
        game.cards_in(me, Zone::Hand),
        HAND_SLOTS,
    );

    state
}

/// Encode one card into its 16-feature row. Shared with the option
/// encoders so a card looks the same as state and as a choice.
pub fn encode_card(card: &Card) -> OptionRow {
    let mut features = [0.0f32; CARD_FEATURES];

    features[0] = 1.0; // present
    features[1] = card.cmc as f32 / 10.0;
    features[2] = if card.is_creature() {
        card.net_power() as f32 / 20.0
    } else {
        0.0
    };
    features[3] = if card.is_creature() {
        card.net_toughness() as f32 / 20.0
    } else {
        0.0
    };
    features[4] = if card.is_creature() { 1.0 } else { 0.0 };
    features[5] = if card.is_land() { 1.0 } else { 0.0 };
    features[6] = if card.is_instant_or_sorcery() { 1.0 } else { 0.0 };
    features[7] = if card.types.enchantment { 1.0 } else { 0.0 };
    features[8] = if card.types.artifact { 1.0 } else { 0.0 };

    features[9] = if card.colors.has_white() { 1.0 } else { 0.0 };
    features[10] = if card.colors.has_blue() { 1.0 } else { 0.0 };
    features[11] = if card.colors.has_black() { 1.0 } else { 0.0 };
    features[12] = if card.colors.has_red() { 1.0 } else { 0.0 };
    features[13] = if card.colors.has_green() { 1.0 } else { 0.0 };

    features[14] = if card.tapped { 1.0 } else { 0.0 };
    features[15] = if card.sick { 1.0 } else { 0.0 };

    features
}

/// Sort by importance (creatures first, then CMC descending) and encode
/// into fixed-size slots. Extra cards are dropped; unused slots stay zero.
fn encode_zone_slots(out: &mut [f32], cards: Vec<&Card>, max_slots: usize) {
    let mut sorted = cards;
    sorted.sort_by(|a, b| {
        b.is_creature()
            .cmp(&a.is_creature())
            .then(b.cmc.cmp(&a.cmc))
    });

    for (i, card) in sorted.into_iter().take(max_slots).enumerate() {
        let features = encode_card(card);
        out[i * CARD_FEATURES..(i + 1) * CARD_FEATURES].copy_from_slice(&features);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_skirmish::{cards, SkirmishBuilder};

    #[test]
    fn test_fresh_game_layout() {
        // Player at 20 life, 7-card hand, 53-card library, no permanents,
        // turn 1, untap step.
        let p = PlayerId(0);
        let mut deck = Vec::new();
        for _ in 0..30 {
            deck.push(cards::mountain(p));
        }
        for _ in 0..30 {
            deck.push(cards::hill_giant(p));
        }
        let mut deck1 = Vec::new();
        for _ in 0..30 {
            deck1.push(cards::mountain(PlayerId(1)));
        }
        for _ in 0..30 {
            deck1.push(cards::hill_giant(PlayerId(1)));
        }
        let game = games_skirmish::SkirmishBuilder::standard_game(deck, deck1, 0);

        let state = encode_state(p, &game);
        assert_eq!(state.len(), STATE_SIZE);
        assert!((state[0] - 1.0).abs() < 1e-6); // my life 20/20
        assert!((state[1] - 1.0).abs() < 1e-6); // opp life 20/20
        assert!((state[2] - 1.0).abs() < 1e-6); // 7/7 hand
        assert!((state[8] - 0.05).abs() < 1e-6); // turn 1/20
        assert!((state[9] - 1.0).abs() < 1e-6); // my turn
        assert!((state[10] - 1.0).abs() < 1e-6); // UNTAP one-hot
        // No permanents: both battlefield blocks are all zero.
        for v in &state[MY_BATTLEFIELD_OFFSET..MY_HAND_OFFSET] {
            assert_eq!(*v, 0.0);
        }
        // The seven hand cards occupy the first seven hand slots.
        for i in 0..7 {
            assert_eq!(state[MY_HAND_OFFSET + i * CARD_FEATURES], 1.0);
        }
        assert_eq!(state[MY_HAND_OFFSET + 7 * CARD_FEATURES], 0.0);
    }

    #[test]
    fn test_hand_cards_encoded() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .hand(p, vec![cards::bear(p)])
            .build();
        let state = encode_state(p, &game);
        // First hand slot holds the bear.
        let row = &state[MY_HAND_OFFSET..MY_HAND_OFFSET + CARD_FEATURES];
        assert_eq!(row[0], 1.0);
        assert_eq!(row[4], 1.0); // creature
        assert!((row[2] - 2.0 / 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_every_element_finite() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .hand(p, vec![cards::bear(p), cards::shock(p)])
            .battlefield(p, vec![cards::mountain(p), cards::hill_giant(p)])
            .battlefield(PlayerId(1), vec![cards::wind_drake(PlayerId(1))])
            .build();
        let state = encode_state(p, &game);
        assert_eq!(state.len(), STATE_SIZE);
        assert!(state.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_card_schema() {
        let p = PlayerId(0);
        let mut bear = cards::bear(p);
        bear.tapped = true;
        bear.sick = true;
        let row = encode_card(&bear);
        assert_eq!(row[0], 1.0);
        assert!((row[1] - 0.2).abs() < 1e-6); // CMC 2/10
        assert!((row[2] - 0.1).abs() < 1e-6); // power 2/20
        assert!((row[3] - 0.1).abs() < 1e-6); // toughness 2/20
        assert_eq!(row[4], 1.0); // creature
        assert_eq!(row[13], 1.0); // green
        assert_eq!(row[14], 1.0); // tapped
        assert_eq!(row[15], 1.0); // sick

        let land = encode_card(&cards::mountain(p));
        assert_eq!(land[2], 0.0); // non-creatures have no power
        assert_eq!(land[5], 1.0);
    }

    #[test]
    fn test_creatures_sort_before_lands() {
        let p = PlayerId(0);
        let game = SkirmishBuilder::new()
            .battlefield(
                p,
                vec![cards::mountain(p), cards::bear(p), cards::hill_giant(p)],
            )
            .build();
        let state = encode_state(p, &game);
        let slot = |i: usize| {
            &state[MY_BATTLEFIELD_OFFSET + i * CARD_FEATURES
                ..MY_BATTLEFIELD_OFFSET + (i + 1) * CARD_FEATURES]
        };
        // Giant (creature, CMC 3) then bear (creature, CMC 2) then land.
        assert_eq!(slot(0)[4], 1.0);
        assert!((slot(0)[1] - 0.3).abs() < 1e-6);
        assert_eq!(slot(1)[4], 1.0);
        assert!((slot(1)[1] - 0.2).abs() < 1e-6);
        assert_eq!(slot(2)[5], 1.0);
    }

    #[test]
    fn test_battlefield_overflow_discarded() {
        let p = PlayerId(0);
        let many: Vec<_> = (0..20).map(|_| cards::bear(p)).collect();
        let game = SkirmishBuilder::new().battlefield(p, many).build();
        let state = encode_state(p, &game);
        // All 16 slots filled, nothing bleeds into the opponent block.
        for i in 0..BATTLEFIELD_SLOTS {
            assert_eq!(state[MY_BATTLEFIELD_OFFSET + i * CARD_FEATURES], 1.0);
        }
        for v in &state[OPP_BATTLEFIELD_OFFSET..MY_HAND_OFFSET] {
            assert_eq!(*v, 0.0);
        }
    }
}
