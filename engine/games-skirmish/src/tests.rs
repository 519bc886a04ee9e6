//! Tests for the skirmish game.

use super::*;
use crate::cards;

fn deck60(p: PlayerId) -> Vec<Card> {
    let mut deck = Vec::new();
    for _ in 0..24 {
        deck.push(cards::mountain(p));
    }
    for _ in 0..20 {
        deck.push(cards::hill_giant(p));
    }
    for _ in 0..16 {
        deck.push(cards::lava_spike(p));
    }
    deck
}

#[test]
fn test_standard_game_setup() {
    let game = SkirmishBuilder::standard_game(deck60(PlayerId(0)), deck60(PlayerId(1)), 42);

    for p in [PlayerId(0), PlayerId(1)] {
        assert_eq!(game.life(p), 20);
        assert_eq!(game.zone_size(p, Zone::Hand), 7);
        assert_eq!(game.zone_size(p, Zone::Library), 53);
        assert_eq!(game.zone_size(p, Zone::Battlefield), 0);
    }
    assert_eq!(game.turn(), 1);
    assert_eq!(game.phase(), Phase::Untap);
    assert!(game.is_player_turn(PlayerId(0)));
    assert!(!game.is_over());
}

#[test]
fn test_land_play_and_cast() {
    let p = PlayerId(0);
    let mut game = SkirmishBuilder::new()
        .hand(p, vec![cards::mountain(p), cards::bear(p)])
        .battlefield(p, vec![cards::mountain(p), cards::mountain(p)])
        .phase(Phase::Main1)
        .build();

    let actions = game.candidate_actions(p);
    // Land play plus the affordable bear.
    assert_eq!(actions.len(), 2);
    let land = actions.iter().find(|a| a.is_land_play).unwrap();
    let bear = actions.iter().find(|a| !a.is_land_play).unwrap();

    assert!(game.play_action(p, &land.clone(), &[], None));
    assert_eq!(game.zone_size(p, Zone::Battlefield), 3);
    // Second land play the same turn is refused.
    assert!(!game.play_action(p, &land.clone(), &[], None));

    assert!(game.play_action(p, &bear.clone(), &[], None));
    let bf = game.creatures_in_play(p);
    assert_eq!(bf.len(), 1);
    assert!(bf[0].sick);
}

#[test]
fn test_snapshot_is_independent() {
    let p = PlayerId(0);
    let game = SkirmishBuilder::new()
        .hand(p, vec![cards::lava_spike(p)])
        .battlefield(p, vec![cards::mountain(p)])
        .phase(Phase::Main1)
        .build();

    let mut copy = game.snapshot();
    let action = copy.candidate_actions(p).pop().unwrap();
    assert!(copy.play_action(p, &action, &[], None));

    assert_eq!(copy.life(PlayerId(1)), 17);
    assert_eq!(game.life(PlayerId(1)), 20);
    assert_eq!(game.zone_size(p, Zone::Hand), 1);
}

#[test]
fn test_candidate_descriptions_stable_across_snapshot() {
    let p = PlayerId(0);
    let game = SkirmishBuilder::new()
        .hand(p, vec![cards::bear(p), cards::mountain(p)])
        .battlefield(p, vec![cards::forest(p), cards::forest(p)])
        .phase(Phase::Main1)
        .build();
    let copy = game.snapshot();

    let a: Vec<String> = game
        .candidate_actions(p)
        .into_iter()
        .map(|a| a.description)
        .collect();
    let b: Vec<String> = copy
        .candidate_actions(p)
        .into_iter()
        .map(|a| a.description)
        .collect();
    assert_eq!(a, b);
}

#[test]
fn test_reverse_map() {
    let p = PlayerId(0);
    let game = SkirmishBuilder::new()
        .battlefield(p, vec![cards::bear(p)])
        .build();
    let copy = game.snapshot();

    let id = game.creatures_in_play(p)[0].id;
    assert_eq!(copy.reverse_map(id, &game), Some(id));
    assert_eq!(copy.reverse_map(CardId(999), &game), None);
}

#[test]
fn test_auto_combat_on_advance() {
    let p = PlayerId(0);
    let mut game = SkirmishBuilder::new()
        .battlefield(p, vec![cards::hill_giant(p), cards::bear(p)])
        .phase(Phase::Main1)
        .build();

    game.advance_to_phase(Phase::CombatDamage);
    // 3 + 2 unblocked damage.
    assert_eq!(game.life(PlayerId(1)), 15);
    // Attackers tapped out.
    assert!(game.creatures_in_play(p).iter().all(|c| c.tapped));
}

#[test]
fn test_lethal_spell_ends_game() {
    let p = PlayerId(0);
    let mut game = SkirmishBuilder::new()
        .life(PlayerId(1), 3)
        .hand(p, vec![cards::lava_spike(p)])
        .battlefield(p, vec![cards::mountain(p)])
        .phase(Phase::Main1)
        .build();

    let action = game.candidate_actions(p).pop().unwrap();
    assert!(game.play_action(p, &action, &[], None));
    assert!(game.is_over());
    let outcome = game.outcome().unwrap();
    assert!(!outcome.is_draw);
    assert_eq!(outcome.winning_player, Some(p));
    assert_eq!(outcome.win_condition, "Life");
}

#[test]
fn test_mill_loss() {
    let p = PlayerId(0);
    let mut game = SkirmishBuilder::new().build();
    // Library is empty; the forced draw on turn change loses for player 1.
    game.next_turn();
    assert!(game.is_over());
    assert_eq!(game.outcome().unwrap().winning_player, Some(p));
    assert_eq!(game.outcome().unwrap().win_condition, "Milled");
}

#[test]
fn test_targeted_removal() {
    let p = PlayerId(0);
    let opp = PlayerId(1);
    let mut game = SkirmishBuilder::new()
        .hand(p, vec![cards::shock(p)])
        .battlefield(p, vec![cards::mountain(p)])
        .battlefield(opp, vec![cards::bear(opp), cards::hill_giant(opp)])
        .phase(Phase::Main1)
        .build();

    let action = game.candidate_actions(p).pop().unwrap();
    assert!(action.requires_target);
    let targets = game.legal_targets(p, &action);
    assert_eq!(targets.len(), 2);

    let bear_id = game
        .creatures_in_play(opp)
        .iter()
        .find(|c| c.name == "Grizzly Bears")
        .unwrap()
        .id;
    assert!(game.play_action(p, &action, &[bear_id], None));
    // The 2/2 dies, the 3/3 shrugs it off.
    assert_eq!(game.creatures_in_play(opp).len(), 1);
    assert_eq!(game.zone_size(opp, Zone::Graveyard), 1);
}

#[test]
fn test_x_spell() {
    let p = PlayerId(0);
    let mut game = SkirmishBuilder::new()
        .hand(p, vec![cards::blaze(p)])
        .battlefield(
            p,
            vec![
                cards::mountain(p),
                cards::mountain(p),
                cards::mountain(p),
                cards::mountain(p),
            ],
        )
        .phase(Phase::Main1)
        .build();

    let action = game.candidate_actions(p).pop().unwrap();
    assert_eq!(action.x_range, Some((0, 3)));
    assert!(game.play_action(p, &action, &[], Some(3)));
    assert_eq!(game.life(PlayerId(1)), 17);
    // All four lands tapped: one for the spell, three for X.
    assert_eq!(game.cards_in(p, Zone::Battlefield).len(), 4);
    assert!(game
        .cards_in(p, Zone::Battlefield)
        .iter()
        .all(|c| c.tapped));
}

#[test]
fn test_combat_declarations() {
    use rules_core::Combat as _;

    let p = PlayerId(0);
    let opp = PlayerId(1);
    let game = SkirmishBuilder::new()
        .battlefield(p, vec![cards::wind_drake(p), cards::bear(p)])
        .battlefield(opp, vec![cards::hill_giant(opp)])
        .build();

    let drake = game.creatures_in_play(p)[0].id;
    let bear = game.creatures_in_play(p)[1].id;
    let giant = game.creatures_in_play(opp)[0].id;

    let mut combat = game.new_combat(p);
    assert!(combat.can_attack(drake, opp));
    combat.add_attacker(drake, opp);
    combat.add_attacker(bear, opp);
    assert!(combat.validate_attackers());

    // A ground creature cannot block the flyer.
    assert!(!combat.can_block_attacker(drake, giant));
    assert!(combat.can_block_attacker(bear, giant));
    combat.add_blocker(bear, giant);
    assert_eq!(combat.blocks().len(), 1);

    combat.clear_attackers();
    assert!(combat.attackers().is_empty());
}
