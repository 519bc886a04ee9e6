//! Heuristic synergy detection for the evaluator's combo-state bonus.
//!
//! The signal lists are card-name (and rules-text) substring tables. They
//! are plain data: the algorithm is "for each present card, bump the
//! matching signal counter; counters determine which fractions of the
//! configured bonus apply". All matching is done on lower-cased strings.

use rules_core::{Card, Game, Keyword, PlayerId, Zone};

/// Mana doublers and virtual doublers (untap effects).
const MANA_DOUBLERS: &[&str] = &[
    "mana reflection",
    "vorinclex",
    "nyxbloom",
    "mirari's wake",
    "zendikar resurgent",
    "caged sun",
    "gauntlet of power",
    "mana flare",
    "dictate of karametra",
    "heartbeat of spring",
    "regal behemoth",
    "sasaya",
    "wilderness reclamation",
    "seedborn muse",
    "prophet of kruphix",
    "sword of feast and famine",
    "bear umbra",
    "nature's will",
    "patron of the orochi",
];

/// Named free-ish sacrifice outlets.
const SAC_OUTLETS: &[&str] = &[
    "viscera seer",
    "carrion feeder",
    "yahenni",
    "woe strider",
    "phyrexian altar",
    "ashnod's altar",
    "goblin bombardment",
    "altar of dementia",
    "blasting station",
];

/// Death-trigger payoffs.
const DEATH_TRIGGERS: &[&str] = &[
    "blood artist",
    "zulaport cutthroat",
    "cruel celebrant",
    "bastion of remembrance",
    "judith",
    "mayhem devil",
    "vindictive vampire",
    "falkenrath noble",
    "syr konrad",
];

/// +1/+1 counter doublers and payoffs.
const COUNTER_SYNERGY: &[&str] = &[
    "hardened scales",
    "winding constrictor",
    "branching evolution",
    "doubling season",
    "corpsejack menace",
    "vorinclex, monstrous",
    "cathars' crusade",
    "ozolith",
    "conclave mentor",
    "rishkar",
];

/// Tribes worth concentrating on.
const TRIBES: &[&str] = &[
    "Elf", "Goblin", "Zombie", "Vampire", "Merfolk", "Soldier", "Wizard", "Dragon", "Human",
    "Cleric", "Knight", "Elemental", "Spirit", "Angel", "Demon",
];

fn name_matches(card: &Card, table: &[&str]) -> bool {
    let name = card.name.to_lowercase();
    table.iter().any(|entry| name.contains(entry))
}

/// Evaluates the game state for potential combo conditions. Returns a
/// bonus score when the AI is in a favorable combo position; 0 when the
/// bonus is disabled.
pub(crate) fn evaluate_combo_state<G: Game>(game: &G, ai_player: PlayerId, bonus: i32) -> i32 {
    if bonus == 0 {
        return 0;
    }

    let mut total = 0;

    // Low opponent life (potential lethal).
    for opponent in game.opponents(ai_player) {
        if game.life(opponent) <= 5 {
            total += bonus / 2;
        }
        if game.life(opponent) <= 3 {
            total += bonus;
        }
    }

    // High mana availability.
    if count_untapped_mana_producers(game, ai_player) >= 7 {
        total += bonus / 4;
    }

    // Large hand (combo pieces).
    if game.zone_size(ai_player, Zone::Hand) >= 7 {
        total += bonus / 4;
    }

    // Creatures with key combo keywords.
    for c in game.cards_in(ai_player, Zone::Battlefield) {
        if c.is_creature() {
            if c.has_keyword(Keyword::Vigilance) && c.net_power() >= 3 {
                total += bonus / 8;
            }
            if c.has_keyword(Keyword::Haste) && c.has_keyword(Keyword::Lifelink) {
                total += bonus / 8;
            }
        }
    }

    // Potential infinite mana.
    if count_mana_doublers(game, ai_player) >= 2 {
        total += bonus;
    }

    total += graveyard_synergy(game, ai_player, bonus);
    total += sacrifice_synergy(game, ai_player, bonus);
    total += counter_synergy(game, ai_player, bonus);
    total += tribal_synergy(game, ai_player, bonus);

    total
}

fn count_untapped_mana_producers<G: Game>(game: &G, player: PlayerId) -> usize {
    game.cards_in(player, Zone::Battlefield)
        .iter()
        .filter(|c| !c.tapped && !c.mana_abilities.is_empty())
        .count()
}

fn count_mana_doublers<G: Game>(game: &G, player: PlayerId) -> usize {
    game.cards_in(player, Zone::Battlefield)
        .iter()
        .filter(|c| name_matches(c, MANA_DOUBLERS))
        .count()
}

/// Reanimator/dredge signals: fat creatures and raw card count in the bin.
fn graveyard_synergy<G: Game>(game: &G, player: PlayerId, bonus: i32) -> i32 {
    let mut total = 0;
    let mut creature_count = 0;
    let mut total_cmc = 0;

    for c in game.cards_in(player, Zone::Graveyard) {
        if c.is_creature() {
            creature_count += 1;
            total_cmc += c.cmc;
        }
    }
    if creature_count >= 2 && total_cmc >= 10 {
        total += bonus / 4;
    }

    let graveyard_size = game.zone_size(player, Zone::Graveyard);
    if graveyard_size >= 10 {
        total += bonus / 8;
    }
    if graveyard_size >= 15 {
        total += bonus / 8;
    }

    total
}

/// Aristocrats signals: outlets plus payoffs.
fn sacrifice_synergy<G: Game>(game: &G, player: PlayerId, bonus: i32) -> i32 {
    let mut outlets = 0;
    let mut payoffs = 0;

    for c in game.cards_in(player, Zone::Battlefield) {
        if name_matches(c, SAC_OUTLETS) {
            outlets += 1;
        } else if c.text.contains("sacrifice a creature") || c.text.contains("sacrifice another") {
            outlets += 1;
        }

        if name_matches(c, DEATH_TRIGGERS) {
            payoffs += 2; // worth extra
        } else if c.text.contains("when")
            && (c.text.contains("dies")
                || c.text.contains("put into a graveyard from the battlefield"))
            && (c.is_creature() || c.types.enchantment)
        {
            payoffs += 1;
        }
    }

    let mut total = 0;
    if outlets >= 1 && payoffs >= 1 {
        total += bonus / 4;
    }
    if outlets >= 2 && payoffs >= 2 {
        total += bonus / 2;
    }
    total
}

fn counter_synergy<G: Game>(game: &G, player: PlayerId, bonus: i32) -> i32 {
    let mut with_counters = 0;
    let mut synergy_cards = 0;

    for c in game.cards_in(player, Zone::Battlefield) {
        if c.is_creature() && c.p1p1_counters > 0 {
            with_counters += 1;
        }
        if name_matches(c, COUNTER_SYNERGY)
            || c.has_keyword(Keyword::Modular)
            || c.has_keyword(Keyword::Evolve)
        {
            synergy_cards += 1;
        }
    }

    let mut total = 0;
    if with_counters >= 3 && synergy_cards >= 1 {
        total += bonus / 4;
    }
    if with_counters >= 5 && synergy_cards >= 2 {
        total += bonus / 4;
    }
    total
}

fn tribal_synergy<G: Game>(game: &G, player: PlayerId, bonus: i32) -> i32 {
    let mut total = 0;
    for tribe in TRIBES {
        let count = game
            .cards_in(player, Zone::Battlefield)
            .iter()
            .filter(|c| c.is_creature() && c.has_subtype(tribe))
            .count();
        if count >= 4 {
            total += bonus / 8;
        }
        if count >= 6 {
            total += bonus / 4;
        }
    }
    total
}
