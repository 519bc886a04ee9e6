//! Creature scoring.
//!
//! Base value is printed stats plus keyword modifiers; the board-context
//! adjustments (blocker availability under evasion, board density, threat
//! sizing) are applied on top by `evaluate`. The reference point for the
//! weights: a vanilla 5/5 lands around 225, comfortably above a generic
//! five-drop permanent's 200.

use rules_core::{Card, Game, Keyword};

pub(crate) fn evaluate<G: Game>(game: &G, c: &Card) -> i32 {
    let mut value = base_value(c);

    let opponents: Vec<&Card> = game
        .opponents(c.controller)
        .into_iter()
        .flat_map(|p| game.creatures_in_play(p))
        .collect();

    let power = c.net_power().max(0);

    // Blocker availability: creatures the defending side could legally put
    // in front of this one, accounting for evasion keywords.
    let blockers = opponents
        .iter()
        .filter(|b| can_block(c, b))
        .count();
    if blockers == 0 {
        value += 10 + 10 * power;
    } else if blockers <= 2 {
        value += 5 + 3 * power;
    }

    // Sparse boards make every body count more.
    let total_creatures = game
        .battlefield()
        .iter()
        .filter(|x| x.is_creature())
        .count();
    if total_creatures <= 2 {
        value += 15;
    }

    // Threat sizing: outclassing the whole opposing board is worth extra.
    if !opponents.is_empty()
        && opponents
            .iter()
            .all(|o| power >= o.net_toughness() && c.net_toughness() > o.net_power())
    {
        value += 20;
    }
    if c.has_keyword(Keyword::Deathtouch) && opponents.iter().any(|o| o.net_toughness() >= 4) {
        value += 10;
    }

    value
}

pub(crate) fn base_value(c: &Card) -> i32 {
    let power = c.net_power().max(0);
    let toughness = c.net_toughness().max(0);
    let mut value = 80 + 15 * power + 10 * toughness;

    if c.has_keyword(Keyword::Flying) {
        value += 15 + 5 * power;
    }
    if c.has_keyword(Keyword::Horsemanship) {
        value += 15 + 5 * power;
    }
    if c.has_keyword(Keyword::Shadow) {
        value += 15 + 5 * power;
    }
    if c.has_keyword(Keyword::Fear) {
        value += 10 + 3 * power;
    }
    if c.has_keyword(Keyword::Intimidate) {
        value += 10 + 3 * power;
    }
    if c.has_keyword(Keyword::Menace) {
        value += 10 + 3 * power;
    }
    if c.has_keyword(Keyword::FirstStrike) {
        value += 10;
    }
    if c.has_keyword(Keyword::DoubleStrike) {
        value += 15 + 10 * power;
    }
    if c.has_keyword(Keyword::Deathtouch) {
        value += 25;
    }
    if c.has_keyword(Keyword::Trample) {
        value += 3 * power;
    }
    if c.has_keyword(Keyword::Lifelink) {
        value += 5 * power;
    }
    if c.has_keyword(Keyword::Vigilance) {
        value += 5;
    }
    if c.has_keyword(Keyword::Haste) {
        value += 8;
    }
    if c.has_keyword(Keyword::Reach) {
        value += 5;
    }
    if c.has_keyword(Keyword::Indestructible) {
        value += 30;
    }
    if c.has_keyword(Keyword::Hexproof) {
        value += 20;
    }
    if c.has_keyword(Keyword::Defender) {
        value -= 20;
    }

    value
}

/// Whether `blocker` could legally be assigned in front of `attacker`,
/// considering evasion keywords only.
pub(crate) fn can_block(attacker: &Card, blocker: &Card) -> bool {
    if attacker.has_keyword(Keyword::Flying)
        && !(blocker.has_keyword(Keyword::Flying) || blocker.has_keyword(Keyword::Reach))
    {
        return false;
    }
    if attacker.has_keyword(Keyword::Horsemanship) && !blocker.has_keyword(Keyword::Horsemanship) {
        return false;
    }
    if attacker.has_keyword(Keyword::Shadow) != blocker.has_keyword(Keyword::Shadow) {
        return false;
    }
    if attacker.has_keyword(Keyword::Fear)
        && !(blocker.types.artifact || blocker.colors.has_black())
    {
        return false;
    }
    if attacker.has_keyword(Keyword::Intimidate)
        && !(blocker.types.artifact || shares_color(attacker, blocker))
    {
        return false;
    }
    true
}

fn shares_color(a: &Card, b: &Card) -> bool {
    (a.colors.has_white() && b.colors.has_white())
        || (a.colors.has_blue() && b.colors.has_blue())
        || (a.colors.has_black() && b.colors.has_black())
        || (a.colors.has_red() && b.colors.has_red())
        || (a.colors.has_green() && b.colors.has_green())
}
