//! Card constructors for the skirmish pool.
//!
//! The pool is intentionally tiny: basic lands, vanilla creatures and a
//! handful of sorceries, enough surface for the search, evaluator and
//! bridge crates to exercise their contracts against a real `Game`.

use rules_core::{
    ActivatedAbility, Card, CardId, CardTypes, ColorSet, Keyword, KeywordSet, ManaAbility,
    ManaColor, PlayerId,
};

fn blank(name: &str, controller: PlayerId) -> Card {
    Card {
        id: CardId(0), // stamped by the game when the card enters
        name: name.into(),
        controller,
        types: CardTypes::default(),
        subtypes: vec![],
        colors: ColorSet::COLORLESS,
        cmc: 0,
        power: 0,
        toughness: 0,
        tapped: false,
        sick: false,
        p1p1_counters: 0,
        loyalty: 0,
        keywords: KeywordSet::EMPTY,
        mana_abilities: vec![],
        activated_abilities: vec![],
        static_ability_count: 0,
        text: String::new(),
        enchanting: None,
    }
}

fn basic_land(name: &str, color: ManaColor, controller: PlayerId) -> Card {
    let mut c = blank(name, controller);
    c.types.land = true;
    c.mana_abilities = vec![ManaAbility {
        produces: vec![color],
        any_color: false,
        amount: 1,
        activation_cost: 0,
    }];
    c
}

pub fn plains(controller: PlayerId) -> Card {
    basic_land("Plains", ManaColor::White, controller)
}

pub fn island(controller: PlayerId) -> Card {
    basic_land("Island", ManaColor::Blue, controller)
}

pub fn swamp(controller: PlayerId) -> Card {
    basic_land("Swamp", ManaColor::Black, controller)
}

pub fn mountain(controller: PlayerId) -> Card {
    basic_land("Mountain", ManaColor::Red, controller)
}

pub fn forest(controller: PlayerId) -> Card {
    basic_land("Forest", ManaColor::Green, controller)
}

/// Utility land with a repeatable tap ability and a static ability.
pub fn watchtower(controller: PlayerId) -> Card {
    let mut c = basic_land("Watchtower", ManaColor::Colorless, controller);
    c.name = "Watchtower".into();
    c.activated_abilities = vec![ActivatedAbility {
        tap_cost: true,
        sacrifice_cost: false,
    }];
    c.static_ability_count = 1;
    c
}

pub fn creature(
    name: &str,
    color: ManaColor,
    cmc: u32,
    power: i32,
    toughness: i32,
    keywords: KeywordSet,
    controller: PlayerId,
) -> Card {
    let mut c = blank(name, controller);
    c.types.creature = true;
    c.colors = ColorSet::mono(color);
    c.cmc = cmc;
    c.power = power;
    c.toughness = toughness;
    c.keywords = keywords;
    c
}

/// 2/2 vanilla for 2.
pub fn bear(controller: PlayerId) -> Card {
    let mut c = creature(
        "Grizzly Bears",
        ManaColor::Green,
        2,
        2,
        2,
        KeywordSet::EMPTY,
        controller,
    );
    c.subtypes = vec!["Bear".into()];
    c
}

/// 3/3 vanilla for 3.
pub fn hill_giant(controller: PlayerId) -> Card {
    let mut c = creature(
        "Hill Giant",
        ManaColor::Red,
        3,
        3,
        3,
        KeywordSet::EMPTY,
        controller,
    );
    c.subtypes = vec!["Giant".into()];
    c
}

/// 2/2 flyer for 3.
pub fn wind_drake(controller: PlayerId) -> Card {
    let mut c = creature(
        "Wind Drake",
        ManaColor::Blue,
        3,
        2,
        2,
        KeywordSet::EMPTY.with(Keyword::Flying),
        controller,
    );
    c.subtypes = vec!["Drake".into()];
    c
}

/// Sorcery: 2 damage to a target creature.
pub fn shock(controller: PlayerId) -> Card {
    let mut c = blank("Singe", controller);
    c.types.sorcery = true;
    c.colors = ColorSet::mono(ManaColor::Red);
    c.cmc = 1;
    c.text = "singe deals 2 damage to target creature.".into();
    c
}

/// Sorcery: 3 damage to the opponent.
pub fn lava_spike(controller: PlayerId) -> Card {
    let mut c = blank("Ember Lance", controller);
    c.types.sorcery = true;
    c.colors = ColorSet::mono(ManaColor::Red);
    c.cmc = 1;
    c.text = "ember lance deals 3 damage to the opposing player.".into();
    c
}

/// Sorcery: X damage to the opponent.
pub fn blaze(controller: PlayerId) -> Card {
    let mut c = blank("Wildfire Surge", controller);
    c.types.sorcery = true;
    c.colors = ColorSet::mono(ManaColor::Red);
    c.cmc = 1; // plus X on announcement
    c.text = "wildfire surge deals x damage to the opposing player.".into();
    c
}

/// Sorcery: draw two cards.
pub fn divination(controller: PlayerId) -> Card {
    let mut c = blank("Foresee", controller);
    c.types.sorcery = true;
    c.colors = ColorSet::mono(ManaColor::Blue);
    c.cmc = 3;
    c.text = "draw two cards.".into();
    c
}
