//! Card projection.
//!
//! A [`Card`] is the read-only view of a card the decision core works
//! with: enough to evaluate a board, hash a position and encode features,
//! nothing more. The rules engine materializes these views; the core never
//! mutates them.

use crate::color::{ColorSet, ManaColor};
use crate::ids::{CardId, PlayerId};
use crate::keyword::{Keyword, KeywordSet};

/// Type line flags. A card can carry several (artifact creature, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CardTypes {
    pub creature: bool,
    pub land: bool,
    pub instant: bool,
    pub sorcery: bool,
    pub enchantment: bool,
    pub artifact: bool,
    pub planeswalker: bool,
}

/// One mana-producing ability of a permanent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManaAbility {
    /// Colors this ability can produce.
    pub produces: Vec<ManaColor>,
    /// Whether the ability may produce mana of any color.
    pub any_color: bool,
    /// Amount of mana generated per activation.
    pub amount: u32,
    /// Generic mana spent to activate (0 for a basic land's tap ability).
    pub activation_cost: u32,
}

impl ManaAbility {
    /// Mana gained net of what activation consumes.
    pub fn net_produced(&self) -> i64 {
        self.amount as i64 - self.activation_cost as i64
    }
}

/// Cost shape of a non-mana activated ability. The evaluator only needs to
/// distinguish "no tap cost", "sacrifice" and "repeatable tap" shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivatedAbility {
    pub tap_cost: bool,
    pub sacrifice_cost: bool,
}

/// Read-only projection of a card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub controller: PlayerId,
    pub types: CardTypes,
    /// Creature subtypes (tribal signals). Empty for non-creatures.
    pub subtypes: Vec<String>,
    pub colors: ColorSet,
    pub cmc: u32,
    /// Printed power; meaningless for non-creatures.
    pub power: i32,
    /// Printed toughness; meaningless for non-creatures.
    pub toughness: i32,
    pub tapped: bool,
    /// Summoning sickness (arrived this turn, no haste).
    pub sick: bool,
    pub p1p1_counters: u32,
    pub loyalty: u32,
    pub keywords: KeywordSet,
    pub mana_abilities: Vec<ManaAbility>,
    /// Activated abilities other than mana abilities and land plays.
    pub activated_abilities: Vec<ActivatedAbility>,
    pub static_ability_count: u32,
    /// Rules text, lower-cased by the engine. Used for heuristic synergy
    /// signals only.
    pub text: String,
    /// If this is an aura, the permanent it enchants.
    pub enchanting: Option<CardId>,
}

impl Card {
    #[inline]
    pub fn is_creature(&self) -> bool {
        self.types.creature
    }

    #[inline]
    pub fn is_land(&self) -> bool {
        self.types.land
    }

    #[inline]
    pub fn is_instant_or_sorcery(&self) -> bool {
        self.types.instant || self.types.sorcery
    }

    /// Power including +1/+1 counters.
    #[inline]
    pub fn net_power(&self) -> i32 {
        self.power + self.p1p1_counters as i32
    }

    /// Toughness including +1/+1 counters.
    #[inline]
    pub fn net_toughness(&self) -> i32 {
        self.toughness + self.p1p1_counters as i32
    }

    #[inline]
    pub fn has_keyword(&self, kw: Keyword) -> bool {
        self.keywords.has(kw)
    }

    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes.iter().any(|s| s == subtype)
    }
}
