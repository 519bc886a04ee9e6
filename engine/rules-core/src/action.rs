//! Candidate actions.
//!
//! An [`Action`] is a legal move the rules engine offers in the current
//! priority window. The core treats it as opaque apart from the fields
//! below; in particular the `description` string is the stable identifier
//! used to re-find "the same" action in the candidate list of a game copy.

use crate::ids::CardId;

/// Coarse classification of what an action does, used for static move
/// ordering. Mirrors the rules engine's effect API taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiKind {
    Destroy,
    DestroyAll,
    Sacrifice,
    SacrificeAll,
    DealDamage,
    DamageAll,
    LoseLife,
    Counter,
    Draw,
    Mill,
    Discard,
    Pump,
    PumpAll,
    Token,
    CopyPermanent,
    PermanentCreature,
    PermanentNoncreature,
    Mana,
    ManaReflected,
    ChangeZone,
    Attach,
    Animate,
    Regenerate,
    GainLife,
    Other,
}

impl ApiKind {
    /// Stable name used in killer/history keys. Object identity does not
    /// survive game copies, so keys are built from strings.
    pub fn as_str(self) -> &'static str {
        match self {
            ApiKind::Destroy => "Destroy",
            ApiKind::DestroyAll => "DestroyAll",
            ApiKind::Sacrifice => "Sacrifice",
            ApiKind::SacrificeAll => "SacrificeAll",
            ApiKind::DealDamage => "DealDamage",
            ApiKind::DamageAll => "DamageAll",
            ApiKind::LoseLife => "LoseLife",
            ApiKind::Counter => "Counter",
            ApiKind::Draw => "Draw",
            ApiKind::Mill => "Mill",
            ApiKind::Discard => "Discard",
            ApiKind::Pump => "Pump",
            ApiKind::PumpAll => "PumpAll",
            ApiKind::Token => "Token",
            ApiKind::CopyPermanent => "CopyPermanent",
            ApiKind::PermanentCreature => "PermanentCreature",
            ApiKind::PermanentNoncreature => "PermanentNoncreature",
            ApiKind::Mana => "Mana",
            ApiKind::ManaReflected => "ManaReflected",
            ApiKind::ChangeZone => "ChangeZone",
            ApiKind::Attach => "Attach",
            ApiKind::Animate => "Animate",
            ApiKind::Regenerate => "Regenerate",
            ApiKind::GainLife => "GainLife",
            ApiKind::Other => "Other",
        }
    }
}

/// A legal move in the current priority window.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Textual identifier, stable within one `Game` and reproduced by the
    /// engine for the corresponding action in a snapshot.
    pub description: String,
    /// Host card, if the action originates from one.
    pub host: Option<CardId>,
    pub api: ApiKind,
    pub is_land_play: bool,
    /// Whether the engine requires a target to be supplied to `play_action`.
    pub requires_target: bool,
    /// Announceable X range, if the action has an X in its cost.
    pub x_range: Option<(u32, u32)>,
    /// Chosen mode mask and its textual form, for modal actions. The engine
    /// enumerates modal actions one candidate per mode combination.
    pub mode_mask: Option<(u32, String)>,
}

impl Action {
    /// Convenience constructor for the common fully-determined action.
    pub fn simple(description: impl Into<String>, host: Option<CardId>, api: ApiKind) -> Self {
        Action {
            description: description.into(),
            host,
            api,
            is_land_play: false,
            requires_target: false,
            x_range: None,
            mode_mask: None,
        }
    }
}
