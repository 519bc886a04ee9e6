//! Rules-engine facade consumed by the AI decision core.
//!
//! The actual rules engine (card rules, priority machinery, stack
//! resolution) lives outside this workspace. The decision core only ever
//! talks to it through the traits and value types defined here:
//!
//! - [`Game`]: an opaque match state with snapshot/reverse-map semantics,
//!   zone and player queries, candidate-action enumeration and action
//!   application.
//! - [`Combat`]: the attack/block declaration surface handed to a
//!   controller during combat.
//! - [`Card`]: the projection of a permanent or hand card that the
//!   evaluator and feature encoders read. It is a plain value, cheap to
//!   inspect and stable across game snapshots via [`CardId`].
//!
//! Entity identity across snapshots uses stable integer ids stamped at
//! creation and preserved by `Game::snapshot`. `Game::reverse_map` answers
//! whether a handle in a copy has an antecedent in the original game.

pub mod action;
pub mod card;
pub mod color;
pub mod game;
pub mod ids;
pub mod keyword;
pub mod phase;
pub mod zone;

pub use action::{Action, ApiKind};
pub use card::{ActivatedAbility, Card, CardTypes, ManaAbility};
pub use color::{ColorSet, ManaColor};
pub use game::{Combat, DeckStatistics, Game, Outcome};
pub use ids::{CardId, PlayerId};
pub use keyword::{Keyword, KeywordSet};
pub use phase::Phase;
pub use zone::Zone;
