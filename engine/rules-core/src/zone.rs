//! Game zones.

/// Zones a card can occupy. Only the zones the decision core queries are
/// listed; the rules engine may track more internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Hand,
    Library,
    Battlefield,
    Graveyard,
    Stack,
    Exile,
}
