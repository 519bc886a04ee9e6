//! Feature-tensor geometry. Fixed: external policies depend on these
//! offsets bit-exactly.

/// Maximum options a policy can rank in one call.
pub const MAX_OPTIONS: usize = 64;
/// Features per card (and per option row).
pub const CARD_FEATURES: usize = 16;
/// Global features: life, hand, graveyard, library, turn, phase, mana.
pub const GLOBAL_FEATURES: usize = 24;
/// Battlefield slots encoded per player.
pub const BATTLEFIELD_SLOTS: usize = 16;
/// Hand slots encoded for the deciding player.
pub const HAND_SLOTS: usize = 8;

/// State vector width: 24 + 256 + 256 + 128 = 664.
pub const STATE_SIZE: usize =
    GLOBAL_FEATURES + BATTLEFIELD_SLOTS * CARD_FEATURES * 2 + HAND_SLOTS * CARD_FEATURES;

/// Number of decision kinds in the one-hot block.
pub const DECISION_KINDS: usize = 8;

/// Flattened model input: state + decision one-hot + options + legality
/// mask = 664 + 8 + 1024 + 64 = 1760.
pub const INPUT_SIZE: usize =
    STATE_SIZE + DECISION_KINDS + MAX_OPTIONS * CARD_FEATURES + MAX_OPTIONS;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_geometry() {
        assert_eq!(STATE_SIZE, 664);
        assert_eq!(INPUT_SIZE, 1760);
    }
}
