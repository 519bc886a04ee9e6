//! Turn phases.

/// The thirteen phases of a turn, in turn order. Ordinals are part of the
/// state-hash and feature-tensor contracts, so the order here is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Untap,
    Upkeep,
    Draw,
    Main1,
    CombatBegin,
    CombatDeclareAttackers,
    CombatDeclareBlockers,
    CombatFirstStrikeDamage,
    CombatDamage,
    CombatEnd,
    Main2,
    EndOfTurn,
    Cleanup,
}

impl Phase {
    pub const COUNT: usize = 13;

    pub const ALL: [Phase; Phase::COUNT] = [
        Phase::Untap,
        Phase::Upkeep,
        Phase::Draw,
        Phase::Main1,
        Phase::CombatBegin,
        Phase::CombatDeclareAttackers,
        Phase::CombatDeclareBlockers,
        Phase::CombatFirstStrikeDamage,
        Phase::CombatDamage,
        Phase::CombatEnd,
        Phase::Main2,
        Phase::EndOfTurn,
        Phase::Cleanup,
    ];

    #[inline]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_before(self, other: Phase) -> bool {
        self.ordinal() < other.ordinal()
    }

    #[inline]
    pub fn is_after(self, other: Phase) -> bool {
        self.ordinal() > other.ordinal()
    }

    /// Name used in training records and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Phase::Untap => "UNTAP",
            Phase::Upkeep => "UPKEEP",
            Phase::Draw => "DRAW",
            Phase::Main1 => "MAIN1",
            Phase::CombatBegin => "COMBAT_BEGIN",
            Phase::CombatDeclareAttackers => "COMBAT_DECLARE_ATTACKERS",
            Phase::CombatDeclareBlockers => "COMBAT_DECLARE_BLOCKERS",
            Phase::CombatFirstStrikeDamage => "COMBAT_FIRST_STRIKE_DAMAGE",
            Phase::CombatDamage => "COMBAT_DAMAGE",
            Phase::CombatEnd => "COMBAT_END",
            Phase::Main2 => "MAIN2",
            Phase::EndOfTurn => "END_OF_TURN",
            Phase::Cleanup => "CLEANUP",
        }
    }
}
