//! Position scores.

use std::fmt;

/// Evaluation of a position from one player's perspective.
///
/// The second component tracks the same evaluation while treating the
/// player's summoning-sick creatures as worth zero; before the second main
/// phase it lets the search hold creatures back when playing them buys
/// nothing else this turn.
///
/// `i32::MAX`/`i32::MIN` are reserved terminal sentinels (game won / game
/// lost); no non-terminal evaluation produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub value: i32,
    pub summon_sick_value: i32,
}

impl Score {
    pub const WIN: Score = Score {
        value: i32::MAX,
        summon_sick_value: i32::MAX,
    };

    pub const LOSS: Score = Score {
        value: i32::MIN,
        summon_sick_value: i32::MIN,
    };

    /// A score whose summoning-sick variant equals the plain value.
    pub fn uniform(value: i32) -> Self {
        Score {
            value,
            summon_sick_value: value,
        }
    }

    pub fn new(value: i32, summon_sick_value: i32) -> Self {
        Score {
            value,
            summon_sick_value,
        }
    }

    #[inline]
    pub fn is_win(self) -> bool {
        self.value == i32::MAX
    }

    #[inline]
    pub fn is_loss(self) -> bool {
        self.value == i32::MIN
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self.is_win() || self.is_loss()
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.summon_sick_value != self.value {
            write!(f, "{} (ss {})", self.value, self.summon_sick_value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_sentinels() {
        assert!(Score::WIN.is_win());
        assert!(Score::LOSS.is_loss());
        assert!(!Score::uniform(1_000_000).is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(Score::uniform(42).to_string(), "42");
        assert_eq!(Score::new(42, 10).to_string(), "42 (ss 10)");
    }
}
