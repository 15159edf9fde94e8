//! Running counters for one game.

use std::fmt;

/// Points awarded for a drop, indexed by the number of rows it cleared.
pub const LINES_SCORE: [i64; 6] = [10, 60, 160, 310, 510, 760];

/// Pieces that may be discarded in one game.
pub const MAX_DISCARDS: usize = 5;

/// Bonus for every discard left unused at the end of the game.
pub const DISCARD_BONUS: i64 = 400;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Position in the piece sequence; number of pieces dropped or discarded.
    pub pos: usize,
    pub instructions: usize,
    pub discarded: usize,
    pub dropped: usize,
    /// Drops by number of rows cleared.
    pub cleared: [usize; 6],
    /// Accumulated drop score, without the discard bonus.
    pub score: i64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts a successful drop that cleared `lines` rows.
    pub fn record_drop(&mut self, lines: usize) {
        self.score += LINES_SCORE[lines];
        self.dropped += 1;
        self.cleared[lines] += 1;
        self.pos += 1;
    }

    pub fn record_discard(&mut self) {
        self.discarded += 1;
        self.pos += 1;
    }

    #[inline]
    pub fn can_discard(&self) -> bool {
        self.discarded < MAX_DISCARDS
    }

    /// Score including the bonus for unused discards.
    pub fn final_score(&self) -> i64 {
        let unused = MAX_DISCARDS.saturating_sub(self.discarded) as i64;
        self.score + DISCARD_BONUS * unused
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pieces processed:          {:8}", self.pos)?;
        writeln!(f, "Instructions processed:    {:8}", self.instructions)?;
        writeln!(f, "Pieces discarded:          {:8}", self.discarded)?;
        writeln!(f, "Pieces dropped:            {:8}", self.dropped)?;
        writeln!(f, "   No lines cleared:       {:8}", self.cleared[0])?;
        for (lines, count) in self.cleared.iter().enumerate().skip(1) {
            writeln!(f, "   Cleared {lines} line(s):      {count:8}")?;
        }
        writeln!(f, "Score:                     {:8}", self.final_score())
    }
}
