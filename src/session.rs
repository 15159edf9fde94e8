//! Field and stats bound to a position in a game's piece sequence.
//!
//! Both the instruction interpreter and the autoplayer apply their decisions
//! through a [`Session`], so a drop or a discard is accounted the same way no
//! matter where it came from.

use std::io::Write;

use crate::codec::{write_move, Move};
use crate::error::{PlacementError, RunError};
use crate::field::Field;
use crate::game::Game;
use crate::piece::{Form, Piece};
use crate::stats::Stats;

#[derive(Debug, Clone)]
pub struct Session<'g> {
    game: &'g Game,
    field: Field,
    stats: Stats,
}

impl<'g> Session<'g> {
    /// Starts a run on an empty field.
    pub fn new(game: &'g Game) -> Self {
        Self {
            game,
            field: Field::new(),
            stats: Stats::new(),
        }
    }

    /// Starts a run on a prepared field.
    pub fn with_field(game: &'g Game, field: Field) -> Self {
        Self {
            game,
            field,
            stats: Stats::new(),
        }
    }

    #[inline]
    pub fn game(&self) -> &'g Game {
        self.game
    }

    #[inline]
    pub fn field(&self) -> &Field {
        &self.field
    }

    #[inline]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Counts one processed instruction.
    #[inline]
    pub fn count_instruction(&mut self) {
        self.stats.instructions += 1;
    }

    /// The piece waiting to be played, or `None` once the sequence is used up.
    #[inline]
    pub fn current_piece(&self) -> Option<&'g Piece> {
        self.game.piece_at(self.stats.pos)
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.stats.pos >= self.game.len()
    }

    /// Drops `form` at column `xpos` and advances to the next piece.
    ///
    /// A rejected drop changes neither field nor stats.
    pub fn drop_form(&mut self, form: &Form, xpos: i32) -> Result<usize, PlacementError> {
        let lines = self.field.place(form, xpos)?;
        self.stats.record_drop(lines);
        log::debug!(
            "piece {} (id {}, rotation {}) dropped at column {xpos}, {lines} line(s) cleared",
            self.stats.pos - 1,
            form.id(),
            form.rotation()
        );
        Ok(lines)
    }

    /// Skips the current piece. Returns `false` when no discard is left.
    pub fn discard(&mut self) -> bool {
        if !self.stats.can_discard() {
            return false;
        }
        self.stats.record_discard();
        log::debug!(
            "piece {} discarded ({} discard(s) used)",
            self.stats.pos - 1,
            self.stats.discarded
        );
        true
    }

    /// Applies a structured move to the current piece.
    ///
    /// Returns the number of cleared rows for a placement and `None` for a
    /// discard. Instructions are not counted here; see
    /// [`codec::write_move`](crate::codec::write_move).
    pub fn apply(&mut self, mv: Move) -> Result<Option<usize>, RunError> {
        let instruction = self.stats.instructions;
        let piece_index = self.stats.pos;
        let piece = self
            .current_piece()
            .ok_or(RunError::SequenceExhausted {
                instruction,
                piece: piece_index,
            })?;

        match mv {
            Move::Discard => {
                if self.discard() {
                    Ok(None)
                } else {
                    Err(RunError::DiscardLimit {
                        instruction,
                        piece: piece_index,
                    })
                }
            }
            Move::Place { rotation, xpos } => {
                let form = piece.form(rotation);
                let translation = xpos + form.translation();
                match self.drop_form(form, xpos) {
                    Ok(lines) => Ok(Some(lines)),
                    Err(PlacementError::OutOfBounds { .. }) => Err(RunError::OutsideField {
                        translation,
                        rotation,
                        instruction,
                        piece: piece_index,
                    }),
                    Err(PlacementError::TooHigh) => Err(RunError::DoesNotFit {
                        translation,
                        rotation,
                        instruction,
                        piece: piece_index,
                    }),
                }
            }
        }
    }

    /// Applies `mv` and writes its instructions to `out`, counting each one.
    ///
    /// Nothing is written when the move is rejected.
    pub fn commit<W: Write>(&mut self, mv: Move, out: &mut W) -> Result<Option<usize>, RunError> {
        let piece = self.current_piece().ok_or(RunError::SequenceExhausted {
            instruction: self.stats.instructions,
            piece: self.stats.pos,
        })?;
        let lines = self.apply(mv)?;
        self.stats.instructions += write_move(out, mv, piece)?;
        out.flush()?;
        Ok(lines)
    }

    /// Ends the session, returning the final field and stats.
    pub fn into_parts(self) -> (Field, Stats) {
        (self.field, self.stats)
    }
}
