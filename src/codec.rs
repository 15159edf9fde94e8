//! Conversion between structured moves and protocol instructions.

use std::io::{self, Write};

use crate::instruction::Instruction;
use crate::piece::Piece;

/// A decision for the current piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    /// Consume the piece without placing it.
    Discard,
    /// Drop orientation `rotation` with its left edge at column `xpos`.
    Place { rotation: usize, xpos: i32 },
}

impl Move {
    /// Builds a placement from a protocol translation, as reached by the
    /// `MOVE LEFT`/`MOVE RIGHT` instructions.
    pub fn from_translation(piece: &Piece, rotation: usize, translation: i32) -> Self {
        Move::Place {
            rotation,
            xpos: translation - piece.form(rotation).translation(),
        }
    }

    /// Horizontal offset from the spawn position, or `None` for a discard.
    pub fn translation(&self, piece: &Piece) -> Option<i32> {
        match *self {
            Move::Discard => None,
            Move::Place { rotation, xpos } => Some(xpos + piece.form(rotation).translation()),
        }
    }
}

/// Instructions that perform `mv` on `piece`.
pub fn encode(mv: Move, piece: &Piece) -> Vec<Instruction> {
    let Move::Place { rotation, .. } = mv else {
        return vec![Instruction::Discard];
    };
    let translation = mv.translation(piece).unwrap_or(0);
    let shift = if translation < 0 {
        Instruction::MoveLeft
    } else {
        Instruction::MoveRight
    };

    let mut instructions = Vec::with_capacity(2 + rotation + translation.unsigned_abs() as usize);
    instructions.push(Instruction::NewBlock);
    instructions.extend(std::iter::repeat(Instruction::RotateCcw).take(rotation));
    instructions.extend(std::iter::repeat(shift).take(translation.unsigned_abs() as usize));
    instructions.push(Instruction::Drop);
    instructions
}

/// Writes the instructions for `mv`, one per line.
///
/// Returns the number of instructions written, which is what an interpreter
/// counts when it reads them back.
pub fn write_move<W: Write>(out: &mut W, mv: Move, piece: &Piece) -> io::Result<usize> {
    let instructions = encode(mv, piece);
    for instruction in &instructions {
        writeln!(out, "{instruction}")?;
    }
    Ok(instructions.len())
}
