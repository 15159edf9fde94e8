//! Error types for loading a game and for running one.

use std::path::PathBuf;

use thiserror::Error;

/// Structural problems in a piece description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("rows are {0} cells wide, at most 5 are allowed")]
    RowTooLong(usize),
    #[error("shape has {0} rows, at most 5 are allowed")]
    TooManyRows(usize),
    #[error("unexpected character {0:?} in shape")]
    InvalidCharacter(char),
    #[error("shape has no filled cell")]
    Empty,
    #[error("shape has no pivot cell")]
    MissingPivot,
    #[error("shape has more than one pivot cell")]
    MultiplePivots,
}

/// Failure to load a game directory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unable to read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid piece in \"{}\": {source}", path.display())]
    Shape {
        path: PathBuf,
        #[source]
        source: ShapeError,
    },
    #[error("invalid character in game data ({byte}) at offset {offset}")]
    InvalidSelector { byte: u8, offset: usize },
}

/// Rejected placement. The field is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("form of width {width} at column {xpos} is outside the field")]
    OutOfBounds { xpos: i32, width: usize },
    #[error("form would rest above the top of the field")]
    TooHigh,
}

/// Fatal condition that ends a run.
///
/// `instruction` is the 1-based count of instructions processed so far and
/// `piece` the sequence position, both as reported in the final stats.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Unexpected input {line:?} at instruction {instruction} (piece {piece})")]
    UnexpectedInput {
        line: String,
        instruction: usize,
        piece: usize,
    },
    #[error(
        "Piece with translation {translation} and rotation {rotation} is outside field \
         at instruction {instruction} (piece {piece})"
    )]
    OutsideField {
        translation: i32,
        rotation: usize,
        instruction: usize,
        piece: usize,
    },
    #[error(
        "Piece does not fit with translation {translation} and rotation {rotation} \
         at instruction {instruction} (piece {piece})"
    )]
    DoesNotFit {
        translation: i32,
        rotation: usize,
        instruction: usize,
        piece: usize,
    },
    #[error("May not discard piece at instruction {instruction} (piece {piece})")]
    DiscardLimit { instruction: usize, piece: usize },
    #[error("No piece left to play at instruction {instruction} (piece {piece})")]
    SequenceExhausted { instruction: usize, piece: usize },
    #[error("Input ended while piece {piece} was still active")]
    UnexpectedEof { piece: usize },
    #[error("Invalid move {line:?} for piece {piece}")]
    InvalidMove { line: String, piece: usize },
    #[error("No suitable move found for piece {piece}")]
    NoMove { piece: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
