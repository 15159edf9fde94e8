//! Loading a game directory.
//!
//! A game directory holds ten piece descriptions, `0.txt` through `9.txt`,
//! and `game.txt`: the piece sequence as a string of ASCII digits, each one
//! selecting a piece by file number.

use std::fs;
use std::path::Path;

use crate::error::LoadError;
use crate::piece::Piece;

/// Number of pieces in a game.
pub const NUM_PIECES: usize = 10;

const SEQUENCE_FILE: &str = "game.txt";

/// The pieces and the order in which they are dealt.
#[derive(Debug, Clone)]
pub struct Game {
    pieces: Vec<Piece>,
    sequence: Vec<u8>,
}

impl Game {
    /// Creates a game from loaded pieces and a sequence of selectors.
    ///
    /// Every selector must index into `pieces`.
    pub fn new(pieces: Vec<Piece>, sequence: Vec<u8>) -> Result<Self, LoadError> {
        if let Some(offset) = sequence.iter().position(|&s| s as usize >= pieces.len()) {
            return Err(LoadError::InvalidSelector {
                byte: sequence[offset],
                offset,
            });
        }
        Ok(Self { pieces, sequence })
    }

    /// Loads pieces and sequence from `dir`.
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        let path = dir.join(SEQUENCE_FILE);
        let data = fs::read(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let sequence = parse_sequence(&data)?;

        let mut pieces = Vec::with_capacity(NUM_PIECES);
        for index in 0..NUM_PIECES {
            let path = dir.join(format!("{index}.txt"));
            pieces.push(Piece::load(index as u8 + 1, &path)?);
        }

        log::info!(
            "loaded game from {} ({} pieces in sequence)",
            dir.display(),
            sequence.len()
        );
        Ok(Self { pieces, sequence })
    }

    /// Number of pieces dealt in this game.
    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    #[inline]
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    /// Piece dealt at sequence position `pos`, if the sequence reaches it.
    #[inline]
    pub fn piece_at(&self, pos: usize) -> Option<&Piece> {
        self.sequence
            .get(pos)
            .map(|&selector| &self.pieces[selector as usize])
    }
}

/// Converts ASCII digits into piece selectors.
///
/// Trailing whitespace (such as a final newline) is ignored.
pub fn parse_sequence(data: &[u8]) -> Result<Vec<u8>, LoadError> {
    let end = data
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map_or(0, |last| last + 1);

    data[..end]
        .iter()
        .enumerate()
        .map(|(offset, &byte)| {
            if byte.is_ascii_digit() {
                Ok(byte - b'0')
            } else {
                Err(LoadError::InvalidSelector { byte, offset })
            }
        })
        .collect()
}
