//! The textual instruction vocabulary.

use std::fmt;
use std::io::{self, BufRead};
use std::str::FromStr;

use thiserror::Error;

/// One line of the move protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    NewBlock,
    RotateCcw,
    RotateCw,
    MoveLeft,
    MoveRight,
    Drop,
    Discard,
    Debug,
}

impl Instruction {
    pub const ALL: [Instruction; 8] = [
        Instruction::NewBlock,
        Instruction::RotateCcw,
        Instruction::RotateCw,
        Instruction::MoveLeft,
        Instruction::MoveRight,
        Instruction::Drop,
        Instruction::Discard,
        Instruction::Debug,
    ];

    /// Protocol spelling, without line terminator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Instruction::NewBlock => "NEW BLOCK",
            Instruction::RotateCcw => "ROTATE CCW",
            Instruction::RotateCw => "ROTATE CW",
            Instruction::MoveLeft => "MOVE LEFT",
            Instruction::MoveRight => "MOVE RIGHT",
            Instruction::Drop => "DROP",
            Instruction::Discard => "DISCARD",
            Instruction::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text that is not one of the eight instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown instruction {0:?}")]
pub struct UnknownInstruction(pub String);

impl FromStr for Instruction {
    type Err = UnknownInstruction;

    /// Matching is exact and case-sensitive.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        Instruction::ALL
            .into_iter()
            .find(|instruction| instruction.as_str() == line)
            .ok_or_else(|| UnknownInstruction(line.to_owned()))
    }
}

/// Reads one line without its `\n` terminator, or `None` at end of input.
///
/// Nothing else is stripped, so a `\r` stays part of the line. Bytes that
/// are not UTF-8 are replaced and the line no longer parses as an
/// instruction.
pub fn read_line<R: BufRead>(input: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>> {
    buf.clear();
    if input.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}
