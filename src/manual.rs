//! Moves entered by hand, one per line, turned into the instruction stream.
//!
//! A line is either `discard` or `<rotation> <xpos>`, where `xpos` is the
//! field column of the form's left edge. Moves go through the same session
//! rules as played ones, so a move that the checker would reject stops the
//! run before anything is written for it.

use std::io::{BufRead, Write};

use crate::codec::Move;
use crate::error::RunError;
use crate::field::FIELD_WIDTH;
use crate::game::Game;
use crate::instruction::read_line;
use crate::interpreter::RunReport;
use crate::observer::{Candidate, Observer};
use crate::piece::NUM_ROTATIONS;
use crate::session::Session;

/// Parses one move line. Surrounding whitespace is ignored.
pub fn parse_move(line: &str) -> Option<Move> {
    let mut words = line.split_whitespace();
    let mv = match (words.next()?, words.next()) {
        ("discard", None) => Move::Discard,
        (rotation, Some(xpos)) => Move::Place {
            rotation: rotation.parse().ok().filter(|&r| r < NUM_ROTATIONS)?,
            xpos: xpos.parse().ok()?,
        },
        _ => return None,
    };
    words.next().is_none().then_some(mv)
}

/// Reads moves from `input` until the sequence is played out or the input
/// ends, writing their instructions to `out`.
pub fn run<R: BufRead, W: Write>(
    game: &Game,
    mut input: R,
    out: &mut W,
    observer: &mut dyn Observer,
) -> RunReport {
    let mut session = Session::new(game);
    let error = run_session(&mut session, &mut input, out, observer).err();

    let (field, stats) = session.into_parts();
    log::info!(
        "entered {} move(s), {} instruction(s), score {}",
        stats.pos,
        stats.instructions,
        stats.final_score()
    );
    RunReport {
        field,
        stats,
        error,
    }
}

fn run_session<R: BufRead, W: Write>(
    session: &mut Session<'_>,
    input: &mut R,
    out: &mut W,
    observer: &mut dyn Observer,
) -> Result<(), RunError> {
    let mut buf = Vec::new();
    while let Some(piece) = session.current_piece() {
        observer.update(session.field(), session.stats(), None);

        let Some(line) = read_line(input, &mut buf)? else {
            break;
        };
        let pos = session.stats().pos;
        let mv = parse_move(&line).ok_or(RunError::InvalidMove { line, piece: pos })?;

        if let Move::Place { rotation, xpos } = mv {
            let form = piece.form(rotation);
            if xpos >= 0 && xpos as usize + form.width() <= FIELD_WIDTH {
                let candidate = Candidate {
                    form,
                    xpos: xpos as usize,
                };
                observer.update(session.field(), session.stats(), Some(candidate));
            }
        }
        session.commit(mv, out)?;
    }

    observer.update(session.field(), session.stats(), None);
    Ok(())
}
