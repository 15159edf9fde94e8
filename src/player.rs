//! Autoplayer: picks every move with the search engine and writes the
//! resulting instruction stream.

use std::io::Write;

use crate::codec::Move;
use crate::error::RunError;
use crate::game::Game;
use crate::interpreter::RunReport;
use crate::observer::{Candidate, Observer};
use crate::search::{search, SearchConfig};
use crate::session::Session;

/// Plays the whole sequence of `game`, writing instructions to `out`.
///
/// When the search finds no placement for a piece, the piece is discarded
/// while discards remain; after that the run stops with
/// [`RunError::NoMove`].
pub fn play<W: Write>(
    game: &Game,
    config: &SearchConfig,
    out: &mut W,
    observer: &mut dyn Observer,
) -> RunReport {
    play_from(Session::new(game), config, out, observer)
}

/// Like [`play`], continuing from an existing session.
pub fn play_from<W: Write>(
    mut session: Session<'_>,
    config: &SearchConfig,
    out: &mut W,
    observer: &mut dyn Observer,
) -> RunReport {
    let error = play_session(&mut session, config, out, observer).err();

    let (field, stats) = session.into_parts();
    log::info!(
        "played {} piece(s) with {} instruction(s), score {}",
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

fn play_session<W: Write>(
    session: &mut Session<'_>,
    config: &SearchConfig,
    out: &mut W,
    observer: &mut dyn Observer,
) -> Result<(), RunError> {
    while let Some(piece) = session.current_piece() {
        observer.update(session.field(), session.stats(), None);

        let pos = session.stats().pos;
        let outcome = search(
            session.game(),
            session.field(),
            pos,
            0,
            config.depth,
            config,
        );

        let mv = match outcome.best {
            Some(mv @ Move::Place { rotation, xpos }) => {
                let candidate = Candidate {
                    form: piece.form(rotation),
                    xpos: xpos as usize,
                };
                observer.update(session.field(), session.stats(), Some(candidate));
                mv
            }
            Some(Move::Discard) | None if session.stats().can_discard() => {
                log::warn!("no placement for piece {pos}, discarding it");
                Move::Discard
            }
            Some(Move::Discard) | None => return Err(RunError::NoMove { piece: pos }),
        };

        session.commit(mv, out)?;
    }

    observer.update(session.field(), session.stats(), None);
    Ok(())
}
