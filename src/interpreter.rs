//! State machine that executes the move protocol.
//!
//! One piece is handled at a time. `NEW BLOCK` activates the next piece of
//! the sequence at translation 0 and rotation 0; moves and rotations adjust it;
//! `DROP` places it. Between pieces, `DISCARD` skips the next piece. Any
//! instruction that does not fit the current state ends the run.

use std::io::BufRead;

use crate::error::{PlacementError, RunError};
use crate::field::{Field, FIELD_WIDTH};
use crate::game::Game;
use crate::instruction::{read_line, Instruction};
use crate::observer::{Candidate, Observer};
use crate::piece::NUM_ROTATIONS;
use crate::session::Session;
use crate::stats::Stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for `NEW BLOCK` or `DISCARD`.
    Idle,
    /// A piece is being positioned.
    Active { rotation: usize, translation: i32 },
}

/// Outcome of a run. Stats are available whether or not it failed.
#[derive(Debug)]
pub struct RunReport {
    pub field: Field,
    pub stats: Stats,
    pub error: Option<RunError>,
}

impl RunReport {
    #[inline]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Interpreter<'g> {
    session: Session<'g>,
    state: State,
}

impl<'g> Interpreter<'g> {
    pub fn new(game: &'g Game) -> Self {
        Self {
            session: Session::new(game),
            state: State::Idle,
        }
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn session(&self) -> &Session<'g> {
        &self.session
    }

    /// True once every piece has been played and none is active.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == State::Idle && self.session.is_finished()
    }

    /// Executes one protocol line.
    pub fn execute(&mut self, line: &str, observer: &mut dyn Observer) -> Result<(), RunError> {
        self.session.count_instruction();
        let instruction_index = self.session.stats().instructions;
        let piece_index = self.session.stats().pos;

        let unexpected = || RunError::UnexpectedInput {
            line: line.to_owned(),
            instruction: instruction_index,
            piece: piece_index,
        };
        let instruction: Instruction = line.parse().map_err(|_| unexpected())?;

        match (self.state, instruction) {
            (_, Instruction::Debug) => {
                log::debug!(
                    "field at instruction {instruction_index} (piece {piece_index}):\n{}",
                    self.session.field()
                );
            }
            (State::Idle, Instruction::NewBlock) => {
                if self.session.current_piece().is_none() {
                    return Err(RunError::SequenceExhausted {
                        instruction: instruction_index,
                        piece: piece_index,
                    });
                }
                self.state = State::Active {
                    rotation: 0,
                    translation: 0,
                };
            }
            (State::Active { rotation, translation }, Instruction::MoveLeft) => {
                self.state = State::Active {
                    rotation,
                    translation: translation - 1,
                };
            }
            (State::Active { rotation, translation }, Instruction::MoveRight) => {
                self.state = State::Active {
                    rotation,
                    translation: translation + 1,
                };
            }
            (State::Active { rotation, translation }, Instruction::RotateCcw) => {
                self.state = State::Active {
                    rotation: (rotation + 1) % NUM_ROTATIONS,
                    translation,
                };
            }
            (State::Active { rotation, translation }, Instruction::RotateCw) => {
                self.state = State::Active {
                    rotation: (rotation + NUM_ROTATIONS - 1) % NUM_ROTATIONS,
                    translation,
                };
            }
            (State::Active { rotation, translation }, Instruction::Drop) => {
                self.drop_active(rotation, translation, instruction_index, observer)?;
            }
            (State::Idle, Instruction::Discard) => {
                if self.session.current_piece().is_none() {
                    return Err(RunError::SequenceExhausted {
                        instruction: instruction_index,
                        piece: piece_index,
                    });
                }
                if !self.session.discard() {
                    return Err(RunError::DiscardLimit {
                        instruction: instruction_index,
                        piece: piece_index,
                    });
                }
                observer.update(self.session.field(), self.session.stats(), None);
            }
            _ => return Err(unexpected()),
        }
        Ok(())
    }

    fn drop_active(
        &mut self,
        rotation: usize,
        translation: i32,
        instruction: usize,
        observer: &mut dyn Observer,
    ) -> Result<(), RunError> {
        let piece_index = self.session.stats().pos;
        let piece = self
            .session
            .current_piece()
            .ok_or(RunError::SequenceExhausted {
                instruction,
                piece: piece_index,
            })?;
        let form = piece.form(rotation);
        let xpos = translation - form.translation();

        let outside = RunError::OutsideField {
            translation,
            rotation,
            instruction,
            piece: piece_index,
        };
        if xpos < 0 || xpos as usize + form.width() > FIELD_WIDTH {
            return Err(outside);
        }

        observer.update(
            self.session.field(),
            self.session.stats(),
            Some(Candidate {
                form,
                xpos: xpos as usize,
            }),
        );

        match self.session.drop_form(form, xpos) {
            Ok(_) => {}
            Err(PlacementError::OutOfBounds { .. }) => return Err(outside),
            Err(PlacementError::TooHigh) => {
                return Err(RunError::DoesNotFit {
                    translation,
                    rotation,
                    instruction,
                    piece: piece_index,
                })
            }
        }
        self.state = State::Idle;
        observer.update(self.session.field(), self.session.stats(), None);
        Ok(())
    }

    /// Reads and executes lines until the sequence is played out, the input
    /// ends, or an instruction fails.
    ///
    /// Reaching the end of input between pieces is a normal end; reaching it
    /// while a piece is active is an error.
    pub fn run<R: BufRead>(mut self, mut input: R, observer: &mut dyn Observer) -> RunReport {
        observer.update(self.session.field(), self.session.stats(), None);

        let mut buf = Vec::new();
        let error = loop {
            if self.is_done() {
                break None;
            }
            let line = match read_line(&mut input, &mut buf) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    break match self.state {
                        State::Idle => None,
                        State::Active { .. } => Some(RunError::UnexpectedEof {
                            piece: self.session.stats().pos,
                        }),
                    }
                }
                Err(err) => break Some(RunError::Io(err)),
            };
            if let Err(err) = self.execute(&line, observer) {
                break Some(err);
            }
        };

        let (field, stats) = self.session.into_parts();
        log::info!(
            "run ended after {} instruction(s), {} piece(s), score {}",
            stats.instructions,
            stats.pos,
            stats.final_score()
        );
        RunReport {
            field,
            stats,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::Headless;
    use crate::piece::Piece;
    use crate::stats::{LINES_SCORE, MAX_DISCARDS};

    /// Game whose only piece is a single cell, dealt `len` times.
    fn single_cell_game(len: usize) -> Game {
        Game::new(vec![Piece::parse(1, "X").unwrap()], vec![0; len]).unwrap()
    }

    fn run(game: &Game, script: &str) -> RunReport {
        Interpreter::new(game).run(script.as_bytes(), &mut Headless)
    }

    #[test]
    fn test_state_transitions() {
        let game = Game::new(vec![Piece::parse(1, "1X1\n010").unwrap()], vec![0]).unwrap();
        let mut interpreter = Interpreter::new(&game);
        let mut headless = Headless;
        for (line, expected) in [
            ("NEW BLOCK", State::Active { rotation: 0, translation: 0 }),
            ("MOVE LEFT", State::Active { rotation: 0, translation: -1 }),
            ("ROTATE CW", State::Active { rotation: 3, translation: -1 }),
            ("ROTATE CCW", State::Active { rotation: 0, translation: -1 }),
            ("ROTATE CCW", State::Active { rotation: 1, translation: -1 }),
            ("DEBUG", State::Active { rotation: 1, translation: -1 }),
            ("MOVE RIGHT", State::Active { rotation: 1, translation: 0 }),
            ("DROP", State::Idle),
        ] {
            interpreter.execute(line, &mut headless).unwrap();
            assert_eq!(interpreter.state(), expected, "after {line}");
        }
        assert!(interpreter.is_done());
        assert_eq!(interpreter.session().stats().instructions, 8);
    }

    #[test]
    fn test_single_cells_fill_a_row() {
        let game = single_cell_game(FIELD_WIDTH);
        let mut script = String::new();
        for column in 0..FIELD_WIDTH as i32 {
            script.push_str("NEW BLOCK\n");
            let (step, count) = if column < 7 {
                ("MOVE LEFT\n", 7 - column)
            } else {
                ("MOVE RIGHT\n", column - 7)
            };
            for _ in 0..count {
                script.push_str(step);
            }
            script.push_str("DROP\n");
        }

        let report = run(&game, &script);
        assert!(report.is_success(), "{:?}", report.error);
        assert_eq!(report.stats.pos, FIELD_WIDTH);
        assert_eq!(report.stats.cleared[0], FIELD_WIDTH - 1);
        assert_eq!(report.stats.cleared[1], 1);
        assert_eq!(report.stats.score, 14 * LINES_SCORE[0] + LINES_SCORE[1]);
        assert_eq!(report.field, Field::new());
    }

    #[test]
    fn test_wrong_state_is_fatal() {
        let game = single_cell_game(3);
        for script in [
            "DROP\n",
            "MOVE LEFT\n",
            "ROTATE CW\n",
            "NEW BLOCK\nNEW BLOCK\n",
            "NEW BLOCK\nDISCARD\n",
        ] {
            let report = run(&game, script);
            let instructions = script.lines().count();
            assert!(
                matches!(
                    report.error,
                    Some(RunError::UnexpectedInput { instruction, piece: 0, .. })
                        if instruction == instructions
                ),
                "{script:?} gave {:?}",
                report.error
            );
            assert_eq!(report.stats.instructions, instructions);
        }
    }

    #[test]
    fn test_unrecognized_text_is_fatal() {
        let game = single_cell_game(2);
        let report = run(&game, "NEW BLOCK\nDROP\nnew block\nNEW BLOCK\nDROP\n");
        assert!(matches!(
            report.error,
            Some(RunError::UnexpectedInput { ref line, instruction: 3, piece: 1 })
                if line == "new block"
        ));
        assert_eq!(report.stats.pos, 1);
        assert_eq!(report.stats.dropped, 1);
    }

    #[test]
    fn test_invalid_utf8_is_unexpected_input() {
        let game = single_cell_game(2);
        let input: &[u8] = b"NEW BLOCK\nDROP\n\xffJUNK\nNEW BLOCK\nDROP\n";
        let report = Interpreter::new(&game).run(input, &mut Headless);
        assert!(matches!(
            report.error,
            Some(RunError::UnexpectedInput { instruction: 3, piece: 1, .. })
        ));
        assert_eq!(report.stats.instructions, 3);
        assert_eq!(report.stats.dropped, 1);
    }

    #[test]
    fn test_carriage_return_is_rejected() {
        let game = single_cell_game(1);
        let report = run(&game, "NEW BLOCK\r\nDROP\r\n");
        assert!(matches!(
            report.error,
            Some(RunError::UnexpectedInput { ref line, instruction: 1, piece: 0 })
                if line == "NEW BLOCK\r"
        ));
    }

    #[test]
    fn test_last_line_without_newline() {
        let game = single_cell_game(1);
        let report = run(&game, "NEW BLOCK\nDROP");
        assert!(report.is_success(), "{:?}", report.error);
        assert_eq!(report.stats.dropped, 1);
    }

    #[test]
    fn test_drop_outside_field() {
        let game = single_cell_game(1);
        let mut script = String::from("NEW BLOCK\n");
        for _ in 0..8 {
            script.push_str("MOVE RIGHT\n");
        }
        script.push_str("DROP\n");
        let report = run(&game, &script);
        assert!(matches!(
            report.error,
            Some(RunError::OutsideField { translation: 8, rotation: 0, instruction: 10, piece: 0 })
        ));
        assert_eq!(report.field, Field::new());
        assert_eq!(report.stats.dropped, 0);
    }

    #[test]
    fn test_drop_above_the_top() {
        let tall = Piece::parse(1, "1\n1\n1\n1\nX").unwrap();
        let game = Game::new(vec![tall], vec![0; 9]).unwrap();
        let report = run(&game, &"NEW BLOCK\nDROP\n".repeat(9));
        assert!(matches!(
            report.error,
            Some(RunError::DoesNotFit { instruction: 18, piece: 8, .. })
        ));
        assert_eq!(report.stats.dropped, 8);
        assert_eq!(report.field.top(7), 40);
    }

    #[test]
    fn test_discard_quota() {
        let game = single_cell_game(MAX_DISCARDS + 2);
        let report = run(&game, &"DISCARD\n".repeat(MAX_DISCARDS + 1));
        assert!(matches!(
            report.error,
            Some(RunError::DiscardLimit { instruction: 6, piece: 5 })
        ));
        assert_eq!(report.stats.discarded, MAX_DISCARDS);
        assert_eq!(report.stats.pos, MAX_DISCARDS);
        assert_eq!(report.stats.final_score(), 0);
    }

    #[test]
    fn test_input_end_between_pieces_is_normal() {
        let game = single_cell_game(3);
        let report = run(&game, "DISCARD\nNEW BLOCK\nDROP\n");
        assert!(report.is_success());
        assert_eq!(report.stats.pos, 2);
        assert_eq!(report.stats.final_score(), LINES_SCORE[0] + 4 * 400);
    }

    #[test]
    fn test_input_end_with_active_piece_fails() {
        let game = single_cell_game(3);
        let report = run(&game, "NEW BLOCK\nMOVE LEFT\n");
        assert!(matches!(report.error, Some(RunError::UnexpectedEof { piece: 0 })));
        assert_eq!(report.stats.instructions, 2);
    }

    #[test]
    fn test_stops_reading_after_last_piece() {
        let game = single_cell_game(1);
        let report = run(&game, "NEW BLOCK\nDROP\nthis line is never read\n");
        assert!(report.is_success());
        assert_eq!(report.stats.instructions, 2);
    }

    #[test]
    fn test_observer_sees_candidate_before_drop() {
        #[derive(Default)]
        struct Recorder {
            updates: Vec<(usize, Option<usize>)>,
        }
        impl Observer for Recorder {
            fn update(&mut self, _field: &Field, stats: &Stats, candidate: Option<Candidate<'_>>) {
                self.updates.push((stats.pos, candidate.map(|c| c.xpos)));
            }
        }

        let game = single_cell_game(2);
        let mut recorder = Recorder::default();
        let script = "NEW BLOCK\nDROP\nDISCARD\n";
        let report = Interpreter::new(&game).run(script.as_bytes(), &mut recorder);
        assert!(report.is_success());
        assert_eq!(recorder.updates, vec![(0, None), (0, Some(7)), (1, None), (2, None)]);
    }
}
