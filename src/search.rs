//! Depth-limited lookahead over future placements.
//!
//! Every branch works on its own copy of the field; the caller's field is
//! never touched. Leaves are scored by a static evaluator that rewards score
//! and penalises ragged surfaces and tall columns.
//!
//! Cost per ply is at most 4 rotations x 15 columns, so a depth of 3 visits
//! up to 60^3 leaves. A field copy is a flat array copy.

use rayon::prelude::*;

use crate::codec::Move;
use crate::field::{Field, FIELD_HEIGHT, FIELD_WIDTH};
use crate::game::Game;
use crate::stats::LINES_SCORE;

/// Value reported when no placement is possible.
pub const NO_MOVE: i64 = -999_999_999;

/// Default lookahead, in pieces.
pub const DEFAULT_DEPTH: u32 = 3;

/// Linear weights of the static evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weights {
    pub score: i64,
    pub transitions: i64,
    pub height: i64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            score: 1,
            transitions: 1,
            height: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of pieces to look ahead, including the current one.
    pub depth: u32,
    pub weights: Weights,
    /// Evaluate the root branches on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            weights: Weights::default(),
            parallel: false,
        }
    }
}

/// Best value found and the placement that leads to it.
///
/// `best` is `None` only when the current piece cannot be placed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub value: i64,
    pub best: Option<Move>,
}

/// Counts occupancy changes between neighbouring cells.
///
/// The walls and the floor count as filled, so an empty cell next to them is
/// a change. The open top of the field is not counted.
pub fn transitions(field: &Field) -> i64 {
    let mut count = 0;

    for y in 0..FIELD_HEIGHT {
        count += i64::from(!field.is_filled(0, y));
        count += i64::from(!field.is_filled(FIELD_WIDTH - 1, y));
        for x in 1..FIELD_WIDTH {
            count += i64::from(field.is_filled(x - 1, y) != field.is_filled(x, y));
        }
    }

    for x in 0..FIELD_WIDTH {
        count += i64::from(!field.is_filled(x, 0));
        for y in 1..FIELD_HEIGHT {
            count += i64::from(field.is_filled(x, y - 1) != field.is_filled(x, y));
        }
    }

    count
}

/// Static value of a position.
pub fn evaluate(field: &Field, score: i64, weights: &Weights) -> i64 {
    let heights: i64 = field
        .skyline()
        .iter()
        .map(|&top| (top * top) as i64)
        .sum();
    weights.score * score - weights.transitions * transitions(field) - weights.height * heights
}

/// Every legal placement of the piece at `pos`, in enumeration order, with
/// the resulting field and score.
fn placements(game: &Game, field: &Field, pos: usize, score: i64) -> Vec<(Move, Field, i64)> {
    let Some(piece) = game.piece_at(pos) else {
        return Vec::new();
    };

    let mut branches = Vec::new();
    for (rotation, form) in piece.distinct_forms().iter().enumerate() {
        for xpos in 0..=(FIELD_WIDTH - form.width()) as i32 {
            let mut next = field.clone();
            if let Ok(lines) = next.place(form, xpos) {
                branches.push((Move::Place { rotation, xpos }, next, score + LINES_SCORE[lines]));
            }
        }
    }
    branches
}

/// Value of the position reached before the piece at `pos` is played.
fn value(
    game: &Game,
    field: &Field,
    pos: usize,
    score: i64,
    depth: u32,
    config: &SearchConfig,
) -> i64 {
    if pos >= game.len() {
        return 0;
    }
    if depth == 0 {
        return evaluate(field, score, &config.weights);
    }

    placements(game, field, pos, score)
        .iter()
        .map(|(_, next, next_score)| value(game, next, pos + 1, *next_score, depth - 1, config))
        .max()
        .unwrap_or(NO_MOVE)
}

/// Searches `depth` pieces ahead from sequence position `pos`.
///
/// Ties keep the first placement in enumeration order (rotation, then
/// column), whether or not the root branches run in parallel.
pub fn search(
    game: &Game,
    field: &Field,
    pos: usize,
    score: i64,
    depth: u32,
    config: &SearchConfig,
) -> SearchOutcome {
    if pos >= game.len() {
        return SearchOutcome { value: 0, best: None };
    }
    if depth == 0 {
        return SearchOutcome {
            value: evaluate(field, score, &config.weights),
            best: None,
        };
    }

    let branches = placements(game, field, pos, score);
    let child = |(_, next, next_score): &(Move, Field, i64)| {
        value(game, next, pos + 1, *next_score, depth - 1, config)
    };
    let values: Vec<i64> = if config.parallel {
        branches.par_iter().map(child).collect()
    } else {
        branches.iter().map(child).collect()
    };

    let mut outcome = SearchOutcome {
        value: NO_MOVE,
        best: None,
    };
    for ((mv, _, _), value) in branches.iter().zip(values) {
        if outcome.best.is_none() || value > outcome.value {
            outcome = SearchOutcome {
                value,
                best: Some(*mv),
            };
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;

    fn game(shapes: &[&str], sequence: Vec<u8>) -> Game {
        let pieces = shapes
            .iter()
            .enumerate()
            .map(|(index, shape)| Piece::parse(index as u8 + 1, shape).unwrap())
            .collect();
        Game::new(pieces, sequence).unwrap()
    }

    #[test]
    fn test_empty_field_evaluation() {
        let field = Field::new();
        // walls on every row, floor under every column
        assert_eq!(transitions(&field), 2 * FIELD_HEIGHT as i64 + FIELD_WIDTH as i64);
        assert_eq!(evaluate(&field, 0, &Weights::default()), -95);
        assert_eq!(evaluate(&field, 100, &Weights::default()), 5);
    }

    #[test]
    fn test_evaluation_of_one_cell() {
        let cell = Piece::parse(1, "X").unwrap();
        let mut field = Field::new();
        field.place(cell.form(0), 0).unwrap();
        // row 0 loses the left-wall change but gains one at column 0/1;
        // column 0 loses the floor change but gains one above the cell
        assert_eq!(transitions(&field), 95);
        assert_eq!(evaluate(&field, 10, &Weights::default()), 10 - 95 - 1);

        let weights = Weights {
            score: 2,
            transitions: 0,
            height: 3,
        };
        assert_eq!(evaluate(&field, 10, &weights), 17);
    }

    #[test]
    fn test_depth_zero_is_evaluation() {
        let game = game(&["X"], vec![0, 0]);
        let mut field = Field::new();
        field.place(game.pieces()[0].form(0), 3).unwrap();
        let config = SearchConfig::default();
        let outcome = search(&game, &field, 0, 40, 0, &config);
        assert_eq!(
            outcome,
            SearchOutcome {
                value: evaluate(&field, 40, &config.weights),
                best: None
            }
        );
    }

    #[test]
    fn test_past_the_end_is_zero() {
        let game = game(&["X"], vec![0]);
        let outcome = search(&game, &Field::new(), 1, 500, 3, &SearchConfig::default());
        assert_eq!(outcome, SearchOutcome { value: 0, best: None });
    }

    #[test]
    fn test_last_piece_takes_first_placement() {
        let game = game(&["X"], vec![0]);
        let cell = game.pieces()[0].form(0);
        let mut field = Field::new();
        for column in 0..FIELD_WIDTH as i32 - 1 {
            field.place(cell, column).unwrap();
        }

        let outcome = search(&game, &field, 0, 0, 1, &SearchConfig::default());
        assert_eq!(
            outcome,
            SearchOutcome {
                value: 0,
                best: Some(Move::Place { rotation: 0, xpos: 0 })
            }
        );
    }

    #[test]
    fn test_prefers_completing_a_row() {
        let game = game(&["X"], vec![0, 0]);
        let cell = game.pieces()[0].form(0);
        let mut field = Field::new();
        for column in 0..FIELD_WIDTH as i32 {
            if column != 9 {
                field.place(cell, column).unwrap();
            }
        }
        let before = field.clone();

        let config = SearchConfig {
            depth: 1,
            ..SearchConfig::default()
        };
        let outcome = search(&game, &field, 0, 0, 1, &config);
        assert_eq!(outcome.best, Some(Move::Place { rotation: 0, xpos: 9 }));
        assert_eq!(outcome.value, evaluate(&Field::new(), LINES_SCORE[1], &config.weights));
        assert_eq!(field, before);
    }

    #[test]
    fn test_only_distinct_forms_are_tried() {
        let game = game(&["1X11"], vec![0]);
        let branches = placements(&game, &Field::new(), 0, 0);
        // 12 horizontal columns plus 15 vertical ones
        assert_eq!(branches.len(), 12 + 15);
        assert!(branches
            .iter()
            .all(|(mv, _, _)| matches!(mv, Move::Place { rotation: 0 | 1, .. })));
    }

    /// Columns 0 to 13 filled to the top, column 14 empty.
    fn single_free_column() -> Field {
        let tall = Piece::parse(1, "1\n1\n1\n1\nX").unwrap();
        let mut field = Field::new();
        for _ in 0..FIELD_HEIGHT / 5 {
            for column in 0..FIELD_WIDTH as i32 - 1 {
                assert_eq!(field.place(tall.form(0), column), Ok(0));
            }
        }
        field
    }

    #[test]
    fn test_no_move_when_nothing_fits() {
        let field = single_free_column();
        let square = game(&["X1\n11"], vec![0]);
        let outcome = search(&square, &field, 0, 0, 2, &SearchConfig::default());
        assert_eq!(outcome, SearchOutcome { value: NO_MOVE, best: None });

        let cell = game(&["X"], vec![0, 0]);
        let outcome = search(&cell, &field, 0, 0, 1, &SearchConfig::default());
        assert_eq!(outcome.best, Some(Move::Place { rotation: 0, xpos: 14 }));
    }

    #[test]
    fn test_dead_subtree_still_yields_a_root_move() {
        // the cell clears row 0, after which the square fits nowhere
        let field = single_free_column();
        let game = game(&["X", "X1\n11"], vec![0, 1]);
        let outcome = search(&game, &field, 0, 0, 2, &SearchConfig::default());
        assert_eq!(outcome.best, Some(Move::Place { rotation: 0, xpos: 14 }));
        assert_eq!(outcome.value, NO_MOVE);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let game = game(&["1X1\n010", "10\nX0\n11", "0X1\n110"], vec![0, 1, 2, 1, 0]);
        let mut field = Field::new();
        field.place(game.pieces()[1].form(0), 2).unwrap();
        field.place(game.pieces()[2].form(1), 9).unwrap();

        let sequential = SearchConfig {
            depth: 2,
            ..SearchConfig::default()
        };
        let parallel = SearchConfig {
            parallel: true,
            ..sequential
        };
        assert_eq!(
            search(&game, &field, 0, 0, 2, &sequential),
            search(&game, &field, 0, 0, 2, &parallel)
        );
    }
}
