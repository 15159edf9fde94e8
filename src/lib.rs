//! Falling-block puzzle engine.
//!
//! Loads a game (ten piece shapes and a piece sequence), checks instruction
//! streams against it, turns hand-entered moves into instructions, and plays
//! it automatically with a lookahead search.

pub mod codec;
pub mod error;
pub mod field;
pub mod game;
pub mod instruction;
pub mod interpreter;
pub mod manual;
pub mod observer;
pub mod piece;
pub mod player;
pub mod search;
pub mod session;
pub mod stats;

pub use error::{LoadError, PlacementError, RunError, ShapeError};
pub use field::Field;
pub use game::Game;
pub use interpreter::{Interpreter, RunReport};
pub use observer::{Candidate, Headless, Observer};
pub use piece::{Form, Piece};
pub use search::{SearchConfig, Weights};
pub use stats::Stats;
