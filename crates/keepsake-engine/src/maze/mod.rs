// maze/mod.rs
//
// Perfect-maze generation and keyboard navigation for the proposal game.

pub mod grid;
pub mod navigator;

pub use grid::{Cell, CellPos, Difficulty, Direction, MazeGrid};
pub use navigator::{Glow, MazeSession, MoveOutcome};
