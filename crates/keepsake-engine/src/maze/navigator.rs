use super::grid::{CellPos, Difficulty, Direction, MazeGrid};
use crate::core::rng::Rng;

/// Result of a single directional attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    pub accepted: bool,
    pub reached_goal: bool,
}

/// Glow parameters derived from proximity. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub blur: f32,
    pub spread: f32,
    pub alpha: f32,
    pub border_alpha: f32,
}

/// One maze-game session: the grid plus the player's position.
#[derive(Debug, Clone)]
pub struct MazeSession {
    grid: MazeGrid,
    player: CellPos,
    finished: bool,
    moves: u32,
}

impl MazeSession {
    pub fn new(grid: MazeGrid) -> Self {
        let player = grid.start();
        Self {
            grid,
            player,
            finished: false,
            moves: 0,
        }
    }

    /// Fresh session for a difficulty preset.
    pub fn for_difficulty(difficulty: Difficulty, rng: &mut Rng) -> Self {
        Self::new(MazeGrid::for_difficulty(difficulty, rng))
    }

    /// Try to move one cell. Walls, the border and moves after the goal are no-ops.
    pub fn attempt_move(&mut self, dir: Direction) -> MoveOutcome {
        if self.finished {
            return MoveOutcome::default();
        }
        let Some(target) = self.player.step(dir, 1) else {
            return MoveOutcome::default();
        };
        if !self.grid.is_path(target) {
            return MoveOutcome::default();
        }

        self.player = target;
        self.moves += 1;
        let reached_goal = target == self.grid.goal();
        if reached_goal {
            self.finished = true;
            log::info!("maze solved in {} moves", self.moves);
        }
        MoveOutcome { accepted: true, reached_goal }
    }

    /// 1 at the goal, falling towards 0 with Euclidean distance.
    pub fn intensity(&self) -> f32 {
        let w = self.grid.width() as f32;
        let h = self.grid.height() as f32;
        let max_dist = (w * w + h * h).sqrt();
        let goal = self.grid.goal();
        let dx = goal.x as f32 - self.player.x as f32;
        let dy = goal.y as f32 - self.player.y as f32;
        let dist = (dx * dx + dy * dy).sqrt();
        (1.0 - dist / max_dist).clamp(0.0, 1.0)
    }

    pub fn glow(&self) -> Glow {
        let i = self.intensity();
        Glow {
            blur: 20.0 + i * 50.0,
            spread: 5.0 + i * 10.0,
            alpha: 0.3 + i * 0.5,
            border_alpha: 0.5 + i * 0.5,
        }
    }

    pub fn player(&self) -> CellPos {
        self.player
    }

    pub fn grid(&self) -> &MazeGrid {
        &self.grid
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }
}
