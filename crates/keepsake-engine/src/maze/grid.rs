use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::rng::Rng;
use crate::error::{KeepsakeError, Result};

/// A single maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Path,
}

/// Grid coordinate (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub x: usize,
    pub y: usize,
}

impl CellPos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Step `distance` cells in a direction. None if that leaves the positive quadrant.
    pub fn step(self, dir: Direction, distance: usize) -> Option<CellPos> {
        let (dx, dy) = dir.delta();
        let x = self.x as isize + dx * distance as isize;
        let y = self.y as isize + dy * distance as isize;
        if x < 0 || y < 0 {
            None
        } else {
            Some(CellPos::new(x as usize, y as usize))
        }
    }
}

/// Four axis-aligned moves. No diagonals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Carving order used by the generator.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// (dx, dy) with y growing downwards.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Maze size presets offered on the choice screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

impl Difficulty {
    /// Side length of the square grid. Always odd.
    pub fn size(self) -> usize {
        match self {
            Difficulty::Easy => 15,
            Difficulty::Hard => 25,
        }
    }
}

/// Immutable maze produced by randomized depth-first carving.
#[derive(Debug, Clone)]
pub struct MazeGrid {
    width: usize,
    height: usize,
    /// Row-major.
    cells: Vec<Cell>,
}

impl MazeGrid {
    /// Generate a maze. Both dimensions must be odd and at least 5.
    pub fn generate(width: usize, height: usize, rng: &mut Rng) -> Result<Self> {
        if width < 5 || height < 5 || width % 2 == 0 || height % 2 == 0 {
            return Err(KeepsakeError::InvalidMazeSize { width, height });
        }
        Ok(Self::carve(width, height, rng))
    }

    /// Generate a square maze for a difficulty preset.
    pub fn for_difficulty(difficulty: Difficulty, rng: &mut Rng) -> Self {
        let size = difficulty.size();
        Self::carve(size, size, rng)
    }

    fn carve(width: usize, height: usize, rng: &mut Rng) -> Self {
        let mut grid = Self {
            width,
            height,
            cells: vec![Cell::Wall; width * height],
        };

        let start = grid.start();
        grid.set(start, Cell::Path);
        let mut stack = vec![start];
        let mut neighbours: Vec<(CellPos, CellPos)> = Vec::with_capacity(4);

        while let Some(&current) = stack.last() {
            neighbours.clear();
            for dir in Direction::ALL {
                let Some(next) = current.step(dir, 2) else { continue };
                if next.x > 0
                    && next.x < width - 1
                    && next.y > 0
                    && next.y < height - 1
                    && grid.cell(next) == Cell::Wall
                {
                    // The wall between is one step in the same direction
                    if let Some(wall) = current.step(dir, 1) {
                        neighbours.push((next, wall));
                    }
                }
            }

            if neighbours.is_empty() {
                stack.pop();
            } else {
                let (next, wall) = neighbours[rng.next_index(neighbours.len())];
                grid.set(wall, Cell::Path);
                grid.set(next, Cell::Path);
                stack.push(next);
            }
        }

        // Goal is always open, even if carving never reached it.
        let goal = grid.goal();
        grid.set(goal, Cell::Path);

        log::debug!("maze {}x{} carved, {} path cells", width, height, grid.path_cells().count());
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> CellPos {
        CellPos::new(1, 1)
    }

    pub fn goal(&self) -> CellPos {
        CellPos::new(self.width - 2, self.height - 2)
    }

    pub fn in_bounds(&self, pos: CellPos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn idx(&self, pos: CellPos) -> usize {
        pos.y * self.width + pos.x
    }

    /// Cell at `pos`; anything outside the grid reads as Wall.
    pub fn cell(&self, pos: CellPos) -> Cell {
        if self.in_bounds(pos) {
            self.cells[self.idx(pos)]
        } else {
            Cell::Wall
        }
    }

    fn set(&mut self, pos: CellPos, cell: Cell) {
        if self.in_bounds(pos) {
            let i = self.idx(pos);
            self.cells[i] = cell;
        }
    }

    pub fn is_path(&self, pos: CellPos) -> bool {
        self.cell(pos) == Cell::Path
    }

    /// All open cells, row by row.
    pub fn path_cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| CellPos::new(x, y)))
            .filter(move |&p| self.is_path(p))
    }

    /// Open neighbours of a cell (one step, four directions).
    pub fn open_neighbours(&self, pos: CellPos) -> impl Iterator<Item = CellPos> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| pos.step(dir, 1))
            .filter(move |&p| self.is_path(p))
    }

    /// Number of moves on the shortest route between two cells (BFS), if connected.
    pub fn shortest_path_len(&self, from: CellPos, to: CellPos) -> Option<usize> {
        if !self.is_path(from) || !self.is_path(to) {
            return None;
        }
        let mut dist = vec![usize::MAX; self.cells.len()];
        let mut queue = VecDeque::new();
        dist[self.idx(from)] = 0;
        queue.push_back(from);

        while let Some(pos) = queue.pop_front() {
            let d = dist[self.idx(pos)];
            if pos == to {
                return Some(d);
            }
            for next in self.open_neighbours(pos) {
                let i = self.idx(next);
                if dist[i] == usize::MAX {
                    dist[i] = d + 1;
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// Build a grid from rows of `#` (wall) and `.` (path). Used by tests and fixtures.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if width < 3 || height < 3 || rows.iter().any(|r| r.len() != width) {
            return Err(KeepsakeError::InvalidMazeSize { width, height });
        }
        let cells = rows
            .iter()
            .flat_map(|r| r.bytes())
            .map(|b| if b == b'#' { Cell::Wall } else { Cell::Path })
            .collect();
        Ok(Self { width, height, cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Count undirected edges between adjacent open cells.
    fn edge_count(grid: &MazeGrid) -> usize {
        grid.path_cells()
            .map(|p| {
                [Direction::Right, Direction::Down]
                    .into_iter()
                    .filter_map(|d| p.step(d, 1))
                    .filter(|&n| grid.is_path(n))
                    .count()
            })
            .sum()
    }

    #[test]
    fn rejects_even_or_tiny_sizes() {
        let mut rng = Rng::new(1);
        assert!(MazeGrid::generate(14, 15, &mut rng).is_err());
        assert!(MazeGrid::generate(3, 3, &mut rng).is_err());
        assert!(MazeGrid::generate(5, 5, &mut rng).is_ok());
    }

    #[test]
    fn seeded_15x15_has_route_from_start_to_goal() {
        let mut rng = Rng::new(2024);
        let grid = MazeGrid::generate(15, 15, &mut rng).unwrap();
        assert!(grid.is_path(grid.start()));
        assert!(grid.is_path(grid.goal()));
        let len = grid.shortest_path_len(grid.start(), grid.goal()).unwrap();
        assert!(len > 0);
    }

    #[test]
    fn generated_mazes_are_perfect() {
        for seed in 1..40u64 {
            let mut rng = Rng::new(seed);
            let size = 5 + 2 * (seed as usize % 6);
            let grid = MazeGrid::generate(size, size + 2, &mut rng).unwrap();

            let cells: Vec<_> = grid.path_cells().collect();
            // Connected: every open cell reachable from start
            for &c in &cells {
                assert!(grid.shortest_path_len(grid.start(), c).is_some(), "seed {seed}: {c:?} unreachable");
            }
            // Tree: edges = nodes - 1, so exactly one simple path between any two cells
            assert_eq!(edge_count(&grid), cells.len() - 1, "seed {seed}: maze has a cycle");
        }
    }

    #[test]
    fn border_is_solid() {
        let mut rng = Rng::new(5);
        let grid = MazeGrid::for_difficulty(Difficulty::Hard, &mut rng);
        assert_eq!(grid.width(), 25);
        for x in 0..grid.width() {
            assert_eq!(grid.cell(CellPos::new(x, 0)), Cell::Wall);
            assert_eq!(grid.cell(CellPos::new(x, grid.height() - 1)), Cell::Wall);
        }
        for y in 0..grid.height() {
            assert_eq!(grid.cell(CellPos::new(0, y)), Cell::Wall);
            assert_eq!(grid.cell(CellPos::new(grid.width() - 1, y)), Cell::Wall);
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let a = MazeGrid::for_difficulty(Difficulty::Easy, &mut Rng::new(77));
        let b = MazeGrid::for_difficulty(Difficulty::Easy, &mut Rng::new(77));
        assert_eq!(a.cells, b.cells);
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let grid = MazeGrid::for_difficulty(Difficulty::Easy, &mut Rng::new(3));
        assert_eq!(grid.cell(CellPos::new(100, 1)), Cell::Wall);
    }

    #[test]
    fn difficulty_parses_lowercase() {
        let d: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(d, Difficulty::Hard);
        assert_eq!(d.size() % 2, 1);
    }
}
