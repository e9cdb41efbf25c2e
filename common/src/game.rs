//! The board itself: hazard placement, neighbor counts and win detection.
//!
//! This is the ground truth the agent probes. It knows nothing about
//! deduction; the agent only ever learns what `reveal` tells it.

use crate::point::Point;
use rand::Rng;
use rand::prelude::IndexedRandom;
use std::collections::BTreeSet;
use std::fmt::Write;

/// The visible state of a single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Hidden,
    Revealed(u8), // The u8 is the number of adjacent hazards.
    Flagged,
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// Outcome of probing a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Safe(u8),
    Hazard,
}

#[derive(Debug, Clone)]
pub struct Game {
    pub width: usize,
    pub height: usize,
    hazards: BTreeSet<Point>,
    /// The visible state of the board, indexed `board[row][col]`.
    pub board: Vec<Vec<Cell>>,
    pub game_state: GameState,
}

impl Game {
    /// A board with `hazards` hazards placed uniformly at random.
    pub fn new<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        hazards: usize,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        if hazards >= width * height {
            anyhow::bail!("hazard count must be less than the number of cells on the board");
        }
        let cells: Vec<Point> = Point::all(width, height).collect();
        let placed: Vec<Point> = cells.choose_multiple(rng, hazards).copied().collect();
        Self::with_hazards(width, height, placed)
    }

    /// A board with hazards at exactly the given cells.
    pub fn with_hazards(
        width: usize,
        height: usize,
        hazards: impl IntoIterator<Item = Point>,
    ) -> anyhow::Result<Self> {
        if width == 0 || height == 0 {
            anyhow::bail!("board must have at least one row and one column");
        }
        let hazards: BTreeSet<Point> = hazards.into_iter().collect();
        if let Some(outside) = hazards.iter().find(|p| !p.in_bounds(width, height)) {
            anyhow::bail!("hazard {outside} is outside the {width}x{height} board");
        }
        if hazards.len() >= width * height {
            anyhow::bail!("hazard count must be less than the number of cells on the board");
        }

        Ok(Game {
            width,
            height,
            hazards,
            board: vec![vec![Cell::Hidden; width]; height],
            game_state: GameState::Playing,
        })
    }

    pub fn hazards(&self) -> &BTreeSet<Point> {
        &self.hazards
    }

    pub fn is_hazard(&self, at: Point) -> bool {
        self.hazards.contains(&at)
    }

    /// Number of hazards among the (up to 8) cells around `at`.
    pub fn nearby_hazards(&self, at: Point) -> u8 {
        at.neighbors(self.width, self.height)
            .filter(|n| self.hazards.contains(n))
            .count() as u8
    }

    /// Probes a cell. Hitting a hazard ends the game.
    pub fn reveal(&mut self, at: Point) -> anyhow::Result<Reveal> {
        self.check_bounds(at)?;
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }
        if let Cell::Revealed(count) = self.board[at.row][at.col] {
            return Ok(Reveal::Safe(count));
        }

        if self.is_hazard(at) {
            self.game_state = GameState::Lost;
            return Ok(Reveal::Hazard);
        }

        let count = self.nearby_hazards(at);
        self.board[at.row][at.col] = Cell::Revealed(count);
        self.update_win_state();
        Ok(Reveal::Safe(count))
    }

    /// Marks a cell as an identified hazard.
    pub fn flag(&mut self, at: Point) -> anyhow::Result<()> {
        self.check_bounds(at)?;
        match self.board[at.row][at.col] {
            Cell::Revealed(_) => anyhow::bail!("{at} is already revealed"),
            Cell::Flagged => return Ok(()),
            Cell::Hidden => self.board[at.row][at.col] = Cell::Flagged,
        }
        self.update_win_state();
        Ok(())
    }

    pub fn won(&self) -> bool {
        self.game_state == GameState::Won
    }

    /// The game is won once every hazard is flagged, or once every cell
    /// without a hazard has been revealed.
    pub fn check_win_condition(&self) -> bool {
        let flagged: BTreeSet<Point> = Point::all(self.width, self.height)
            .filter(|p| self.board[p.row][p.col] == Cell::Flagged)
            .collect();
        if flagged == self.hazards {
            return true;
        }

        Point::all(self.width, self.height)
            .filter(|p| !self.is_hazard(*p))
            .all(|p| matches!(self.board[p.row][p.col], Cell::Revealed(_)))
    }

    fn update_win_state(&mut self) {
        if self.game_state == GameState::Playing && self.check_win_condition() {
            self.game_state = GameState::Won;
        }
    }

    fn check_bounds(&self, at: Point) -> anyhow::Result<()> {
        if !at.in_bounds(self.width, self.height) {
            anyhow::bail!("{at} is outside the {}x{} board", self.width, self.height);
        }
        Ok(())
    }

    /// Flat row-major view for hosts: -1 hidden, -2 flagged, 0..=8 revealed.
    pub fn cells(&self) -> Vec<i8> {
        self.board
            .iter()
            .flatten()
            .map(|cell| match cell {
                Cell::Hidden => -1,
                Cell::Flagged => -2,
                Cell::Revealed(n) => *n as i8,
            })
            .collect()
    }

    /// Text rendering of the board. With `show_hazards`, hidden hazards are
    /// drawn as `X`.
    pub fn render(&self, show_hazards: bool) -> String {
        let mut out = String::from("   ");
        for col in 0..self.width {
            let _ = write!(out, "{:^3}", col);
        }
        let _ = writeln!(out, "\n  +{}", "---".repeat(self.width));

        for (row, cells) in self.board.iter().enumerate() {
            let _ = write!(out, "{:^2}|", row);
            for (col, cell) in cells.iter().enumerate() {
                let display = match cell {
                    Cell::Hidden if show_hazards && self.is_hazard(Point::new(row, col)) => {
                        " X ".to_string()
                    }
                    Cell::Hidden => " ■ ".to_string(),
                    Cell::Flagged => " F ".to_string(),
                    Cell::Revealed(n) => format!(" {} ", n),
                };
                out.push_str(&display);
            }
            out.push('\n');
        }
        out
    }
}
