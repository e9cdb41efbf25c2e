use crate::agent::InferenceAgent;
use crate::game::{Game, GameState, Reveal};
use crate::point::Point;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

/// What happened during one step of autoplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Probed a cell the agent had proven safe.
    Deduced { cell: Point, count: u8 },
    /// No safe cell was known, so a random unplayed cell was probed.
    Guessed { cell: Point, count: u8 },
    /// A guess hit a hazard.
    Detonated { cell: Point },
    /// No unplayed cell is left to probe.
    Stuck,
}

/// Summary of a finished (or abandoned) game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub width: usize,
    pub height: usize,
    pub hazards: usize,
    pub outcome: GameState,
    pub moves: usize,
    pub deduced_moves: usize,
    /// Guesses that landed on a safe cell.
    pub guesses: usize,
    pub hazards_identified: usize,
}

/// A board and the agent playing it.
///
/// Each step prefers a proven-safe cell and guesses only when nothing is
/// known. Every hazard the agent identifies is flagged on the board.
pub struct Session {
    game: Game,
    agent: InferenceAgent,
    rng: StdRng,
    deduced_moves: usize,
    guesses: usize,
}

impl Session {
    /// A random board. With a seed, both the layout and the guesses are reproducible.
    pub fn new(
        width: usize,
        height: usize,
        hazards: usize,
        seed: Option<u64>,
    ) -> anyhow::Result<Self> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let game = Game::new(width, height, hazards, &mut rng)?;
        Ok(Self::with_game(game, rng))
    }

    pub fn with_game(game: Game, rng: StdRng) -> Self {
        let agent = InferenceAgent::new(game.width, game.height);
        Session {
            game,
            agent,
            rng,
            deduced_moves: 0,
            guesses: 0,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn agent(&self) -> &InferenceAgent {
        &self.agent
    }

    pub fn is_finished(&self) -> bool {
        self.game.game_state != GameState::Playing
    }

    /// Plays a single move.
    pub fn step(&mut self) -> anyhow::Result<Turn> {
        if self.is_finished() {
            anyhow::bail!("game_ended");
        }

        let (cell, deduced) = match self.agent.safe_unplayed_cell() {
            Some(cell) => (cell, true),
            None => match self.agent.random_unplayed_cell(&mut self.rng) {
                Some(cell) => (cell, false),
                None => {
                    warn!("no unplayed cell left to probe");
                    return Ok(Turn::Stuck);
                }
            },
        };

        let count = match self.game.reveal(cell)? {
            Reveal::Hazard => {
                info!(%cell, "guess hit a hazard");
                return Ok(Turn::Detonated { cell });
            }
            Reveal::Safe(count) => count,
        };

        if deduced {
            self.deduced_moves += 1;
        } else {
            self.guesses += 1;
        }
        debug!(%cell, count, deduced, "probed cell");

        self.agent.add_knowledge(cell, count)?;
        for &hazard in self.agent.known_hazard() {
            self.game.flag(hazard)?;
        }

        Ok(if deduced {
            Turn::Deduced { cell, count }
        } else {
            Turn::Guessed { cell, count }
        })
    }

    /// Steps until the game ends or the agent runs out of moves.
    pub fn play(&mut self) -> anyhow::Result<Report> {
        while !self.is_finished() {
            if self.step()? == Turn::Stuck {
                break;
            }
        }
        Ok(self.report())
    }

    pub fn report(&self) -> Report {
        Report {
            width: self.game.width,
            height: self.game.height,
            hazards: self.game.hazards().len(),
            outcome: self.game.game_state,
            moves: self.agent.moves_made().len(),
            deduced_moves: self.deduced_moves,
            guesses: self.guesses,
            hazards_identified: self.agent.known_hazard().len(),
        }
    }
}
