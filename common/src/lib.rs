//! Knowledge-based solver for the hazard-grid deduction puzzle.
//!
//! A revealed cell reports how many of its neighbors hold a hazard. The
//! [`InferenceAgent`] turns each report into a [`Constraint`] and the
//! [`KnowledgeBase`] combines constraints until no further cell can be proven
//! safe or hazardous. Only logically certain facts are derived.

pub mod agent;
pub mod audit;
pub mod constraint;
pub mod error;
pub mod game;
pub mod knowledge;
pub mod point;
pub mod session;

pub use agent::{InferenceAgent, Observation};
pub use audit::audit;
pub use constraint::Constraint;
pub use error::{KnowledgeError, Status};
pub use game::{Cell, Game, GameState, Reveal};
pub use knowledge::KnowledgeBase;
pub use point::Point;
pub use session::{Report, Session, Turn};
