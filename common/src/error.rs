use crate::point::Point;
use thiserror::Error;

/// A classification a cell can receive from the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Safe,
    Hazard,
}

/// The knowledge base has reached a logically inconsistent state.
///
/// None of these are recoverable: they mean the observations contradict each
/// other or the deduction logic is broken. The puzzle instance is over.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnowledgeError {
    /// Removing a hazard would drive a constraint's count below zero.
    #[error("constraint count would go negative at {cell}")]
    NegativeCount { cell: Point },

    /// Subtracting a subset constraint would leave a negative count.
    #[error("subset claims {subset} hazards but its superset only {superset}")]
    NegativeDifference { subset: usize, superset: usize },

    /// A constraint claims more hazards than it has cells.
    #[error("constraint claims {count} hazards among {cells} cells")]
    CountExceedsCells { count: usize, cells: usize },

    /// A classified cell was about to receive the opposite classification.
    #[error("{cell} is already known as {was:?}, cannot mark it {now:?}")]
    Reclassified { cell: Point, was: Status, now: Status },

    /// A constraint lost all of its cells but still expects hazards.
    #[error("empty constraint still expects {count} hazards")]
    ResidualCount { count: usize },

    #[error("{cell} is outside the {width}x{height} board")]
    OutOfBounds {
        cell: Point,
        width: usize,
        height: usize,
    },
}
