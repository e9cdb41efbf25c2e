use crate::error::KnowledgeError;
use crate::knowledge::KnowledgeBase;
use crate::point::Point;
use rand::Rng;
use rand::prelude::IndexedRandom;
use std::collections::BTreeSet;

/// What the board reported after a safe probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub cell: Point,
    /// Hazards among the cell's neighbors.
    pub count: u8,
}

/// The player: feeds board observations into its knowledge base and picks
/// the next cell to probe.
#[derive(Debug, Clone)]
pub struct InferenceAgent {
    width: usize,
    height: usize,
    knowledge: KnowledgeBase,
    observations: Vec<Observation>,
}

impl InferenceAgent {
    pub fn new(width: usize, height: usize) -> Self {
        InferenceAgent {
            width,
            height,
            knowledge: KnowledgeBase::new(),
            observations: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn known_hazard(&self) -> &BTreeSet<Point> {
        self.knowledge.known_hazard()
    }

    pub fn known_safe(&self) -> &BTreeSet<Point> {
        self.knowledge.known_safe()
    }

    pub fn moves_made(&self) -> &BTreeSet<Point> {
        self.knowledge.moves_made()
    }

    /// Every observation received so far, in order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Called when the board reports that `cell` is safe and has `count`
    /// hazards around it.
    pub fn add_knowledge(&mut self, cell: Point, count: u8) -> Result<(), KnowledgeError> {
        if !cell.in_bounds(self.width, self.height) {
            return Err(KnowledgeError::OutOfBounds {
                cell,
                width: self.width,
                height: self.height,
            });
        }

        self.observations.push(Observation { cell, count });
        self.knowledge.record_observation(
            cell,
            count as usize,
            cell.neighbors(self.width, self.height),
        )
    }

    /// A cell known to be safe that has not been probed yet.
    pub fn safe_unplayed_cell(&self) -> Option<Point> {
        let known = &self.knowledge;
        known
            .known_safe()
            .iter()
            .copied()
            .find(|cell| !known.moves_made().contains(cell) && !known.known_hazard().contains(cell))
    }

    /// A uniformly random cell that has not been probed and is not a known hazard.
    pub fn random_unplayed_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Point> {
        let known = &self.knowledge;
        let candidates: Vec<Point> = Point::all(self.width, self.height)
            .filter(|cell| !known.moves_made().contains(cell) && !known.known_hazard().contains(cell))
            .collect();

        candidates.choose(rng).copied()
    }
}
