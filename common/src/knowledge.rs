//! The knowledge base: every constraint learned so far plus the cells that
//! have been classified as safe or hazardous.
//!
//! Each observation is absorbed in a fixed order:
//! 1. Record the move and mark the probed cell safe.
//! 2. Build a constraint over the cell's still-unknown neighbors.
//! 3. Propagate trivial conclusions until nothing new is classified.
//! 4. Apply subset-subtraction, propagate again, and repeat until neither
//!    step produces anything new.
//!
//! Classification is global: marking a cell updates the shared sets and every
//! constraint currently held.

use crate::constraint::Constraint;
use crate::error::{KnowledgeError, Status};
use crate::point::Point;
use itertools::Itertools;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, trace};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    /// Cells that have been probed. Only ever grows.
    moves_made: BTreeSet<Point>,
    /// Cells proven to be hazards. Disjoint from `known_safe`.
    known_hazard: BTreeSet<Point>,
    /// Cells proven to be safe. Disjoint from `known_hazard`.
    known_safe: BTreeSet<Point>,
    constraints: Vec<Constraint>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moves_made(&self) -> &BTreeSet<Point> {
        &self.moves_made
    }

    pub fn known_hazard(&self) -> &BTreeSet<Point> {
        &self.known_hazard
    }

    pub fn known_safe(&self) -> &BTreeSet<Point> {
        &self.known_safe
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Absorbs the fact that `cell` was probed safely and has `count` hazards
    /// among `neighbors`, then runs deduction to a fixpoint.
    pub fn record_observation(
        &mut self,
        cell: Point,
        count: usize,
        neighbors: impl IntoIterator<Item = Point>,
    ) -> Result<(), KnowledgeError> {
        debug!(%cell, count, "recording observation");

        // --- 1. Record the move ---
        self.mark_safe(cell)?;
        self.moves_made.insert(cell);

        // --- 2. Constrain the unknown neighbors ---
        let constraint = self.neighbor_constraint(cell, count, neighbors)?;
        self.add_constraint(constraint);

        // --- 3. Exhaust trivial conclusions before subtraction runs ---
        self.propagate()?;

        // --- 4. Alternate subtraction and propagation to a fixpoint ---
        let mut rounds = 0;
        loop {
            let added = self.infer_subsets()?;
            let changed = self.propagate()?;
            rounds += 1;
            if added == 0 && !changed {
                break;
            }
        }

        debug!(
            %cell,
            rounds,
            constraints = self.constraints.len(),
            safe = self.known_safe.len(),
            hazards = self.known_hazard.len(),
            "knowledge settled"
        );
        Ok(())
    }

    /// Builds the constraint for an observation over the neighbors whose status
    /// is still unknown, discounting neighbors already known to be hazards.
    fn neighbor_constraint(
        &self,
        cell: Point,
        count: usize,
        neighbors: impl IntoIterator<Item = Point>,
    ) -> Result<Constraint, KnowledgeError> {
        let mut remaining = count;
        let mut cells = BTreeSet::new();

        for neighbor in neighbors {
            if neighbor == cell || self.known_safe.contains(&neighbor) {
                continue;
            }
            if self.known_hazard.contains(&neighbor) {
                remaining = remaining
                    .checked_sub(1)
                    .ok_or(KnowledgeError::NegativeCount { cell })?;
                continue;
            }
            cells.insert(neighbor);
        }

        Constraint::new(cells, remaining)
    }

    /// Adds a constraint unless an equal one is already held.
    /// Returns whether it was added.
    pub fn add_constraint(&mut self, constraint: Constraint) -> bool {
        if self.constraints.contains(&constraint) {
            return false;
        }
        trace!(%constraint, "adding constraint");
        self.constraints.push(constraint);
        true
    }

    /// Marks a cell as a hazard and removes it from every constraint.
    /// Returns whether the cell was newly classified.
    ///
    /// Every constraint is checked before anything changes, so an `Err` leaves
    /// the base as it was.
    pub fn mark_hazard(&mut self, cell: Point) -> Result<bool, KnowledgeError> {
        if self.known_safe.contains(&cell) {
            return Err(KnowledgeError::Reclassified {
                cell,
                was: Status::Safe,
                now: Status::Hazard,
            });
        }
        if self.known_hazard.contains(&cell) {
            return Ok(false);
        }
        for constraint in &self.constraints {
            constraint.check_hazard(cell)?;
        }

        self.known_hazard.insert(cell);
        trace!(%cell, "marked hazard");
        for constraint in &mut self.constraints {
            constraint.apply_hazard(cell)?;
        }
        Ok(true)
    }

    /// Marks a cell as safe and removes it from every constraint.
    /// Returns whether the cell was newly classified. An `Err` leaves the base
    /// as it was.
    pub fn mark_safe(&mut self, cell: Point) -> Result<bool, KnowledgeError> {
        if self.known_hazard.contains(&cell) {
            return Err(KnowledgeError::Reclassified {
                cell,
                was: Status::Hazard,
                now: Status::Safe,
            });
        }
        if self.known_safe.contains(&cell) {
            return Ok(false);
        }
        for constraint in &self.constraints {
            constraint.check_safe(cell)?;
        }

        self.known_safe.insert(cell);
        trace!(%cell, "marked safe");
        for constraint in &mut self.constraints {
            constraint.apply_safe(cell)?;
        }
        Ok(true)
    }

    /// Classifies every cell some constraint settles on its own, broadcasts the
    /// classification, and repeats until a full scan finds nothing new.
    /// Emptied constraints are dropped afterwards.
    ///
    /// Returns whether any cell was newly classified. On `Err` the cells
    /// classified before the failing one stay classified.
    pub fn propagate(&mut self) -> Result<bool, KnowledgeError> {
        let mut changed = false;

        loop {
            let mut hazards = BTreeSet::new();
            let mut safe = BTreeSet::new();
            for constraint in &self.constraints {
                hazards.extend(constraint.known_hazards());
                safe.extend(constraint.known_safe());
            }

            let new_safe: Vec<Point> = safe.difference(&self.known_safe).copied().collect();
            let new_hazards: Vec<Point> =
                hazards.difference(&self.known_hazard).copied().collect();
            if new_safe.is_empty() && new_hazards.is_empty() {
                break;
            }

            trace!(
                safe = new_safe.len(),
                hazards = new_hazards.len(),
                "propagating conclusions"
            );
            for cell in new_safe {
                self.mark_safe(cell)?;
            }
            for cell in new_hazards {
                self.mark_hazard(cell)?;
            }
            changed = true;
        }

        self.prune();
        Ok(changed)
    }

    /// Drops constraints with no cells left, and duplicates that classification
    /// has made equal. An emptied constraint always has a zero count:
    /// `apply_safe` refuses to strip the last cell of one that does not.
    fn prune(&mut self) {
        let mut seen = HashSet::new();
        self.constraints
            .retain(|c| !c.is_empty() && seen.insert(c.clone()));
    }

    /// One pass of subset-subtraction over every ordered pair of distinct
    /// constraints. Returns how many new constraints were added.
    pub fn infer_subsets(&mut self) -> Result<usize, KnowledgeError> {
        let existing: HashSet<&Constraint> = self.constraints.iter().collect();
        let mut fresh = HashSet::new();
        let mut derived = Vec::new();

        for pair in self.constraints.iter().permutations(2) {
            let (subset, superset) = (pair[0], pair[1]);
            if subset.is_empty() || !subset.is_subset(superset) {
                continue;
            }

            let candidate = superset.subtract(subset)?;
            if candidate.is_empty() || existing.contains(&candidate) {
                continue;
            }
            if fresh.insert(candidate.clone()) {
                trace!(%subset, %superset, %candidate, "subset inference");
                derived.push(candidate);
            }
        }

        let added = derived.len();
        if added > 0 {
            debug!(added, "synthesized constraints");
        }
        self.constraints.extend(derived);
        Ok(added)
    }
}
