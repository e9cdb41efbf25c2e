use crate::error::KnowledgeError;
use crate::point::Point;
use std::collections::BTreeSet;
use std::fmt;

/// A logical statement about the board: exactly `count` of `cells` are hazards.
///
/// The cells live in a `BTreeSet`, so equality and hashing depend only on which
/// cells are present, never on the order they were inserted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    cells: BTreeSet<Point>,
    count: usize,
}

impl Constraint {
    pub fn new(
        cells: impl IntoIterator<Item = Point>,
        count: usize,
    ) -> Result<Self, KnowledgeError> {
        let cells: BTreeSet<Point> = cells.into_iter().collect();
        if count > cells.len() {
            return Err(KnowledgeError::CountExceedsCells {
                count,
                cells: cells.len(),
            });
        }
        Ok(Constraint { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Point> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells that must all be hazards: only when every cell is accounted for.
    /// An empty constraint proves nothing.
    pub fn known_hazards(&self) -> BTreeSet<Point> {
        if !self.cells.is_empty() && self.count == self.cells.len() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Cells that must all be safe: only when no hazard is left among them.
    pub fn known_safe(&self) -> BTreeSet<Point> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Fails if `cell` is a member and the count is already zero.
    pub fn check_hazard(&self, cell: Point) -> Result<(), KnowledgeError> {
        if self.count == 0 && self.cells.contains(&cell) {
            return Err(KnowledgeError::NegativeCount { cell });
        }
        Ok(())
    }

    /// Fails if `cell` is a member and removing it would leave more hazards
    /// than cells.
    pub fn check_safe(&self, cell: Point) -> Result<(), KnowledgeError> {
        if !self.cells.contains(&cell) {
            return Ok(());
        }
        let remaining = self.cells.len() - 1;
        if remaining == 0 && self.count > 0 {
            return Err(KnowledgeError::ResidualCount { count: self.count });
        }
        if self.count > remaining {
            return Err(KnowledgeError::CountExceedsCells {
                count: self.count,
                cells: remaining,
            });
        }
        Ok(())
    }

    /// Removes a cell known to be a hazard, taking one off the count.
    ///
    /// Returns whether the cell was present. Leaves the constraint untouched
    /// and fails if the count is already zero.
    pub fn apply_hazard(&mut self, cell: Point) -> Result<bool, KnowledgeError> {
        self.check_hazard(cell)?;
        if !self.cells.remove(&cell) {
            return Ok(false);
        }
        self.count -= 1;
        Ok(true)
    }

    /// Removes a cell known to be safe. The count is unchanged.
    ///
    /// Returns whether the cell was present. Leaves the constraint untouched
    /// and fails if the remaining cells could not hold the count.
    pub fn apply_safe(&mut self, cell: Point) -> Result<bool, KnowledgeError> {
        self.check_safe(cell)?;
        Ok(self.cells.remove(&cell))
    }

    pub fn is_subset(&self, other: &Constraint) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// Subset-subtraction: if `subset.cells` is contained in `self.cells`, the
    /// remaining cells hold exactly `self.count - subset.count` hazards.
    ///
    /// Callers must check `subset.is_subset(self)` first.
    pub fn subtract(&self, subset: &Constraint) -> Result<Constraint, KnowledgeError> {
        debug_assert!(subset.is_subset(self));

        let count = self.count.checked_sub(subset.count).ok_or(
            KnowledgeError::NegativeDifference {
                subset: subset.count,
                superset: self.count,
            },
        )?;
        Constraint::new(self.cells.difference(&subset.cells).copied(), count)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cell}")?;
        }
        write!(f, "}} = {}", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn p(row: usize, col: usize) -> Point {
        Point::new(row, col)
    }

    fn hash_of(c: &Constraint) -> u64 {
        let mut hasher = DefaultHasher::new();
        c.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_rejects_more_hazards_than_cells() {
        let result = Constraint::new([p(0, 0)], 2);
        assert_eq!(
            result,
            Err(KnowledgeError::CountExceedsCells { count: 2, cells: 1 })
        );
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = Constraint::new([p(0, 0), p(0, 1), p(1, 0)], 1).unwrap();
        let b = Constraint::new([p(1, 0), p(0, 0), p(0, 1)], 1).unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let c = Constraint::new([p(1, 0), p(0, 0), p(0, 1)], 2).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_all_hazards_when_count_matches_size() {
        let c = Constraint::new([p(0, 0), p(0, 1)], 2).unwrap();
        assert_eq!(c.known_hazards(), BTreeSet::from([p(0, 0), p(0, 1)]));
        assert!(c.known_safe().is_empty());
    }

    #[test]
    fn test_all_safe_when_count_is_zero() {
        let c = Constraint::new([p(0, 0), p(0, 1)], 0).unwrap();
        assert_eq!(c.known_safe(), BTreeSet::from([p(0, 0), p(0, 1)]));
        assert!(c.known_hazards().is_empty());
    }

    #[test]
    fn test_empty_constraint_proves_no_hazards() {
        let c = Constraint::new(Vec::<Point>::new(), 0).unwrap();
        assert!(c.known_hazards().is_empty());
        assert!(c.known_safe().is_empty());
    }

    #[test]
    fn test_undetermined_constraint_proves_nothing() {
        let c = Constraint::new([p(0, 0), p(0, 1), p(1, 0), p(1, 1)], 2).unwrap();
        assert!(c.known_hazards().is_empty());
        assert!(c.known_safe().is_empty());
    }

    #[test]
    fn test_apply_hazard_decrements_count() {
        let mut c = Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 2).unwrap();
        assert_eq!(c.apply_hazard(p(0, 1)), Ok(true));
        assert_eq!(c.count(), 1);
        assert_eq!(c.cells(), &BTreeSet::from([p(0, 0), p(0, 2)]));

        // Absent cell is a no-op
        assert_eq!(c.apply_hazard(p(0, 1)), Ok(false));
        assert_eq!(c.count(), 1);
    }

    #[test]
    fn test_apply_hazard_refuses_negative_count() {
        let mut c = Constraint::new([p(0, 0), p(0, 1)], 0).unwrap();
        assert_eq!(
            c.apply_hazard(p(0, 0)),
            Err(KnowledgeError::NegativeCount { cell: p(0, 0) })
        );
        // Nothing was removed
        assert_eq!(c.cells().len(), 2);
    }

    #[test]
    fn test_apply_safe_keeps_count() {
        let mut c = Constraint::new([p(0, 0), p(0, 1)], 1).unwrap();
        assert_eq!(c.apply_safe(p(0, 0)), Ok(true));
        assert_eq!(c.apply_safe(p(0, 0)), Ok(false));
        assert_eq!(c.count(), 1);
        assert_eq!(c.known_hazards(), BTreeSet::from([p(0, 1)]));
    }

    #[test]
    fn test_apply_safe_refuses_overfull_count() {
        let mut c = Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 3).unwrap();
        assert_eq!(
            c.apply_safe(p(0, 1)),
            Err(KnowledgeError::CountExceedsCells { count: 3, cells: 2 })
        );
        // Nothing was removed
        assert_eq!(c.cells().len(), 3);

        let mut last = Constraint::new([p(0, 0)], 1).unwrap();
        assert_eq!(
            last.apply_safe(p(0, 0)),
            Err(KnowledgeError::ResidualCount { count: 1 })
        );
        assert!(!last.is_empty());
    }

    #[test]
    fn test_subtract_yields_difference() {
        let a = Constraint::new([p(0, 0), p(0, 1)], 1).unwrap();
        let b = Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 1).unwrap();
        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));

        let derived = b.subtract(&a).unwrap();
        assert_eq!(derived, Constraint::new([p(0, 2)], 0).unwrap());
        assert_eq!(derived.known_safe(), BTreeSet::from([p(0, 2)]));
    }

    #[test]
    fn test_subtract_negative_count_is_an_error() {
        let a = Constraint::new([p(0, 0), p(0, 1)], 2).unwrap();
        let b = Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 1).unwrap();
        assert_eq!(
            b.subtract(&a),
            Err(KnowledgeError::NegativeDifference {
                subset: 2,
                superset: 1
            })
        );
    }

    #[test]
    fn test_display_lists_cells_in_order() {
        let c = Constraint::new([p(1, 0), p(0, 2)], 1).unwrap();
        assert_eq!(c.to_string(), "{(0, 2), (1, 0)} = 1");
    }
}
