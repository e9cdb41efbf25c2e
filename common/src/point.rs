use std::fmt;

/// Represents a 2D coordinate on the board.
///
/// Ordering is row-major, which gives every set of points a canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }

    /// All valid neighbor coordinates on a `width` x `height` board.
    /// Board edges and corners yield fewer than 8 neighbors.
    pub fn neighbors(self, width: usize, height: usize) -> impl Iterator<Item = Point> {
        (-1isize..=1).flat_map(move |dr| {
            (-1isize..=1).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }

                let row = self.row as isize + dr;
                let col = self.col as isize + dc;

                if row >= 0 && row < height as isize && col >= 0 && col < width as isize {
                    Some(Point::new(row as usize, col as usize))
                } else {
                    None
                }
            })
        })
    }

    /// Every point on a `width` x `height` board, row by row.
    pub fn all(width: usize, height: usize) -> impl Iterator<Item = Point> {
        (0..height).flat_map(move |row| (0..width).map(move |col| Point::new(row, col)))
    }

    pub fn in_bounds(self, width: usize, height: usize) -> bool {
        self.row < height && self.col < width
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_clipped_at_edges() {
        // Corner, edge and interior cells of a 3x3 board
        assert_eq!(Point::new(0, 0).neighbors(3, 3).count(), 3);
        assert_eq!(Point::new(0, 1).neighbors(3, 3).count(), 5);
        assert_eq!(Point::new(1, 1).neighbors(3, 3).count(), 8);
    }

    #[test]
    fn test_neighbors_respect_rectangular_bounds() {
        // 4 columns, 2 rows: row 1 is the last row
        let neighbors: Vec<Point> = Point::new(1, 3).neighbors(4, 2).collect();
        assert_eq!(
            neighbors,
            vec![Point::new(0, 2), Point::new(0, 3), Point::new(1, 2)]
        );
    }

    #[test]
    fn test_all_is_row_major() {
        let cells: Vec<Point> = Point::all(2, 2).collect();
        assert_eq!(
            cells,
            vec![
                Point::new(0, 0),
                Point::new(0, 1),
                Point::new(1, 0),
                Point::new(1, 1)
            ]
        );
    }
}
