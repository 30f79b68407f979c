use std::fmt;

/// A tile on the 2-D routing grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate2D {
    pub x: i32,
    pub y: i32,
}

impl Coordinate2D {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Coordinate2D) -> i64 {
        (self.x as i64 - other.x as i64).abs() + (self.y as i64 - other.y as i64).abs()
    }

    pub fn with_z(self, z: i32) -> Coordinate3D {
        Coordinate3D::new(self.x, self.y, z)
    }

    /// The neighbor reached by stepping one unit in `dir`, if that neighbor
    /// would not leave the non-negative quadrant (the grid's own bounds are
    /// checked by the caller, which knows `width`/`height`).
    pub fn step(self, dir: Direction) -> Option<Coordinate2D> {
        match dir {
            Direction::East => Some(Coordinate2D::new(self.x + 1, self.y)),
            Direction::West => {
                if self.x == 0 {
                    None
                } else {
                    Some(Coordinate2D::new(self.x - 1, self.y))
                }
            }
            Direction::North => Some(Coordinate2D::new(self.x, self.y + 1)),
            Direction::South => {
                if self.y == 0 {
                    None
                } else {
                    Some(Coordinate2D::new(self.x, self.y - 1))
                }
            }
        }
    }
}

impl fmt::Display for Coordinate2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A tile on a specific metal layer (`z`, 0-indexed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coordinate3D {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn xy(self) -> Coordinate2D {
        Coordinate2D::new(self.x, self.y)
    }
}

impl fmt::Display for Coordinate3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// The four 2-D grid directions. Closed set by design: every match on
/// `Direction` in this workspace is exhaustive, so an unreachable direction
/// is a compile error rather than the original source's runtime throw on
/// `DIR_UP`/`DIR_DOWN` (spec.md Design Notes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    West,
    North,
    South,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::North,
        Direction::South,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }
}

/// Alias used when iterating neighbors in the original JR convention
/// (`FRONT=North, BACK=South, LEFT=East, RIGHT=West`). Kept only as a
/// translation table into `Direction` so cost lookups stay symmetric
/// regardless of which convention a caller iterates in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Front,
    Back,
    Left,
    Right,
}

impl Orientation {
    pub fn to_direction(self) -> Direction {
        match self {
            Orientation::Front => Direction::North,
            Orientation::Back => Direction::South,
            Orientation::Left => Direction::East,
            Orientation::Right => Direction::West,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_west_at_zero_is_none() {
        let c = Coordinate2D::new(0, 5);
        assert_eq!(c.step(Direction::West), None);
    }

    #[test]
    fn step_south_at_zero_is_none() {
        let c = Coordinate2D::new(5, 0);
        assert_eq!(c.step(Direction::South), None);
    }

    #[test]
    fn orientation_matches_spec_alias() {
        assert_eq!(Orientation::Front.to_direction(), Direction::North);
        assert_eq!(Orientation::Back.to_direction(), Direction::South);
        assert_eq!(Orientation::Left.to_direction(), Direction::East);
        assert_eq!(Orientation::Right.to_direction(), Direction::West);
    }

    #[test]
    fn manhattan_distance() {
        let a = Coordinate2D::new(0, 0);
        let b = Coordinate2D::new(3, 4);
        assert_eq!(a.manhattan(b), 7);
    }
}
