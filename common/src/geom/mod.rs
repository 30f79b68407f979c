pub mod coord;

pub use coord::{Coordinate2D, Coordinate3D, Direction, Orientation};
