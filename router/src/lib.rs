pub mod congestion;
pub mod error;
pub mod geometry;
pub mod layer_assign;
pub mod pipeline;
pub mod route;
pub mod steiner;
pub mod twopin;

pub use error::RoutingError;
pub use pipeline::{route, RoutingOutput, Segment3D};
