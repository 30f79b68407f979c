pub mod cost_model;
pub mod map;

pub use cost_model::{CostModel, FastRouteCost, HistoryCost};
pub use map::{CongestionEdge2D, CongestionMap2D};
