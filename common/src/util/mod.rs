pub mod config;
pub mod generator;
pub mod profiler;

pub use config::RoutingParams;
pub use profiler::ScopedTimer;
