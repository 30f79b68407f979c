pub mod indices;

pub use indices::{NetId, TwoPinId};
