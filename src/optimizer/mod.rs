mod convert;
mod core;
mod errors;
mod heuristic;
mod plan_node;
mod rules;

pub use self::convert::*;
pub use self::core::*;
pub use self::errors::*;
pub use self::heuristic::*;
pub use self::plan_node::*;
pub use self::rules::*;
