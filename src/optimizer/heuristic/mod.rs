mod graph;
mod matcher;
mod optimizer;
mod program;

pub use graph::*;
pub use matcher::*;
pub use optimizer::*;
pub use program::*;

#[cfg(test)]
pub(crate) use graph::test_util;
