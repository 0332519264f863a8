mod opt_expr;
mod pattern;
mod rule;
mod trait_set;

pub use opt_expr::*;
pub use pattern::*;
pub use rule::*;
pub use trait_set::*;
