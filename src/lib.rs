#[macro_use]
extern crate lazy_static;

pub mod catalog;
pub mod executor;
pub mod optimizer;
mod session;

pub use self::session::{RelOptError, Session};
