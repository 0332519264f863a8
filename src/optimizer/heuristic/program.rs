use std::env;

use derive_builder::Builder;
use strum_macros::{Display, EnumString};

use crate::optimizer::OptimizerError;

pub const DEFAULT_MAX_ITERATIONS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MatchOrder {
    /// Match from root down. A match attempt at an ancestor always precedes all match attempts at
    /// its descendants.
    TopDown,
    /// Match from leaves up. A match attempt at a descendant precedes all match attempts at its
    /// ancestors.
    BottomUp,
}

/// Controls the rule applying phase of [`HepOptimizer`](super::HepOptimizer).
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(build_fn(error = "OptimizerError"))]
pub struct PlannerConfig {
    /// Passes over all rules before giving up on reaching a fixed point.
    #[builder(default = "DEFAULT_MAX_ITERATIONS")]
    pub(crate) max_iterations: usize,
    #[builder(default = "MatchOrder::BottomUp")]
    pub(crate) match_order: MatchOrder,
}

impl From<derive_builder::UninitializedFieldError> for OptimizerError {
    fn from(e: derive_builder::UninitializedFieldError) -> Self {
        OptimizerError::InvalidConfig(e.to_string())
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            match_order: MatchOrder::BottomUp,
        }
    }
}

impl PlannerConfig {
    pub const MAX_ITERATIONS_VAR: &'static str = "RELOPT_MAX_ITERATIONS";
    pub const MATCH_ORDER_VAR: &'static str = "RELOPT_MATCH_ORDER";

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn match_order(&self) -> MatchOrder {
        self.match_order
    }

    /// Defaults, overridden by `RELOPT_MAX_ITERATIONS` and `RELOPT_MATCH_ORDER` when set.
    pub fn from_env() -> Result<Self, OptimizerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, OptimizerError> {
        let mut builder = PlannerConfigBuilder::default();
        if let Some(value) = lookup(Self::MAX_ITERATIONS_VAR) {
            let max_iterations = value.parse::<usize>().map_err(|e| {
                OptimizerError::InvalidConfig(format!("{}={}: {}", Self::MAX_ITERATIONS_VAR, value, e))
            })?;
            if max_iterations == 0 {
                return Err(OptimizerError::InvalidConfig(format!(
                    "{} must be positive",
                    Self::MAX_ITERATIONS_VAR
                )));
            }
            builder.max_iterations(max_iterations);
        }
        if let Some(value) = lookup(Self::MATCH_ORDER_VAR) {
            let match_order = value.parse::<MatchOrder>().map_err(|e| {
                OptimizerError::InvalidConfig(format!("{}={}: {}", Self::MATCH_ORDER_VAR, value, e))
            })?;
            builder.match_order(match_order);
        }
        builder.build()
    }
}
