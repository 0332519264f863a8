use std::fmt::Write;
use std::sync::Arc;

use log::info;

use crate::catalog::{NoStatistics, StatisticsProvider};
use crate::executor::{try_collect, ExecutorError, TupleIter};
use crate::optimizer::{
    native_rules, ConversionEngine, Convention, ConverterImpl, HepOptimizer, OptExpr,
    OptimizerError, PlannerConfig, RuleImpl,
};

/// Ties the rule driver, the conversion engine and the statistics collaborator together.
pub struct Session {
    config: PlannerConfig,
    rules: Vec<RuleImpl>,
    engine: ConversionEngine,
    statistics: Arc<dyn StatisticsProvider>,
}

impl Session {
    pub fn new(config: PlannerConfig) -> Self {
        Session {
            config,
            rules: native_rules(),
            engine: ConversionEngine::default(),
            statistics: Arc::new(NoStatistics),
        }
    }

    pub fn with_statistics(mut self, statistics: Arc<dyn StatisticsProvider>) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_rules(mut self, rules: Vec<RuleImpl>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_converter(mut self, converter: impl Into<ConverterImpl>) -> Self {
        self.engine.register(converter.into());
        self
    }

    fn optimizer(&self, root: OptExpr) -> Result<HepOptimizer, OptimizerError> {
        HepOptimizer::new(
            self.config.clone(),
            self.rules.clone(),
            self.engine.clone(),
            self.statistics.clone(),
            root,
        )
    }

    /// Plan `root` into `convention` and explain the chosen plan.
    pub fn explain(&self, root: OptExpr, convention: Convention) -> Result<String, RelOptError> {
        let mut optimizer = self.optimizer(root)?;
        let mut explain_str = String::new();
        _ = write!(
            explain_str,
            "original plan:\n{}\n",
            optimizer.graph().explain(optimizer.graph().root())
        );
        let best = optimizer
            .find_best(convention)?
            .ok_or(RelOptError::NoPlan(convention))?;
        info!("Planned into {} with {} nodes", convention, optimizer.graph().node_count());
        _ = write!(
            explain_str,
            "optimized plan:\n{}",
            optimizer.graph().explain(best)
        );
        Ok(explain_str)
    }

    /// Drain `iter` and release it.
    pub fn run<I: TupleIter>(&self, iter: &mut I) -> Result<Vec<I::Tuple>, RelOptError> {
        let output = try_collect(iter);
        iter.close_allocation();
        Ok(output?)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RelOptError {
    #[error("optimizer error: {0}")]
    Optimizer(
        #[source]
        #[from]
        OptimizerError,
    ),
    #[error("executor error: {0}")]
    Executor(
        #[source]
        #[from]
        ExecutorError,
    ),
    #[error("no plan in convention {0}")]
    NoPlan(Convention),
}
