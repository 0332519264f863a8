use std::sync::Arc;

use log::{debug, info};

use super::graph::{PlanGraph, RelNodeId};
use super::matcher::HepMatcher;
use super::program::PlannerConfig;
use crate::catalog::StatisticsProvider;
use crate::optimizer::core::{OptExpr, PatternMatcher, Rule, RuleCall, TraitSet};
use crate::optimizer::rules::RuleImpl;
use crate::optimizer::{ConversionEngine, Convention, OptimizerError};

/// Fires rules over every node of the graph until no rule registers anything new, or the
/// configured number of iterations is reached. It makes no cost decisions: extracting a plan
/// picks the first registered alternative in the wanted convention.
pub struct HepOptimizer {
    config: PlannerConfig,
    rules: Vec<RuleImpl>,
    engine: ConversionEngine,
    statistics: Arc<dyn StatisticsProvider>,
    graph: PlanGraph,
}

impl HepOptimizer {
    pub fn new(
        config: PlannerConfig,
        rules: Vec<RuleImpl>,
        engine: ConversionEngine,
        statistics: Arc<dyn StatisticsProvider>,
        root: OptExpr,
    ) -> Result<Self, OptimizerError> {
        for rule in rules.iter() {
            rule.pattern().validate(&format!("{:?}", rule))?;
        }
        let graph = PlanGraph::new(root)?;
        Ok(Self {
            config,
            rules,
            engine,
            statistics,
            graph,
        })
    }

    pub fn graph(&self) -> &PlanGraph {
        &self.graph
    }

    /// Run until fixed point. Returns the number of iterations.
    pub fn run(&mut self) -> Result<usize, OptimizerError> {
        let mut iteration = 1_usize;
        loop {
            debug!("Start iteration: {}", iteration);
            // fixed_point means no rule registered a new node or alternative.
            let fixed_point = !self.apply_rules()?;
            if fixed_point {
                info!("Fixed point reached after {} iterations", iteration);
                return Ok(iteration);
            }
            // max_iteration check priority is higher than fixed_point.
            if iteration >= self.config.max_iterations() {
                info!("Max iteration {} reached", iteration);
                return Ok(iteration);
            }
            iteration += 1;
        }
    }

    /// Run, then pick the root's first alternative in `convention`.
    pub fn find_best(&mut self, convention: Convention) -> Result<Option<RelNodeId>, OptimizerError> {
        self.run()?;
        Ok(self
            .graph
            .find_satisfying(self.graph.root(), &TraitSet::new(convention)))
    }

    /// Return true if any rule changed the graph.
    fn apply_rules(&mut self) -> Result<bool, OptimizerError> {
        let mut changed = false;
        // for each rule will apply each node in graph.
        let rules = self.rules.clone();
        for rule in rules.iter() {
            for node_id in self.graph.node_ids(self.config.match_order()) {
                changed |= self.apply_rule(rule, node_id)?;
            }
        }
        Ok(changed)
    }

    /// return true if the rule is applied which means the rule matched and the graph changed.
    fn apply_rule(&mut self, rule: &RuleImpl, node_id: RelNodeId) -> Result<bool, OptimizerError> {
        let result = {
            let matcher = HepMatcher::new(rule.pattern(), node_id, &self.graph);
            let rels = match matcher.match_nodes() {
                Some(rels) => rels,
                None => return Ok(false),
            };
            let mut call =
                RuleCall::new(&self.graph, &self.engine, self.statistics.as_ref(), rels);
            rule.on_match(&mut call)?;
            call.into_result()
        };

        let opt_expr = match result {
            Some(opt_expr) => opt_expr,
            None => {
                debug!("Skip {:?} at node {}", rule, node_id.index());
                return Ok(false);
            }
        };
        let version = self.graph.version();
        let new_id = self.graph.register_equivalent(node_id, opt_expr)?;
        let changed = self.graph.version() != version;
        if changed {
            debug!(
                "Apply {:?} at node {}, registered:\n{}",
                rule,
                node_id.index(),
                self.graph.explain(new_id)
            );
        }
        Ok(changed)
    }
}
