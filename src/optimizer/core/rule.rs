use enum_dispatch::enum_dispatch;

use super::{Convention, OptExpr, Pattern, TraitSet};
use crate::catalog::StatisticsProvider;
use crate::optimizer::{ConversionEngine, OptimizerError, PlanGraph, RelNode, RelNodeId};

/// A rule implements a matched logical node in a target calling convention.
///
/// Rules are immutable: everything a firing needs comes through the [`RuleCall`].
#[enum_dispatch]
pub trait Rule {
    /// The pattern to determine whether the rule can be applied.
    fn pattern(&self) -> &Pattern;

    /// The calling convention of the nodes this rule produces.
    fn out_convention(&self) -> Convention;

    /// Transform the matched nodes. Returning `Ok(())` without calling
    /// [`RuleCall::transform_to`] means the rule abstains.
    fn on_match(&self, call: &mut RuleCall<'_>) -> Result<(), OptimizerError>;
}

/// The context of one rule firing. It is created by the planner for a single match and dropped
/// after the rule returns; the planner then registers the transformed expression, if any.
pub struct RuleCall<'a> {
    graph: &'a PlanGraph,
    engine: &'a ConversionEngine,
    statistics: &'a dyn StatisticsProvider,
    /// Matched nodes in pattern pre-order.
    rels: Vec<RelNodeId>,
    result: Option<OptExpr>,
}

impl<'a> RuleCall<'a> {
    pub fn new(
        graph: &'a PlanGraph,
        engine: &'a ConversionEngine,
        statistics: &'a dyn StatisticsProvider,
        rels: Vec<RelNodeId>,
    ) -> Self {
        Self {
            graph,
            engine,
            statistics,
            rels,
            result: None,
        }
    }

    pub fn rels(&self) -> &[RelNodeId] {
        &self.rels
    }

    /// The node bound at `ordinal` in pattern pre-order.
    pub fn rel(&self, ordinal: usize) -> Result<RelNodeId, OptimizerError> {
        self.rels
            .get(ordinal)
            .copied()
            .ok_or(OptimizerError::MatchedNodeOutOfRange {
                ordinal,
                bound: self.rels.len(),
            })
    }

    pub fn node(&self, id: RelNodeId) -> &'a RelNode {
        self.graph.node(id)
    }

    pub fn inputs(&self, id: RelNodeId) -> Vec<RelNodeId> {
        self.graph.children_at(id)
    }

    pub fn graph(&self) -> &'a PlanGraph {
        self.graph
    }

    pub fn statistics(&self) -> &'a dyn StatisticsProvider {
        self.statistics
    }

    /// Ask the conversion engine for `input` in `desired` traits. `None` is an abstention.
    pub fn convert(&self, input: RelNodeId, desired: &TraitSet) -> Option<OptExpr> {
        self.engine.convert(self.graph, input, desired)
    }

    /// Convert `input` to `traits` with their convention replaced by `convention`.
    pub fn merge_traits_and_convert(
        &self,
        traits: &TraitSet,
        convention: Convention,
        input: RelNodeId,
    ) -> Option<OptExpr> {
        self.convert(input, &traits.with_convention(convention))
    }

    /// Record `expr` as equivalent to the matched root.
    pub fn transform_to(&mut self, expr: OptExpr) -> Result<(), OptimizerError> {
        if self.result.is_some() {
            return Err(OptimizerError::AlreadyTransformed);
        }
        self.result = Some(expr);
        Ok(())
    }

    pub fn into_result(self) -> Option<OptExpr> {
        self.result
    }
}
