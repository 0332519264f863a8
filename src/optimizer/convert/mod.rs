mod converters;

use ahash::AHashSet;
pub use converters::*;
use log::{debug, trace, warn};

use crate::optimizer::core::{Convention, OptExpr, TraitSet};
use crate::optimizer::{PlanGraph, RelNode, RelNodeId};

/// Brings nodes to a desired trait set through the registered converters.
#[derive(Clone, Debug, Default)]
pub struct ConversionEngine {
    converters: Vec<ConverterImpl>,
}

impl ConversionEngine {
    pub fn new(converters: Vec<ConverterImpl>) -> Self {
        Self { converters }
    }

    pub fn register(&mut self, converter: ConverterImpl) {
        self.converters.push(converter);
    }

    pub fn with_converter(mut self, converter: impl Into<ConverterImpl>) -> Self {
        self.register(converter.into());
        self
    }

    pub fn converters(&self) -> &[ConverterImpl] {
        &self.converters
    }

    /// Return `node`, or an expression equivalent to it, whose traits satisfy `desired`.
    ///
    /// `None` means no conversion path exists yet. That is an answer, not a failure: callers
    /// abstain instead of reporting an error. Nothing is added to `graph`.
    pub fn convert(
        &self,
        graph: &PlanGraph,
        node: RelNodeId,
        desired: &TraitSet,
    ) -> Option<OptExpr> {
        let result = ConversionRequest::new(self, graph).convert(node, desired);
        if result.is_none() {
            debug!(
                "No conversion of node {} ({}) to {}",
                node.index(),
                graph.node(node),
                desired
            );
        }
        result
    }
}

/// State of one top-level conversion. Remembers which (node, convention) states the current
/// conversion path went through, so converter chains that loop back are cut off.
pub struct ConversionRequest<'a> {
    engine: &'a ConversionEngine,
    graph: &'a PlanGraph,
    in_progress: AHashSet<(RelNodeId, Convention)>,
}

impl<'a> ConversionRequest<'a> {
    fn new(engine: &'a ConversionEngine, graph: &'a PlanGraph) -> Self {
        Self {
            engine,
            graph,
            in_progress: AHashSet::new(),
        }
    }

    pub fn graph(&self) -> &'a PlanGraph {
        self.graph
    }

    /// Convert a graph node. Converters call this for the inputs they need converted first.
    pub fn convert(&mut self, node: RelNodeId, desired: &TraitSet) -> Option<OptExpr> {
        let graph = self.graph;
        let current = graph.node(node);
        if current.traits().satisfies(desired) {
            return Some(OptExpr::existing(node));
        }
        if let Some(member) = graph.find_satisfying(node, desired) {
            trace!(
                "Node {} already has alternative {} in {}",
                node.index(),
                member.index(),
                desired
            );
            return Some(OptExpr::existing(member));
        }
        self.convert_expr(node, OptExpr::existing(node), current, desired)
    }

    fn convert_expr(
        &mut self,
        source: RelNodeId,
        expr: OptExpr,
        current: &RelNode,
        desired: &TraitSet,
    ) -> Option<OptExpr> {
        if current.traits().satisfies(desired) {
            return Some(expr);
        }
        let state = (source, current.convention());
        if !self.in_progress.insert(state) {
            warn!(
                "Rejected cyclic conversion of node {} back to {}",
                source.index(),
                state.1
            );
            return None;
        }

        let engine = self.engine;
        let mut result = None;
        for converter in engine
            .converters
            .iter()
            .filter(|converter| converter.source_convention() == state.1)
        {
            let next = match converter.convert(self, source, &expr, current) {
                Some(next) => next,
                None => continue,
            };
            let next_node = next.root_node(self.graph).clone();
            if let Some(converted) = self.convert_expr(source, next, &next_node, desired) {
                trace!(
                    "Converted node {} from {} to {} with {}",
                    source.index(),
                    converter.source_convention(),
                    converter.target_convention(),
                    converter.as_ref()
                );
                result = Some(converted);
                break;
            }
        }

        self.in_progress.remove(&state);
        result
    }
}
