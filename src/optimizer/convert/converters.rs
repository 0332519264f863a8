use derive_new::new;
use enum_dispatch::enum_dispatch;
use log::trace;
use strum_macros::AsRefStr;

use super::ConversionRequest;
use crate::optimizer::core::{Convention, OptExpr};
use crate::optimizer::{Operator, PlanNodeType, RelNode, RelNodeId};

/// A converter changes the calling convention of a node, never its result.
#[enum_dispatch]
pub trait ConverterRule {
    fn source_convention(&self) -> Convention;

    fn target_convention(&self) -> Convention;

    /// Produce `expr` (whose root is `current`, an alternative of graph node `source`) in the
    /// target convention. `None` when this converter cannot handle the node.
    fn convert(
        &self,
        request: &mut ConversionRequest<'_>,
        source: RelNodeId,
        expr: &OptExpr,
        current: &RelNode,
    ) -> Option<OptExpr>;
}

#[enum_dispatch(ConverterRule)]
#[derive(Clone, Debug, AsRefStr)]
pub enum ConverterImpl {
    ImplementationConverter,
    AdapterConverter,
}

/// Re-implements nodes of the supported operator types in the target convention, after
/// converting each of their inputs to it.
#[derive(new, Clone, Debug)]
pub struct ImplementationConverter {
    from: Convention,
    to: Convention,
    operators: Vec<PlanNodeType>,
}

impl ConverterRule for ImplementationConverter {
    fn source_convention(&self) -> Convention {
        self.from
    }

    fn target_convention(&self) -> Convention {
        self.to
    }

    fn convert(
        &self,
        request: &mut ConversionRequest<'_>,
        source: RelNodeId,
        expr: &OptExpr,
        current: &RelNode,
    ) -> Option<OptExpr> {
        if !self.operators.contains(&current.node_type()) {
            return None;
        }
        // only graph nodes are re-implemented, their inputs are known
        let id = expr.existing_id()?;
        let graph = request.graph();
        let mut children = Vec::new();
        for child in graph.children_at(id) {
            let desired = graph.node(child).traits().with_convention(self.to);
            children.push(request.convert(child, &desired)?);
        }
        trace!("Implement node {} in {}", id.index(), self.to);
        let node = current.with_traits(current.traits().with_convention(self.to));
        Some(OptExpr::new(node, children).equivalent_to(source))
    }
}

/// Wraps a node into a [`Operator::Convert`] adapter.
#[derive(new, Clone, Debug)]
pub struct AdapterConverter {
    from: Convention,
    to: Convention,
}

impl ConverterRule for AdapterConverter {
    fn source_convention(&self) -> Convention {
        self.from
    }

    fn target_convention(&self) -> Convention {
        self.to
    }

    fn convert(
        &self,
        _request: &mut ConversionRequest<'_>,
        source: RelNodeId,
        expr: &OptExpr,
        current: &RelNode,
    ) -> Option<OptExpr> {
        let adapter = RelNode::new(
            Operator::Convert {
                from: self.from,
                to: self.to,
            },
            current.traits().with_convention(self.to),
        );
        Some(OptExpr::new(adapter, vec![expr.clone()]).equivalent_to(source))
    }
}
