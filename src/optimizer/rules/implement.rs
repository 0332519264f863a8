use super::RuleImpl;
use crate::optimizer::core::*;
use crate::optimizer::{OptimizerError, PlanNodeType};

/// Implements one operator type in the native convention once all of its inputs can be
/// converted to it. The operator and its parameters are kept as they are.
#[derive(Clone)]
pub struct NativeImplementRule {
    pattern: Pattern,
}

impl NativeImplementRule {
    pub fn create(node_type: PlanNodeType) -> RuleImpl {
        Self {
            pattern: Pattern::node(node_type).in_convention(Convention::NONE),
        }
        .into()
    }

    pub fn node_type(&self) -> PlanNodeType {
        match self.pattern.operand {
            Operand::Node(node_type) => node_type,
            Operand::Any => unreachable!("implement rule created without a node type"),
        }
    }
}

impl Rule for NativeImplementRule {
    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn out_convention(&self) -> Convention {
        Convention::NATIVE
    }

    fn on_match(&self, call: &mut RuleCall<'_>) -> Result<(), OptimizerError> {
        let root_id = call.rel(0)?;
        let root = call.node(root_id);
        let converted = call
            .inputs(root_id)
            .into_iter()
            .map(|input| {
                call.merge_traits_and_convert(
                    call.node(input).traits(),
                    self.out_convention(),
                    input,
                )
            })
            .collect::<Option<Vec<_>>>();
        // one input without a native form is enough to abstain
        let children = match converted {
            Some(children) => children,
            None => return Ok(()),
        };

        let native = root.with_traits(root.traits().with_convention(self.out_convention()));
        call.transform_to(OptExpr::new(native, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NoStatistics;
    use crate::optimizer::heuristic::test_util::*;
    use crate::optimizer::rules::test_util::fire;
    use crate::optimizer::{ConversionEngine, PlanGraph, RelNode, RelNodeId};

    #[test]
    fn test_join_rule_abstains_when_one_side_is_missing() {
        let mut graph =
            PlanGraph::new(build_join(build_table_scan("t1"), build_table_scan("t2"))).unwrap();
        let rule = NativeImplementRule::create(PlanNodeType::Join);
        let engine = ConversionEngine::default();

        // only the left side has a native alternative
        let left = RelNodeId::new(0);
        let native_left = RelNode::new(
            graph.node(left).op().clone(),
            TraitSet::new(Convention::NATIVE),
        );
        graph
            .register_equivalent(left, OptExpr::new(native_left, vec![]))
            .unwrap();
        let before = graph.node_count();
        assert!(fire(&rule, &graph, &engine, &NoStatistics, graph.root())
            .unwrap()
            .is_none());
        assert_eq!(graph.node_count(), before);

        // once the right side has one too, the join is implemented on top of both
        let right = RelNodeId::new(1);
        let native_right = RelNode::new(
            graph.node(right).op().clone(),
            TraitSet::new(Convention::NATIVE),
        );
        let native_right = graph
            .register_equivalent(right, OptExpr::new(native_right, vec![]))
            .unwrap();
        let expr = fire(&rule, &graph, &engine, &NoStatistics, graph.root())
            .unwrap()
            .unwrap();
        assert_eq!(expr.root_node(&graph).node_type(), PlanNodeType::Join);
        assert_eq!(expr.children[1], OptExpr::existing(native_right));
    }
}
