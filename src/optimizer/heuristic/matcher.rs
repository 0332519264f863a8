use log::trace;

use super::graph::{PlanGraph, RelNodeId};
use crate::optimizer::core::{Pattern, PatternChildrenPredicate, PatternMatcher};

/// Use pattern to determines which rule can be applied
pub struct HepMatcher<'a, 'b> {
    pub pattern: &'a Pattern,
    pub start_id: RelNodeId,
    pub graph: &'b PlanGraph,
}

impl<'a, 'b> HepMatcher<'a, 'b> {
    pub fn new(pattern: &'a Pattern, start_id: RelNodeId, graph: &'b PlanGraph) -> Self {
        Self {
            pattern,
            start_id,
            graph,
        }
    }

    pub fn matches(&self) -> bool {
        self.match_nodes().is_some()
    }

    fn match_internal(
        &self,
        pattern: &Pattern,
        id: RelNodeId,
        bound: &mut Vec<RelNodeId>,
    ) -> bool {
        // check the root node predicate
        if !pattern.matches_node(self.graph.node(id)) {
            return false;
        }
        bound.push(id);
        // check the children's predicate
        match &pattern.children {
            PatternChildrenPredicate::None => true,
            PatternChildrenPredicate::Predicate(children_patterns) => {
                let children = self.graph.children_at(id);
                if children.len() < children_patterns.len() {
                    return false;
                }
                // the predicates order should match the graph nodes order, and if one of the
                // children doesn't match, the whole pattern doesn't match
                children_patterns
                    .iter()
                    .zip(children)
                    .all(|(child_pattern, child_id)| {
                        self.match_internal(child_pattern, child_id, bound)
                    })
            }
        }
    }
}

impl PatternMatcher for HepMatcher<'_, '_> {
    fn match_nodes(&self) -> Option<Vec<RelNodeId>> {
        if !self.graph.contains(self.start_id) {
            return None;
        }
        let mut bound = Vec::with_capacity(self.pattern.operand_count());
        if self.match_internal(self.pattern, self.start_id, &mut bound) {
            Some(bound)
        } else {
            trace!("Pattern not matched at node {}", self.start_id.index());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::heuristic::test_util::*;
    use crate::optimizer::{Convention, PlanNodeType};

    fn build_graph() -> PlanGraph {
        // graph:
        //  4 <---------Uncollect {
        //     3 <--------Filter {
        //       2 <----------Join {
        //          0 <-----------left: t1,
        //          1 <-----------right: t2
        //                    }
        //                }
        //              }
        PlanGraph::new(build_uncollect(build_filter(
            "t1.c2 > 1",
            build_join(build_table_scan("t1"), build_table_scan("t2")),
        )))
        .unwrap()
    }

    #[test]
    fn test_match_with_children_predicate() {
        let graph = build_graph();
        // pattern: Uncollect -> Filter -> Join -> (_, TableScan)
        let pattern = Pattern::node(PlanNodeType::Uncollect).with_children(vec![Pattern::node(
            PlanNodeType::Filter,
        )
        .with_children(vec![Pattern::node(PlanNodeType::Join)
            .with_children(vec![Pattern::any(), Pattern::node(PlanNodeType::TableScan)])])]);

        let m = HepMatcher::new(&pattern, graph.root(), &graph);
        let bound = m.match_nodes().unwrap();
        // pre-order: root first, then children left to right
        assert_eq!(
            bound,
            vec![
                RelNodeId::new(4),
                RelNodeId::new(3),
                RelNodeId::new(2),
                RelNodeId::new(0),
                RelNodeId::new(1)
            ]
        );
        assert_eq!(bound.len(), pattern.operand_count());
    }

    #[test]
    fn test_match_with_unmatched_children_predicate() {
        let graph = build_graph();
        // pattern: Uncollect -> Join, but the child is a Filter
        let pattern = Pattern::node(PlanNodeType::Uncollect)
            .with_children(vec![Pattern::node(PlanNodeType::Join)]);
        let m = HepMatcher::new(&pattern, graph.root(), &graph);
        assert!(m.match_nodes().is_none());
        // the graph is untouched by a failed match
        assert_eq!(graph.node_count(), 5);
    }

    #[test]
    fn test_match_with_children_predicate_none() {
        let graph = build_graph();
        let pattern = Pattern::node(PlanNodeType::Uncollect);
        let m = HepMatcher::new(&pattern, graph.root(), &graph);
        assert_eq!(m.match_nodes().unwrap(), vec![graph.root()]);

        // a pattern without child patterns also matches leaves
        let pattern = Pattern::node(PlanNodeType::TableScan);
        assert!(HepMatcher::new(&pattern, RelNodeId::new(0), &graph).matches());
    }

    #[test]
    fn test_match_more_child_patterns_than_children() {
        let graph = build_graph();
        let pattern = Pattern::node(PlanNodeType::Filter)
            .with_children(vec![Pattern::any(), Pattern::any()]);
        assert!(!HepMatcher::new(&pattern, RelNodeId::new(3), &graph).matches());
    }

    #[test]
    fn test_match_convention() {
        let graph = build_graph();
        let native = Pattern::any().in_convention(Convention::NATIVE);
        let logical = Pattern::any().in_convention(Convention::NONE);
        assert!(!HepMatcher::new(&native, graph.root(), &graph).matches());
        assert!(HepMatcher::new(&logical, graph.root(), &graph).matches());
    }
}
