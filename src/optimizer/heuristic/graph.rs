use ahash::AHashMap;
use itertools::Itertools;
use log::trace;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use super::MatchOrder;
use crate::optimizer::core::{OptExpr, OptExprNode, TraitSet};
use crate::optimizer::{OptimizerError, RelNode};

/// RelNodeId is used in optimizer to identify a node. Ids are stable: nodes are never removed.
pub type RelNodeId = NodeIndex<usize>;

/// Identifies a set of nodes known to produce the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EquivClassId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NodeKey {
    node: RelNode,
    children: Vec<RelNodeId>,
}

/// The planning cluster: an arena of immutable plan nodes plus their equivalence classes.
///
/// Structurally equal nodes (same operator, traits and children) are interned to one id, so
/// registering the same alternative twice changes nothing.
#[derive(Debug)]
pub struct PlanGraph {
    /// Edge weight is the ordinal of the child in its parent.
    graph: StableDiGraph<RelNode, usize, usize>,
    interned: AHashMap<NodeKey, RelNodeId>,
    node_class: AHashMap<RelNodeId, EquivClassId>,
    classes: Vec<Vec<RelNodeId>>,
    root: RelNodeId,
    /// Bumped on every node or class membership change.
    version: u64,
}

impl PlanGraph {
    pub fn new(root: OptExpr) -> Result<Self, OptimizerError> {
        let mut graph = Self {
            graph: StableDiGraph::<RelNode, usize, usize>::default(),
            interned: AHashMap::new(),
            node_class: AHashMap::new(),
            classes: vec![],
            root: RelNodeId::default(),
            version: 0,
        };
        graph.validate_opt_expr(&root)?;
        graph.root = graph.add_opt_expr(root, None)?;
        Ok(graph)
    }

    pub fn root(&self) -> RelNodeId {
        self.root
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn contains(&self, id: RelNodeId) -> bool {
        self.graph.contains_node(id)
    }

    pub fn node(&self, id: RelNodeId) -> &RelNode {
        &self.graph[id]
    }

    /// Children of a node, in input order.
    pub fn children_at(&self, id: RelNodeId) -> Vec<RelNodeId> {
        self.graph
            .edges_directed(id, Direction::Outgoing)
            .sorted_by_key(|edge| *edge.weight())
            .map(|edge| edge.target())
            .collect()
    }

    pub fn class_of(&self, id: RelNodeId) -> Option<EquivClassId> {
        self.node_class.get(&id).copied()
    }

    pub fn class_members(&self, class: EquivClassId) -> &[RelNodeId] {
        &self.classes[class.0]
    }

    /// All registered alternatives of `id`, `id` included, in registration order.
    pub fn equivalents(&self, id: RelNodeId) -> &[RelNodeId] {
        match self.class_of(id) {
            Some(class) => self.class_members(class),
            None => &[],
        }
    }

    /// First registered alternative of `id` whose traits satisfy `desired`.
    pub fn find_satisfying(&self, id: RelNodeId, desired: &TraitSet) -> Option<RelNodeId> {
        self.equivalents(id)
            .iter()
            .copied()
            .find(|member| self.node(*member).traits().satisfies(desired))
    }

    /// Node ids in match order. New nodes are always added after their children, so ascending
    /// ids visit descendants first.
    pub fn node_ids(&self, order: MatchOrder) -> Vec<RelNodeId> {
        let ids = self.graph.node_indices().collect::<Vec<_>>();
        match order {
            MatchOrder::BottomUp => ids,
            MatchOrder::TopDown => ids.into_iter().rev().collect(),
        }
    }

    /// Register `expr` as an alternative of the existing node `original`. The original stays in
    /// the class. Returns the id of the registered root.
    pub fn register_equivalent(
        &mut self,
        original: RelNodeId,
        expr: OptExpr,
    ) -> Result<RelNodeId, OptimizerError> {
        let class = self.class_of_checked(original)?;
        self.validate_opt_expr(&expr)?;
        self.add_opt_expr(expr, Some(class))
    }

    /// Check the whole expression before anything is added, so a rejected expression leaves the
    /// graph untouched.
    fn validate_opt_expr(&self, opt_expr: &OptExpr) -> Result<(), OptimizerError> {
        match &opt_expr.root {
            OptExprNode::Existing(id) => {
                if !self.contains(*id) {
                    return Err(OptimizerError::UnknownNode(id.index()));
                }
            }
            OptExprNode::New { node, equivalent } => {
                let node_type = node.node_type();
                if opt_expr.children.len() != node_type.arity() {
                    return Err(OptimizerError::InvalidArity {
                        operand: node_type.to_string(),
                        expected: node_type.arity(),
                        actual: opt_expr.children.len(),
                    });
                }
                if let Some(equivalent) = equivalent {
                    self.class_of_checked(*equivalent)?;
                }
            }
        }
        opt_expr
            .children
            .iter()
            .try_for_each(|child| self.validate_opt_expr(child))
    }

    /// DFS visitor to add an optimizer expression in graph. Children are added before their
    /// parent so the parent can be interned on its children ids.
    fn add_opt_expr(
        &mut self,
        opt_expr: OptExpr,
        class: Option<EquivClassId>,
    ) -> Result<RelNodeId, OptimizerError> {
        let OptExpr { root, children } = opt_expr;
        match root {
            // the optimizer expression points at an existing graph node, so just return its id.
            OptExprNode::Existing(id) => {
                if !self.contains(id) {
                    return Err(OptimizerError::UnknownNode(id.index()));
                }
                if let Some(class) = class {
                    self.merge_into_class(id, class);
                }
                Ok(id)
            }
            OptExprNode::New { node, equivalent } => {
                let children_ids = children
                    .into_iter()
                    .map(|child| self.add_opt_expr(child, None))
                    .collect::<Result<Vec<_>, _>>()?;
                let target = match (class, equivalent) {
                    (Some(class), _) => Some(class),
                    (None, Some(equivalent)) => Some(self.class_of_checked(equivalent)?),
                    (None, None) => None,
                };
                let id = self.intern(node, children_ids);
                match target {
                    Some(class) => self.merge_into_class(id, class),
                    None if self.class_of(id).is_none() => self.new_class(id),
                    None => {}
                }
                Ok(id)
            }
        }
    }

    fn intern(&mut self, node: RelNode, children: Vec<RelNodeId>) -> RelNodeId {
        let key = NodeKey { node, children };
        if let Some(id) = self.interned.get(&key) {
            return *id;
        }
        let id = self.graph.add_node(key.node.clone());
        for (ordinal, child) in key.children.iter().enumerate() {
            self.graph.add_edge(id, *child, ordinal);
        }
        trace!("Add node {}: {}", id.index(), key.node);
        self.interned.insert(key, id);
        self.version += 1;
        id
    }

    fn new_class(&mut self, id: RelNodeId) {
        let class = EquivClassId(self.classes.len());
        self.classes.push(vec![id]);
        self.node_class.insert(id, class);
        self.version += 1;
    }

    fn merge_into_class(&mut self, id: RelNodeId, class: EquivClassId) {
        match self.class_of(id) {
            Some(current) if current == class => {}
            Some(current) => {
                // both classes are now known to be equivalent, fold the node's class into `class`
                let members = std::mem::take(&mut self.classes[current.0]);
                for member in members {
                    self.node_class.insert(member, class);
                    self.classes[class.0].push(member);
                }
                trace!("Merge class {:?} into {:?}", current, class);
                self.version += 1;
            }
            None => {
                self.node_class.insert(id, class);
                self.classes[class.0].push(id);
                self.version += 1;
            }
        }
    }

    fn class_of_checked(&self, id: RelNodeId) -> Result<EquivClassId, OptimizerError> {
        self.class_of(id)
            .ok_or(OptimizerError::UnknownNode(id.index()))
    }

    /// Render the sub-plan under `id`, one node per line.
    pub fn explain(&self, id: RelNodeId) -> String {
        let mut explain_result = String::new();
        self.explain_internal(id, 0, &mut explain_result);
        explain_result
    }

    fn explain_internal(&self, id: RelNodeId, level: usize, explain_result: &mut String) {
        explain_result.push_str(&format!("{}{}\n", "  ".repeat(level), self.node(id)));
        for child in self.children_at(id) {
            self.explain_internal(child, level + 1, explain_result);
        }
    }
}


#[cfg(test)]
mod tests {
    use petgraph::algo::is_cyclic_directed;
    use pretty_assertions::assert_eq;

    use super::test_util::*;
    use super::*;
    use crate::optimizer::{Convention, Operator, PlanNodeType, RelNode};

    fn build_graph() -> PlanGraph {
        // 3 <--------Uncollect {
        //   2 <----------Join {
        //      0 <-----------left: t1,
        //      1 <-----------right: t2
        //                }
        //            }
        PlanGraph::new(build_uncollect(build_join(
            build_table_scan("t1"),
            build_table_scan("t2"),
        )))
        .unwrap()
    }

    #[test]
    fn test_graph_add_opt_expr() {
        let graph = build_graph();
        assert_eq!(graph.root(), RelNodeId::new(3));
        assert_eq!(graph.node_count(), 4);
        assert_eq!(
            graph.children_at(RelNodeId::new(2)),
            vec![RelNodeId::new(0), RelNodeId::new(1)]
        );
        assert_eq!(graph.children_at(RelNodeId::new(3)), vec![RelNodeId::new(2)]);
        assert_eq!(graph.node(RelNodeId::new(2)).node_type(), PlanNodeType::Join);
        // every node starts alone in its class
        assert_eq!(graph.equivalents(RelNodeId::new(2)), &[RelNodeId::new(2)]);
    }

    #[test]
    fn test_graph_interns_equal_subtrees() {
        // both join inputs scan t1, so they share one node
        let graph = PlanGraph::new(build_join(
            build_table_scan("t1"),
            build_table_scan("t1"),
        ))
        .unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(
            graph.children_at(graph.root()),
            vec![RelNodeId::new(0), RelNodeId::new(0)]
        );
    }

    #[test]
    fn test_graph_nodes_iter() {
        let graph = build_graph();
        let bottom_up = graph.node_ids(MatchOrder::BottomUp);
        assert_eq!(
            bottom_up,
            vec![
                RelNodeId::new(0),
                RelNodeId::new(1),
                RelNodeId::new(2),
                RelNodeId::new(3)
            ]
        );
        let top_down = graph.node_ids(MatchOrder::TopDown);
        assert_eq!(top_down[0], graph.root());
    }

    #[test]
    fn test_graph_register_equivalent_is_idempotent() {
        let mut graph = build_graph();
        let scan = RelNodeId::new(0);
        let native = graph.node(scan).with_traits(TraitSet::new(Convention::NATIVE));

        let first = graph
            .register_equivalent(scan, OptExpr::new(native.clone(), vec![]))
            .unwrap();
        let version = graph.version();
        let second = graph
            .register_equivalent(scan, OptExpr::new(native, vec![]))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(graph.version(), version);
        assert_eq!(graph.equivalents(scan), &[scan, first]);
        assert_eq!(
            graph.find_satisfying(scan, &TraitSet::new(Convention::NATIVE)),
            Some(first)
        );
        assert!(!is_cyclic_directed(&graph.graph));
    }

    #[test]
    fn test_graph_register_existing_merges_classes() {
        let mut graph = build_graph();
        let (t1, t2) = (RelNodeId::new(0), RelNodeId::new(1));
        graph.register_equivalent(t1, OptExpr::existing(t2)).unwrap();
        assert_eq!(graph.class_of(t1), graph.class_of(t2));
        assert_eq!(graph.equivalents(t2), &[t1, t2]);
    }

    #[test]
    fn test_graph_register_unknown_node() {
        let mut graph = build_graph();
        let result = graph.register_equivalent(RelNodeId::new(42), build_table_scan("t3"));
        assert_eq!(result, Err(OptimizerError::UnknownNode(42)));
        let result = graph.register_equivalent(RelNodeId::new(0), OptExpr::existing(RelNodeId::new(42)));
        assert_eq!(result, Err(OptimizerError::UnknownNode(42)));

        // the new left input must not be added when the right one is unknown
        let node_count = graph.node_count();
        let version = graph.version();
        let join = build_join(build_table_scan("t9"), OptExpr::existing(RelNodeId::new(42)));
        let result = graph.register_equivalent(RelNodeId::new(2), join);
        assert_eq!(result, Err(OptimizerError::UnknownNode(42)));
        assert_eq!(graph.node_count(), node_count);
        assert_eq!(graph.version(), version);
    }

    #[test]
    fn test_graph_rejects_wrong_arity() {
        let uncollect = OptExpr::new(RelNode::logical(Operator::Uncollect), vec![]);
        assert_eq!(
            PlanGraph::new(uncollect).unwrap_err(),
            OptimizerError::InvalidArity {
                operand: "Uncollect".to_string(),
                expected: 1,
                actual: 0,
            }
        );

        let mut graph = build_graph();
        let node_count = graph.node_count();
        let filter = OptExpr::new(
            RelNode::logical(Operator::Filter {
                predicate: "c1 > 1".to_string(),
            }),
            vec![build_table_scan("t1"), build_table_scan("t5")],
        );
        assert!(matches!(
            graph.register_equivalent(RelNodeId::new(0), filter),
            Err(OptimizerError::InvalidArity { expected: 1, actual: 2, .. })
        ));
        assert_eq!(graph.node_count(), node_count);
    }

    #[test]
    fn test_graph_explain() {
        let graph = build_graph();
        assert_eq!(
            graph.explain(graph.root()),
            "Uncollect [NONE]\n  Join: Inner on t1.c1 = t2.c1 [NONE]\n    TableScan: t1 [NONE]\n    TableScan: t2 [NONE]\n"
        );
        assert!(matches!(
            graph.node(RelNodeId::new(0)).op(),
            Operator::TableScan { .. }
        ));
    }
}
