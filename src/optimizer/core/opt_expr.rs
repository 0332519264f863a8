use std::fmt::Debug;

use crate::optimizer::{PlanGraph, RelNode, RelNodeId};

#[derive(Clone, PartialEq, Eq)]
pub enum OptExprNode {
    /// New node, not yet added to the graph. `equivalent` names the graph node whose
    /// equivalence class it joins when registered.
    New {
        node: RelNode,
        equivalent: Option<RelNodeId>,
    },
    /// Existing node in graph.
    Existing(RelNodeId),
}

impl Debug for OptExprNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New { node, equivalent } => match equivalent {
                Some(id) => write!(f, "New({} ~ {})", node, id.index()),
                None => write!(f, "New({})", node),
            },
            Self::Existing(id) => write!(f, "Existing({})", id.index()),
        }
    }
}

/// A sub-plan-tree that is not part of the graph yet. Every root node could be new node or
/// existing graph node. New nodes are interned into the graph on registration, existing nodes
/// are reconnected as they are.
///
/// Rules and converters build `OptExpr`s instead of touching the graph, so a rule that abstains
/// half way leaves no trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptExpr {
    /// The root of the tree.
    pub root: OptExprNode,
    /// The root's children expressions. Always empty for an existing root.
    pub children: Vec<OptExpr>,
}

impl OptExpr {
    pub fn new(node: RelNode, children: Vec<OptExpr>) -> Self {
        Self {
            root: OptExprNode::New {
                node,
                equivalent: None,
            },
            children,
        }
    }

    pub fn existing(id: RelNodeId) -> Self {
        Self {
            root: OptExprNode::Existing(id),
            children: vec![],
        }
    }

    /// Mark a new root as an alternative of `id`. No effect on an existing root.
    pub fn equivalent_to(mut self, id: RelNodeId) -> Self {
        if let OptExprNode::New { equivalent, .. } = &mut self.root {
            *equivalent = Some(id);
        }
        self
    }

    pub fn existing_id(&self) -> Option<RelNodeId> {
        match self.root {
            OptExprNode::Existing(id) => Some(id),
            OptExprNode::New { .. } => None,
        }
    }

    /// The node at the root, looked up in `graph` when it already exists there.
    pub fn root_node<'a>(&'a self, graph: &'a PlanGraph) -> &'a RelNode {
        match &self.root {
            OptExprNode::New { node, .. } => node,
            OptExprNode::Existing(id) => graph.node(*id),
        }
    }
}
