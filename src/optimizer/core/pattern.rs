use super::Convention;
use crate::optimizer::{OptimizerError, PlanNodeType, RelNode, RelNodeId};

/// Selects which node a pattern position accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Any,
    Node(PlanNodeType),
}

#[derive(Debug, Clone)]
pub enum PatternChildrenPredicate {
    /// The nested children patterns, matched against the first children in order. Children
    /// beyond the declared patterns are unconstrained.
    Predicate(Vec<Pattern>),
    /// We don't care about the children, and they are not bound.
    None,
}

/// The pattern tree to match a plan tree. It defined in `Rule` and used in `PatternMatcher`.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The root node operand.
    pub operand: Operand,
    /// When set, the root node must be in this calling convention.
    pub convention: Option<Convention>,
    /// The children's predicate of current node.
    pub children: PatternChildrenPredicate,
}

impl Pattern {
    pub fn any() -> Self {
        Self {
            operand: Operand::Any,
            convention: None,
            children: PatternChildrenPredicate::None,
        }
    }

    pub fn node(node_type: PlanNodeType) -> Self {
        Self {
            operand: Operand::Node(node_type),
            convention: None,
            children: PatternChildrenPredicate::None,
        }
    }

    pub fn in_convention(mut self, convention: Convention) -> Self {
        self.convention = Some(convention);
        self
    }

    pub fn with_children(mut self, children: Vec<Pattern>) -> Self {
        self.children = PatternChildrenPredicate::Predicate(children);
        self
    }

    /// Check the root node against operand and convention, ignoring children.
    pub fn matches_node(&self, node: &RelNode) -> bool {
        let operand_matched = match self.operand {
            Operand::Any => true,
            Operand::Node(node_type) => node.node_type() == node_type,
        };
        operand_matched
            && self
                .convention
                .map_or(true, |convention| node.convention() == convention)
    }

    /// Number of nodes a successful match binds.
    pub fn operand_count(&self) -> usize {
        match &self.children {
            PatternChildrenPredicate::Predicate(children) => {
                1 + children.iter().map(Pattern::operand_count).sum::<usize>()
            }
            PatternChildrenPredicate::None => 1,
        }
    }

    /// Reject patterns that declare more children than their operand can ever have.
    pub fn validate(&self, rule: &str) -> Result<(), OptimizerError> {
        let children = match &self.children {
            PatternChildrenPredicate::Predicate(children) => children,
            PatternChildrenPredicate::None => return Ok(()),
        };
        if let Operand::Node(node_type) = self.operand {
            if children.len() > node_type.arity() {
                return Err(OptimizerError::InconsistentPattern {
                    rule: rule.to_string(),
                    operand: node_type.to_string(),
                    declared: children.len(),
                    arity: node_type.arity(),
                });
            }
        }
        children.iter().try_for_each(|child| child.validate(rule))
    }
}

/// Matches a pattern from a start node. The bound nodes come back in pre-order: the root first,
/// then each child pattern's bindings left to right.
pub trait PatternMatcher {
    fn match_nodes(&self) -> Option<Vec<RelNodeId>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::Operator;

    #[test]
    fn test_validate_rejects_too_deep_pattern() {
        let pattern = Pattern::node(PlanNodeType::Filter)
            .with_children(vec![Pattern::node(PlanNodeType::TableScan)
                .with_children(vec![Pattern::any()])]);
        assert_eq!(
            pattern.validate("BadRule"),
            Err(OptimizerError::InconsistentPattern {
                rule: "BadRule".to_string(),
                operand: "TableScan".to_string(),
                declared: 1,
                arity: 0,
            })
        );

        let join = Pattern::node(PlanNodeType::Join).with_children(vec![Pattern::any(), Pattern::any()]);
        assert!(join.validate("JoinRule").is_ok());
        assert_eq!(join.operand_count(), 3);
    }

    #[test]
    fn test_matches_node_checks_convention() {
        let pattern = Pattern::node(PlanNodeType::Uncollect).in_convention(Convention::NONE);
        let logical = RelNode::logical(Operator::Uncollect);
        let native = logical.with_traits(logical.traits().with_convention(Convention::NATIVE));
        assert!(pattern.matches_node(&logical));
        assert!(!pattern.matches_node(&native));
        assert!(Pattern::any().matches_node(&native));
    }
}
