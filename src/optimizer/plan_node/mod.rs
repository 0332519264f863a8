use std::fmt;

use derive_new::new;
use itertools::Itertools;
use strum_macros::{AsRefStr, Display, EnumDiscriminants};

use crate::catalog::{IndexStats, TableId};
use crate::optimizer::core::{Convention, TraitSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Cross,
}

/// Operator identity of a plan node, with its operator-specific parameters. Expressions are kept
/// as their textual form: the rewrite engine never evaluates them.
///
/// `PlanNodeType` is the parameter-free tag of each variant, used by patterns to select nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumDiscriminants)]
#[strum_discriminants(name(PlanNodeType), derive(Hash, AsRefStr, Display))]
pub enum Operator {
    TableScan {
        table: TableId,
        index: Option<String>,
    },
    /// Scan through an index, carrying the statistics the catalog supplied for it.
    IndexScan {
        table: TableId,
        index: String,
        stats: Option<IndexStats>,
    },
    Filter {
        predicate: String,
    },
    Project {
        exprs: Vec<String>,
    },
    Limit {
        limit: Option<usize>,
        offset: Option<usize>,
    },
    Join {
        join_type: JoinType,
        on: Option<String>,
    },
    /// Unnests a collection-valued input into one output row per element.
    Uncollect,
    /// Adapts its input from one calling convention to another without changing results.
    Convert {
        from: Convention,
        to: Convention,
    },
}

impl Operator {
    pub fn node_type(&self) -> PlanNodeType {
        PlanNodeType::from(self)
    }
}

impl PlanNodeType {
    /// Number of inputs every node of this type has.
    pub fn arity(&self) -> usize {
        match self {
            PlanNodeType::TableScan | PlanNodeType::IndexScan => 0,
            PlanNodeType::Filter
            | PlanNodeType::Project
            | PlanNodeType::Limit
            | PlanNodeType::Uncollect
            | PlanNodeType::Convert => 1,
            PlanNodeType::Join => 2,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operator::TableScan { table, index } => match index {
                Some(index) => write!(f, "TableScan: {} index {}", table, index),
                None => write!(f, "TableScan: {}", table),
            },
            Operator::IndexScan {
                table,
                index,
                stats,
            } => match stats {
                Some(stats) => write!(f, "IndexScan: {}.{} ({})", table, index, stats),
                None => write!(f, "IndexScan: {}.{}", table, index),
            },
            Operator::Filter { predicate } => write!(f, "Filter: {}", predicate),
            Operator::Project { exprs } => write!(f, "Project: {}", exprs.iter().join(", ")),
            Operator::Limit { limit, offset } => {
                write!(f, "Limit: limit {:?}, offset {:?}", limit, offset)
            }
            Operator::Join { join_type, on } => match on {
                Some(on) => write!(f, "Join: {} on {}", join_type, on),
                None => write!(f, "Join: {}", join_type),
            },
            Operator::Uncollect => write!(f, "Uncollect"),
            Operator::Convert { from, to } => write!(f, "Convert: {} -> {}", from, to),
        }
    }
}

/// A relational node without its inputs. Inputs are edges of the
/// [`PlanGraph`](crate::optimizer::PlanGraph) the node lives in, so the same input can be shared
/// by many alternative parents.
///
/// Nodes are immutable: converting one always creates another.
#[derive(new, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelNode {
    op: Operator,
    traits: TraitSet,
}

impl RelNode {
    /// Create a node in the abstract convention.
    pub fn logical(op: Operator) -> Self {
        Self::new(op, TraitSet::new(Convention::NONE))
    }

    pub fn op(&self) -> &Operator {
        &self.op
    }

    pub fn traits(&self) -> &TraitSet {
        &self.traits
    }

    pub fn node_type(&self) -> PlanNodeType {
        self.op.node_type()
    }

    pub fn convention(&self) -> Convention {
        self.traits.convention()
    }

    /// Same operator, other traits.
    pub fn with_traits(&self, traits: TraitSet) -> Self {
        Self::new(self.op.clone(), traits)
    }
}

impl fmt::Display for RelNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} [{}]", self.op, self.traits)
    }
}
