#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum OptimizerError {
    #[error("rule {rule}: pattern declares {declared} inputs for {operand}, which has {arity}")]
    InconsistentPattern {
        rule: String,
        operand: String,
        declared: usize,
        arity: usize,
    },
    #[error("matched node {ordinal} requested, but the pattern binds {bound}")]
    MatchedNodeOutOfRange { ordinal: usize, bound: usize },
    #[error("transform_to called twice for one match")]
    AlreadyTransformed,
    #[error("{operand} takes {expected} inputs, got {actual}")]
    InvalidArity {
        operand: String,
        expected: usize,
        actual: usize,
    },
    #[error("unknown plan node: {0}")]
    UnknownNode(usize),
    #[error("invalid planner config: {0}")]
    InvalidConfig(String),
}
