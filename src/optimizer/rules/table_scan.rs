use super::RuleImpl;
use crate::optimizer::core::*;
use crate::optimizer::{OptimizerError, Operator, PlanNodeType, RelNode};

lazy_static! {
    static ref PATTERN: Pattern =
        Pattern::node(PlanNodeType::TableScan).in_convention(Convention::NONE);
}

/// Implements a scan natively. A scan through an index becomes an `IndexScan` carrying the
/// statistics the catalog has for the index.
#[derive(Clone)]
pub struct NativeTableScanRule;

impl NativeTableScanRule {
    pub fn create() -> RuleImpl {
        Self {}.into()
    }
}

impl Rule for NativeTableScanRule {
    fn pattern(&self) -> &Pattern {
        &PATTERN
    }

    fn out_convention(&self) -> Convention {
        Convention::NATIVE
    }

    fn on_match(&self, call: &mut RuleCall<'_>) -> Result<(), OptimizerError> {
        let scan = call.node(call.rel(0)?);
        let op = match scan.op() {
            Operator::TableScan {
                table,
                index: Some(index),
            } => Operator::IndexScan {
                table: table.clone(),
                index: index.clone(),
                stats: call.statistics().index_stats(table, index),
            },
            op => op.clone(),
        };
        let native = RelNode::new(op, scan.traits().with_convention(self.out_convention()));
        call.transform_to(OptExpr::new(native, vec![]))
    }
}
