mod implement;
mod table_scan;
mod uncollect;

use std::fmt::Debug;

use enum_dispatch::enum_dispatch;
pub use implement::*;
use strum_macros::AsRefStr;
pub use table_scan::*;
pub use uncollect::*;

use crate::optimizer::core::{Convention, Pattern, Rule, RuleCall};
use crate::optimizer::{OptimizerError, PlanNodeType};

#[enum_dispatch(Rule)]
#[derive(Clone, AsRefStr)]
pub enum RuleImpl {
    NativeUncollectRule,
    NativeImplementRule,
    NativeTableScanRule,
}

impl Debug for RuleImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleImpl::NativeImplementRule(rule) => {
                write!(f, "{}({})", self.as_ref(), rule.node_type())
            }
            _ => write!(f, "{}", self.as_ref()),
        }
    }
}

/// Rules implementing every operator of an abstract plan in the native convention.
pub fn native_rules() -> Vec<RuleImpl> {
    vec![
        NativeTableScanRule::create(),
        NativeImplementRule::create(PlanNodeType::Filter),
        NativeImplementRule::create(PlanNodeType::Project),
        NativeImplementRule::create(PlanNodeType::Limit),
        NativeImplementRule::create(PlanNodeType::Join),
        NativeUncollectRule::create(),
    ]
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::catalog::StatisticsProvider;
    use crate::optimizer::core::{OptExpr, PatternMatcher};
    use crate::optimizer::{ConversionEngine, HepMatcher, PlanGraph, RelNodeId};

    /// Match `rule` at `id` and fire it, returning what it transformed to.
    pub fn fire(
        rule: &RuleImpl,
        graph: &PlanGraph,
        engine: &ConversionEngine,
        statistics: &dyn StatisticsProvider,
        id: RelNodeId,
    ) -> Result<Option<OptExpr>, OptimizerError> {
        let rels = match HepMatcher::new(rule.pattern(), id, graph).match_nodes() {
            Some(rels) => rels,
            None => return Ok(None),
        };
        let mut call = RuleCall::new(graph, engine, statistics, rels);
        rule.on_match(&mut call)?;
        Ok(call.into_result())
    }
}
