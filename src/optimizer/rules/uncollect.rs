use super::RuleImpl;
use crate::optimizer::core::*;
use crate::optimizer::{OptimizerError, Operator, PlanNodeType, RelNode};

lazy_static! {
    static ref PATTERN: Pattern =
        Pattern::node(PlanNodeType::Uncollect).in_convention(Convention::NONE);
}

/// Implements `Uncollect` as the native engine's pull-based unnest.
#[derive(Clone)]
pub struct NativeUncollectRule;

impl NativeUncollectRule {
    pub fn create() -> RuleImpl {
        Self {}.into()
    }
}

impl Rule for NativeUncollectRule {
    fn pattern(&self) -> &Pattern {
        &PATTERN
    }

    fn out_convention(&self) -> Convention {
        Convention::NATIVE
    }

    fn on_match(&self, call: &mut RuleCall<'_>) -> Result<(), OptimizerError> {
        let uncollect_id = call.rel(0)?;
        let uncollect = call.node(uncollect_id);
        let input = match call.inputs(uncollect_id).first() {
            Some(input) => *input,
            None => return Ok(()),
        };
        let native_input =
            match call.merge_traits_and_convert(uncollect.traits(), self.out_convention(), input) {
                Some(native_input) => native_input,
                None => return Ok(()),
            };

        let native_uncollect = RelNode::new(
            Operator::Uncollect,
            uncollect.traits().with_convention(self.out_convention()),
        );
        call.transform_to(OptExpr::new(native_uncollect, vec![native_input]))
    }
}
