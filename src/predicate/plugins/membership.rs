use crate::core::Value;
use crate::filter::FilterSpec;
use crate::predicate::{PredicateContext, PredicateEvaluator, enum_membership};

pub struct MembershipPredicate;

impl PredicateEvaluator for MembershipPredicate {
    fn name(&self) -> &'static str {
        "ENUM"
    }

    fn can_evaluate(&self, spec: &FilterSpec) -> bool {
        matches!(spec, FilterSpec::Enum(_))
    }

    fn evaluate(&self, spec: &FilterSpec, value: &Value, _context: &PredicateContext<'_>) -> bool {
        let FilterSpec::Enum(filter) = spec else {
            return true;
        };
        enum_membership(value, &filter.values)
    }
}
