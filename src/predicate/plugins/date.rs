use crate::core::Value;
use crate::filter::FilterSpec;
use crate::predicate::{PredicateContext, PredicateEvaluator, date_matches};

pub struct DatePredicate;

impl PredicateEvaluator for DatePredicate {
    fn name(&self) -> &'static str {
        "DATE"
    }

    fn can_evaluate(&self, spec: &FilterSpec) -> bool {
        matches!(spec, FilterSpec::Date(_))
    }

    fn evaluate(&self, spec: &FilterSpec, value: &Value, context: &PredicateContext<'_>) -> bool {
        let FilterSpec::Date(filter) = spec else {
            return true;
        };
        date_matches(value, filter, context.normalizer())
    }
}
