use crate::core::Value;
use crate::filter::FilterSpec;
use crate::predicate::{PredicateContext, PredicateEvaluator, numeric_in_range};

pub struct NumericPredicate;

impl PredicateEvaluator for NumericPredicate {
    fn name(&self) -> &'static str {
        "NUMERIC"
    }

    fn can_evaluate(&self, spec: &FilterSpec) -> bool {
        matches!(spec, FilterSpec::Numeric(_))
    }

    fn evaluate(&self, spec: &FilterSpec, value: &Value, _context: &PredicateContext<'_>) -> bool {
        let FilterSpec::Numeric(filter) = spec else {
            return true;
        };
        numeric_in_range(value, filter.min, filter.max)
    }
}
