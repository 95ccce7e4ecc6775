use crate::core::Value;
use crate::filter::FilterSpec;
use crate::predicate::{PredicateContext, PredicateEvaluator, text_contains};

pub struct TextPredicate;

impl PredicateEvaluator for TextPredicate {
    fn name(&self) -> &'static str {
        "TEXT"
    }

    fn can_evaluate(&self, spec: &FilterSpec) -> bool {
        matches!(spec, FilterSpec::Text(_))
    }

    fn evaluate(&self, spec: &FilterSpec, value: &Value, _context: &PredicateContext<'_>) -> bool {
        let FilterSpec::Text(filter) = spec else {
            return true;
        };
        text_contains(value, &filter.contains)
    }
}
