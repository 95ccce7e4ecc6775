mod evaluator;
mod spec;

pub use evaluator::{ChipSummary, FilterEvaluator, FilterView};
pub use spec::{DateFilter, DateMode, EnumFilter, FilterSet, FilterSpec, NumericFilter, TextFilter};
