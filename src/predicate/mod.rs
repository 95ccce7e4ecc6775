pub mod plugins;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use indexmap::IndexSet;
use log::{debug, warn};

use crate::config::EngineConfig;
use crate::core::{Result, Value};
use crate::filter::{DateFilter, DateMode, FilterSpec};

/// Case-insensitive substring match. An empty needle always matches.
pub fn text_contains(value: &Value, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    value.to_text().to_lowercase().contains(&needle.to_lowercase())
}

/// Inclusive range check with independent optional bounds.
///
/// A value without a number (`NaN`) only passes when both bounds are unset.
pub fn numeric_in_range(value: &Value, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let n = value.as_f64();
    if n.is_nan() {
        return false;
    }
    min.is_none_or(|lo| n >= lo) && max.is_none_or(|hi| n <= hi)
}

/// Exact membership. An empty selection means "no filter".
pub fn enum_membership(value: &Value, selected: &IndexSet<String>) -> bool {
    selected.is_empty() || selected.contains(&value.to_text())
}

/// Calendar-day match in the normalizer's timezone.
///
/// Records whose day cannot be resolved fail every active date filter.
pub fn date_matches(value: &Value, filter: &DateFilter, normalizer: &DayNormalizer) -> bool {
    if !filter.is_active() {
        return true;
    }
    let Some(day) = normalizer.day_of(value) else {
        return false;
    };
    match filter.mode {
        DateMode::None => true,
        DateMode::Single => filter.single.is_none_or(|single| day == single),
        DateMode::Range => {
            filter.from.is_none_or(|from| day >= from) && filter.to.is_none_or(|to| day <= to)
        }
    }
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Turns timestamps into calendar days at one fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayNormalizer {
    offset: FixedOffset,
}

impl DayNormalizer {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(config.offset()?))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Resolve a date value to its calendar day.
    ///
    /// Bare `YYYY-MM-DD` strings are already days and are not shifted.
    /// Timestamps without an offset are read as UTC; numbers are epoch
    /// milliseconds.
    pub fn day_of(&self, value: &Value) -> Option<NaiveDate> {
        match value {
            Value::Null => None,
            Value::Number(ms) => self.day_of_millis(*ms),
            Value::Text(s) => self.day_of_text(s.trim()),
        }
    }

    fn day_of_millis(&self, ms: f64) -> Option<NaiveDate> {
        if !ms.is_finite() {
            return None;
        }
        let instant = DateTime::from_timestamp_millis(ms as i64)?;
        Some(instant.with_timezone(&self.offset).date_naive())
    }

    fn day_of_text(&self, s: &str) -> Option<NaiveDate> {
        if s.is_empty() {
            return None;
        }
        if s.len() == 10 {
            if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Some(day);
            }
        }
        if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
            return Some(instant.with_timezone(&self.offset).date_naive());
        }
        for format in OFFSET_FORMATS {
            if let Ok(instant) = DateTime::parse_from_str(s, format) {
                return Some(instant.with_timezone(&self.offset).date_naive());
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Some(naive.and_utc().with_timezone(&self.offset).date_naive());
            }
        }
        let digits = s.strip_prefix('-').unwrap_or(s);
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return s.parse::<i64>().ok().and_then(|ms| self.day_of_millis(ms as f64));
        }
        None
    }
}

impl Default for DayNormalizer {
    /// UTC+05:30, matching `EngineConfig::default()`.
    fn default() -> Self {
        Self::new(FixedOffset::east_opt(330 * 60).unwrap_or(Utc.fix()))
    }
}

/// Shared state handed to every predicate evaluation.
pub struct PredicateContext<'a> {
    normalizer: &'a DayNormalizer,
}

impl<'a> PredicateContext<'a> {
    pub fn new(normalizer: &'a DayNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &DayNormalizer {
        self.normalizer
    }
}

/// One matcher per filter kind.
pub trait PredicateEvaluator: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_evaluate(&self, spec: &FilterSpec) -> bool;

    fn evaluate(&self, spec: &FilterSpec, value: &Value, context: &PredicateContext<'_>) -> bool;
}

pub struct PredicateRegistry {
    evaluators: Vec<Box<dyn PredicateEvaluator>>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self {
            evaluators: Vec::new(),
        }
    }

    pub fn register(&mut self, evaluator: Box<dyn PredicateEvaluator>) {
        debug!("Registered predicate: {}", evaluator.name());
        self.evaluators.push(evaluator);
    }

    pub fn with_default_predicates() -> Self {
        use plugins::*;

        let mut registry = Self::new();
        registry.register(Box::new(text::TextPredicate));
        registry.register(Box::new(numeric::NumericPredicate));
        registry.register(Box::new(membership::MembershipPredicate));
        registry.register(Box::new(date::DatePredicate));
        registry
    }

    /// Evaluate one spec against one value. Inactive specs always match.
    pub fn evaluate(&self, spec: &FilterSpec, value: &Value, context: &PredicateContext<'_>) -> bool {
        if !spec.is_active() {
            return true;
        }
        match self.find_evaluator(spec) {
            Some(evaluator) => evaluator.evaluate(spec, value, context),
            None => {
                warn!("No predicate registered for {} filter, treating as match", spec.kind_name());
                true
            }
        }
    }

    pub fn list_predicates(&self) -> Vec<&str> {
        self.evaluators.iter().map(|e| e.name()).collect()
    }

    fn find_evaluator(&self, spec: &FilterSpec) -> Option<&dyn PredicateEvaluator> {
        self.evaluators
            .iter()
            .find(|ev| ev.can_evaluate(spec))
            .map(|boxed| &**boxed)
    }
}

impl Default for PredicateRegistry {
    fn default() -> Self {
        Self::with_default_predicates()
    }
}
