use log::debug;

use crate::accessor::FieldRegistry;
use crate::config::EngineConfig;
use crate::core::value::format_number;
use crate::core::{Record, Result};
use crate::filter::{DateMode, FilterSet, FilterSpec};
use crate::predicate::{DayNormalizer, PredicateContext, PredicateRegistry};

const OPEN_END: &str = "…";

/// Decides keep/drop for records against a `FilterSet`.
pub struct FilterEvaluator {
    fields: FieldRegistry,
    predicates: PredicateRegistry,
    normalizer: DayNormalizer,
    chip_limit: usize,
}

/// Result of filtering one table: the kept rows plus the unfiltered size.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterView<'a> {
    pub rows: Vec<&'a Record>,
    pub total: usize,
}

impl FilterView<'_> {
    pub fn shown(&self) -> usize {
        self.rows.len()
    }

    /// "Showing N of M"
    pub fn caption(&self) -> String {
        format!("Showing {} of {}", self.shown(), self.total)
    }
}

/// Human-readable chips for the active filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChipSummary {
    pub chips: Vec<String>,
    pub overflow: usize,
}

impl ChipSummary {
    pub fn overflow_label(&self) -> Option<String> {
        (self.overflow > 0).then(|| format!("+{} more", self.overflow))
    }
}

impl FilterEvaluator {
    pub fn new(fields: FieldRegistry) -> Self {
        Self {
            fields,
            predicates: PredicateRegistry::with_default_predicates(),
            normalizer: DayNormalizer::default(),
            chip_limit: EngineConfig::default().chip_limit,
        }
    }

    pub fn from_config(fields: FieldRegistry, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: DayNormalizer::from_config(config)?,
            chip_limit: config.chip_limit,
            ..Self::new(fields)
        })
    }

    pub fn with_normalizer(mut self, normalizer: DayNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_predicates(mut self, predicates: PredicateRegistry) -> Self {
        self.predicates = predicates;
        self
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn normalizer(&self) -> &DayNormalizer {
        &self.normalizer
    }

    /// Logical AND of every active entry in `filters`.
    ///
    /// Entries naming a field this table does not declare are ignored.
    pub fn keep(&self, record: &Record, filters: &FilterSet) -> bool {
        let context = PredicateContext::new(&self.normalizer);
        filters
            .iter()
            .filter(|(_, spec)| spec.is_active())
            .all(|(name, spec)| match self.fields.spec(name) {
                Some(field) => self.predicates.evaluate(spec, &field.extract(record), &context),
                None => {
                    debug!("Ignoring filter on undeclared field '{}'", name);
                    true
                }
            })
    }

    /// Kept records, in their original order.
    pub fn filter<'a>(&self, records: &'a [Record], filters: &FilterSet) -> Vec<&'a Record> {
        records.iter().filter(|r| self.keep(r, filters)).collect()
    }

    /// Owned copy of the kept records, in their original order.
    pub fn apply(&self, records: &[Record], filters: &FilterSet) -> Vec<Record> {
        records
            .iter()
            .filter(|r| self.keep(r, filters))
            .cloned()
            .collect()
    }

    pub fn view<'a>(&self, records: &'a [Record], filters: &FilterSet) -> FilterView<'a> {
        FilterView {
            rows: self.filter(records, filters),
            total: records.len(),
        }
    }

    /// Badge count for `filters`; zero disables "clear all".
    pub fn active_count(&self, filters: &FilterSet) -> usize {
        filters.active_count()
    }

    pub fn summary(&self, filters: &FilterSet) -> ChipSummary {
        let all: Vec<String> = filters
            .iter()
            .filter_map(|(name, spec)| self.chip(name, spec))
            .collect();
        let overflow = all.len().saturating_sub(self.chip_limit);
        ChipSummary {
            chips: all.into_iter().take(self.chip_limit).collect(),
            overflow,
        }
    }

    fn chip(&self, name: &str, spec: &FilterSpec) -> Option<String> {
        if !spec.is_active() {
            return None;
        }
        let label = self.fields.label(name);
        let chip = match spec {
            FilterSpec::Text(f) => format!("{} ~ {}", label, f.contains),
            FilterSpec::Numeric(f) => format!("{}: {}–{}", label, bound(f.min), bound(f.max)),
            FilterSpec::Enum(f) => {
                let values: Vec<&str> = f.values.iter().map(String::as_str).collect();
                format!("{}: {}", label, values.join(", "))
            }
            FilterSpec::Date(f) => match f.mode {
                DateMode::Single => format!("{}: {}", label, day(f.single)),
                DateMode::Range => format!("{}: {} → {}", label, day(f.from), day(f.to)),
                DateMode::None => return None,
            },
        };
        Some(chip)
    }
}

fn bound(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| OPEN_END.to_string())
}

fn day(value: Option<chrono::NaiveDate>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| OPEN_END.to_string())
}
