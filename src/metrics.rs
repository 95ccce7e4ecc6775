//! Pending quantity, completion percentage and totals.
//!
//! All consumers share one completion rule: an explicit numeric completed
//! quantity wins; without one, a record whose status equals the configured
//! completed status counts as fully completed; otherwise nothing is done.

use crate::accessor::FieldSpec;
use crate::config::EngineConfig;
use crate::core::{FieldKind, Record};

/// Per-record derived values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedMetrics {
    pub pending: u64,
    pub progress_percent: u8,
}

#[derive(Debug, Clone)]
pub struct CompletionRule {
    quantity: FieldSpec,
    completed_quantity: FieldSpec,
    status: FieldSpec,
    completed_status: String,
}

impl CompletionRule {
    pub fn new(
        quantity_path: &str,
        completed_quantity_path: &str,
        status_path: &str,
        completed_status: &str,
    ) -> Self {
        Self {
            quantity: FieldSpec::path("quantity", quantity_path, FieldKind::Number),
            completed_quantity: FieldSpec::path(
                "completedQuantity",
                completed_quantity_path,
                FieldKind::Number,
            ),
            status: FieldSpec::path("status", status_path, FieldKind::Text),
            completed_status: completed_status.to_string(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            &config.quantity_field,
            &config.completed_quantity_field,
            &config.status_field,
            &config.completed_status,
        )
    }

    /// Requested quantity; absent, non-numeric and negative values are 0.
    pub fn quantity(&self, record: &Record) -> f64 {
        non_negative(self.quantity.extract(record).as_f64())
    }

    /// Completed quantity under the canonical rule, before clamping.
    pub fn completed_quantity(&self, record: &Record) -> f64 {
        let explicit = self.completed_quantity.extract(record).as_f64();
        if explicit.is_finite() {
            return explicit.max(0.0);
        }
        if self.status.extract(record).to_text() == self.completed_status {
            return self.quantity(record);
        }
        0.0
    }

    /// Completed quantity clamped to `[0, quantity]`.
    pub fn clamped_completed(&self, record: &Record) -> f64 {
        self.completed_quantity(record).min(self.quantity(record))
    }

    pub fn pending_quantity(&self, record: &Record) -> u64 {
        pending(self.quantity(record), self.completed_quantity(record))
    }

    pub fn progress_percent(&self, record: &Record) -> u8 {
        percent(self.quantity(record), self.completed_quantity(record))
    }

    /// Completed quantity has reached the requested quantity.
    pub fn is_completed(&self, record: &Record) -> bool {
        self.completed_quantity(record) >= self.quantity(record)
    }

    pub fn derive(&self, record: &Record) -> DerivedMetrics {
        DerivedMetrics {
            pending: self.pending_quantity(record),
            progress_percent: self.progress_percent(record),
        }
    }
}

impl Default for CompletionRule {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// `max(0, quantity - completed)`, rounded to a whole unit.
pub fn pending(quantity: f64, completed: f64) -> u64 {
    let quantity = non_negative(quantity);
    let completed = non_negative(completed);
    (quantity - completed).max(0.0).round() as u64
}

/// Share of `quantity` completed, in whole percent within `[0, 100]`.
///
/// Zero quantity yields 0; over-reported completion is clamped first.
pub fn percent(quantity: f64, completed: f64) -> u8 {
    let quantity = non_negative(quantity);
    if quantity <= 0.0 {
        return 0;
    }
    let completed = non_negative(completed).min(quantity);
    (100.0 * completed / quantity).round().clamp(0.0, 100.0) as u8
}

fn non_negative(n: f64) -> f64 {
    if n.is_finite() && n > 0.0 { n } else { 0.0 }
}

/// Pending quantity of one record under the default rule.
pub fn pending_quantity(record: &Record) -> u64 {
    CompletionRule::default().pending_quantity(record)
}

/// Progress of one record under the default rule.
pub fn progress_percent(record: &Record) -> u8 {
    CompletionRule::default().progress_percent(record)
}

/// Sums over a (usually filtered) set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub records: usize,
    pub quantity: f64,
    pub completed_quantity: f64,
    pub pending_quantity: u64,
}

impl Totals {
    pub fn from_records<'a, I>(records: I, rule: &CompletionRule) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records.into_iter().fold(Self::default(), |mut totals, record| {
            totals.records += 1;
            totals.quantity += rule.quantity(record);
            totals.completed_quantity += rule.clamped_completed(record);
            totals.pending_quantity += rule.pending_quantity(record);
            totals
        })
    }

    pub fn progress_percent(&self) -> u8 {
        percent(self.quantity, self.completed_quantity)
    }
}

/// Split records into (pending, completed), each in original order.
pub fn partition_by_completion<'a, I>(records: I, rule: &CompletionRule) -> (Vec<&'a Record>, Vec<&'a Record>)
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().partition(|record| !rule.is_completed(record))
}
