// ============================================================================
// opsgrid: filtering and aggregation over operations tables
// ============================================================================

pub mod accessor;
pub mod aggregate;
pub mod config;
pub mod core;
pub mod filter;
pub mod guard;
pub mod metrics;
pub mod predicate;
pub mod prelude;
pub mod refresh;
pub mod session;

// Re-export main types for convenience
pub use crate::core::{EngineError, FieldKind, Record, Result, Value};
pub use config::EngineConfig;

pub use accessor::{FieldRegistry, FieldSpec};
pub use aggregate::{AggregateRow, Aggregator, aggregate};
pub use filter::{ChipSummary, FilterEvaluator, FilterSet, FilterSpec, FilterView};
pub use guard::{RequestSequence, RequestToken};
pub use metrics::{CompletionRule, DerivedMetrics, Totals, partition_by_completion};
pub use predicate::{DayNormalizer, PredicateEvaluator, PredicateRegistry};
pub use refresh::{LiveTable, PollerHandle, RecordSource, RefreshOutcome, spawn_poller};
pub use session::{Role, Session};
