//! Common imports grouped by use.
//!
//! `table` covers the synchronous filter and aggregate path.
//! `live` adds the async refresh cycle.

pub mod table {
    //! Everything needed to filter, summarize and aggregate a record slice.
    pub use crate::accessor::{FieldRegistry, FieldSpec, presets};
    pub use crate::aggregate::{AggregateRow, Aggregator};
    pub use crate::config::EngineConfig;
    pub use crate::core::{FieldKind, Record, Value};
    pub use crate::filter::{DateMode, FilterEvaluator, FilterSet, FilterSpec};
    pub use crate::metrics::{CompletionRule, Totals};
}

pub mod live {
    //! Fetch cycle types for tables that re-fetch from a backend.
    pub use crate::guard::RequestSequence;
    pub use crate::refresh::{
        LiveTable, PollerHandle, RecordSource, RefreshOutcome, records_from_response, spawn_poller,
    };
}
