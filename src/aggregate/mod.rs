//! Group records by a key and emit one summary row per group.
//!
//! Rows come out in first-seen key order. Every call recomputes from
//! scratch; nothing is carried between calls.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::accessor::FieldSpec;
use crate::config::EngineConfig;
use crate::core::Record;
use crate::metrics::{CompletionRule, pending, percent};

/// One group's summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub quantity_sum: f64,
    pub completed_count: usize,
    pub completed_quantity_sum: f64,
    pub distinct: IndexMap<String, usize>,
}

impl AggregateRow {
    /// Cardinality of a distinct dimension; 0 if it was not tracked.
    pub fn distinct_count(&self, dimension: &str) -> usize {
        self.distinct.get(dimension).copied().unwrap_or(0)
    }

    pub fn pending_quantity(&self) -> u64 {
        pending(self.quantity_sum, self.completed_quantity_sum)
    }

    pub fn progress_percent(&self) -> u8 {
        percent(self.quantity_sum, self.completed_quantity_sum)
    }
}

struct Accumulator {
    label: Option<String>,
    count: usize,
    quantity_sum: f64,
    completed_count: usize,
    completed_quantity_sum: f64,
    seen: Vec<HashSet<String>>,
}

impl Accumulator {
    fn new(dimensions: usize) -> Self {
        Self {
            label: None,
            count: 0,
            quantity_sum: 0.0,
            completed_count: 0,
            completed_quantity_sum: 0.0,
            seen: vec![HashSet::new(); dimensions],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    key: FieldSpec,
    fallback_key: String,
    label: Option<FieldSpec>,
    dimensions: Vec<(String, FieldSpec)>,
    rule: CompletionRule,
}

impl Aggregator {
    pub fn new(key: FieldSpec) -> Self {
        Self::from_config(key, &EngineConfig::default())
    }

    pub fn from_config(key: FieldSpec, config: &EngineConfig) -> Self {
        Self {
            key,
            fallback_key: config.fallback_group_key.clone(),
            label: None,
            dimensions: Vec::new(),
            rule: CompletionRule::from_config(config),
        }
    }

    /// Key used for records whose group key is missing or empty.
    pub fn fallback(mut self, key: impl Into<String>) -> Self {
        self.fallback_key = key.into();
        self
    }

    /// Field giving a display label for the group (e.g. store name for a
    /// store-id key). The first non-empty value seen wins.
    pub fn label(mut self, field: FieldSpec) -> Self {
        self.label = Some(field);
        self
    }

    /// Track the number of distinct non-empty values of `field` per group.
    pub fn distinct(mut self, dimension: impl Into<String>, field: FieldSpec) -> Self {
        self.dimensions.push((dimension.into(), field));
        self
    }

    pub fn completion(mut self, rule: CompletionRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn group_key(&self, record: &Record) -> String {
        let value = self.key.extract(record);
        if value.is_blank() {
            self.fallback_key.clone()
        } else {
            value.to_text()
        }
    }

    pub fn aggregate<'a, I>(&self, records: I) -> Vec<AggregateRow>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut groups: IndexMap<String, Accumulator> = IndexMap::new();

        for record in records {
            let acc = groups
                .entry(self.group_key(record))
                .or_insert_with(|| Accumulator::new(self.dimensions.len()));

            acc.count += 1;
            acc.quantity_sum += self.rule.quantity(record);
            acc.completed_quantity_sum += self.rule.clamped_completed(record);
            if self.rule.is_completed(record) {
                acc.completed_count += 1;
            }

            if acc.label.is_none() {
                if let Some(field) = &self.label {
                    let value = field.extract(record);
                    if !value.is_blank() {
                        acc.label = Some(value.to_text());
                    }
                }
            }

            for ((_, field), seen) in self.dimensions.iter().zip(acc.seen.iter_mut()) {
                let value = field.extract(record);
                if !value.is_blank() {
                    seen.insert(value.to_text());
                }
            }
        }

        groups
            .into_iter()
            .map(|(key, acc)| AggregateRow {
                label: acc.label.unwrap_or_else(|| key.clone()),
                key,
                count: acc.count,
                quantity_sum: acc.quantity_sum,
                completed_count: acc.completed_count,
                completed_quantity_sum: acc.completed_quantity_sum,
                distinct: self
                    .dimensions
                    .iter()
                    .zip(acc.seen)
                    .map(|((name, _), seen)| (name.clone(), seen.len()))
                    .collect(),
            })
            .collect()
    }
}

/// Group by `key`, mapping missing keys to `fallback_key`.
pub fn aggregate<'a, I>(records: I, key: &FieldSpec, fallback_key: &str) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a Record>,
{
    Aggregator::new(key.clone())
        .fallback(fallback_key)
        .aggregate(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
        values.into_iter().map(Record::new).collect()
    }

    #[test]
    fn test_first_seen_order_and_counts() {
        let rows = aggregate(
            &records(vec![
                json!({ "store": "B", "quantity": 1 }),
                json!({ "store": "A", "quantity": 2 }),
                json!({ "store": "B", "quantity": 3 }),
            ]),
            &FieldSpec::text("store", "store"),
            "unassigned",
        );
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A"]);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].quantity_sum, 4.0);
        assert_eq!(rows[1].count, 1);
    }

    #[test]
    fn test_missing_keys_use_fallback() {
        let rows = aggregate(
            &records(vec![
                json!({ "admin": null }),
                json!({}),
                json!({ "admin": "" }),
                json!({ "admin": "x" }),
            ]),
            &FieldSpec::text("admin", "admin"),
            "unassigned",
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "unassigned");
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[1].key, "x");
    }

    #[test]
    fn test_store_analytics_rows() {
        let data = records(vec![
            json!({ "store": { "_id": "s1", "name": "North" }, "quantity": 10, "completedQuantity": 4,
                    "assignedLister": { "_id": "l1" }, "range": "R1", "category": "Home" }),
            json!({ "store": { "_id": "s1", "name": "North" }, "quantity": 5, "status": "completed",
                    "assignedLister": { "_id": "l2" }, "range": "R1", "category": "Garden" }),
            json!({ "store": { "_id": "s1" }, "quantity": 2, "completedQuantity": 9,
                    "assignedLister": { "_id": "l1" } }),
            json!({ "quantity": 3 }),
        ]);
        let aggregator = Aggregator::new(FieldSpec::text("storeId", "store._id"))
            .fallback("unknown")
            .label(FieldSpec::text("store", "store.name"))
            .distinct("listers", FieldSpec::text("lister", "assignedLister._id"))
            .distinct("stores", FieldSpec::text("storeId", "store._id"))
            .distinct("ranges", FieldSpec::text("range", "range"))
            .distinct("categories", FieldSpec::text("category", "category"));

        let rows = aggregator.aggregate(&data);
        assert_eq!(rows.len(), 2);

        let north = &rows[0];
        assert_eq!(north.key, "s1");
        assert_eq!(north.label, "North");
        assert_eq!(north.count, 3);
        assert_eq!(north.quantity_sum, 17.0);
        assert_eq!(north.completed_quantity_sum, 4.0 + 5.0 + 2.0);
        assert_eq!(north.completed_count, 2);
        assert_eq!(north.pending_quantity(), 6);
        assert_eq!(north.progress_percent(), 65);
        assert_eq!(north.distinct_count("listers"), 2);
        assert_eq!(north.distinct_count("stores"), 1);
        assert_eq!(north.distinct_count("ranges"), 1);
        assert_eq!(north.distinct_count("categories"), 2);
        assert_eq!(north.distinct_count("untracked"), 0);

        let unknown = &rows[1];
        assert_eq!(unknown.key, "unknown");
        assert_eq!(unknown.label, "unknown");
        assert_eq!(unknown.distinct_count("stores"), 0);
        assert_eq!(unknown.pending_quantity(), 3);
    }

    #[test]
    fn test_numeric_keys_are_stringified() {
        let rows = aggregate(
            &records(vec![json!({ "k": 1 }), json!({ "k": "1" }), json!({ "k": 2.5 })]),
            &FieldSpec::text("k", "k"),
            "none",
        );
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["1", "2.5"]);
        assert_eq!(rows[0].count, 2);
    }

    #[test]
    fn test_rows_serialize_camel_case() {
        let rows = aggregate(
            &records(vec![json!({ "store": "A", "quantity": 2 })]),
            &FieldSpec::text("store", "store"),
            "unassigned",
        );
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["quantitySum"], json!(2.0));
        assert_eq!(json["completedCount"], json!(0));
    }
}
