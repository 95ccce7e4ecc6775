pub mod presets;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::core::{FieldKind, Record, Value};

type ExtractFn = Arc<dyn Fn(&Record) -> Value + Send + Sync>;

#[derive(Clone)]
enum Extraction {
    Path(String),
    Computed(ExtractFn),
}

/// A named, pure accessor into a record.
///
/// Extraction never fails: a missing path hop resolves to the kind's
/// sentinel (`""` for text, `NaN` for numbers, `Null` for dates).
#[derive(Clone)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    label: Option<String>,
    extraction: Extraction,
}

impl FieldSpec {
    /// Field read from a dotted path such as `task.sourcePrice`.
    pub fn path(name: impl Into<String>, path: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            extraction: Extraction::Path(path.into()),
        }
    }

    pub fn text(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::path(name, path, FieldKind::Text)
    }

    pub fn number(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::path(name, path, FieldKind::Number)
    }

    pub fn date(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::path(name, path, FieldKind::Date)
    }

    /// Field computed by a closure. The result is coerced to `kind`.
    pub fn computed<F>(name: impl Into<String>, kind: FieldKind, extract: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            label: None,
            extraction: Extraction::Computed(Arc::new(extract)),
        }
    }

    /// Display label used in filter chips.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Label if one was given, otherwise the field name.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn extract(&self, record: &Record) -> Value {
        match &self.extraction {
            Extraction::Path(path) => Value::from_json(record.resolve(path), self.kind),
            Extraction::Computed(extract) => extract(record).coerce(self.kind),
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extraction = match &self.extraction {
            Extraction::Path(path) => path.as_str(),
            Extraction::Computed(_) => "<computed>",
        };
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("extraction", &extraction)
            .finish()
    }
}

/// Registry of the logical columns a table exposes.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: IndexMap<String, FieldSpec>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field, replacing any previous spec with the same name.
    pub fn register(&mut self, spec: FieldSpec) {
        let name = spec.name.clone();
        debug!("Registered field: {} ({})", name, spec.kind());
        if self.fields.insert(name.clone(), spec).is_some() {
            warn!("Field '{}' re-registered, previous spec replaced", name);
        }
    }

    pub fn with(mut self, spec: FieldSpec) -> Self {
        self.register(spec);
        self
    }

    pub fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn label<'a>(&'a self, name: &'a str) -> &'a str {
        self.spec(name).map(FieldSpec::label).unwrap_or(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read a field from a record. Unknown names yield `Null`.
    pub fn get(&self, name: &str, record: &Record) -> Value {
        match self.spec(name) {
            Some(spec) => spec.extract(record),
            None => Value::Null,
        }
    }

    /// First-seen unique, non-blank text values of a field.
    ///
    /// These are the option lists offered by enum filter dropdowns.
    pub fn distinct_values(&self, name: &str, records: &[Record]) -> Vec<String> {
        let Some(spec) = self.spec(name) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        records
            .iter()
            .map(|record| spec.extract(record))
            .filter(|value| !value.is_blank())
            .map(|value| value.to_text())
            .filter(|text| seen.insert(text.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> FieldRegistry {
        FieldRegistry::new()
            .with(FieldSpec::number("sourcePrice", "task.sourcePrice").with_label("Source Price"))
            .with(FieldSpec::text("store", "store.name"))
            .with(FieldSpec::date("date", "createdAt"))
            .with(FieldSpec::computed("doubled", FieldKind::Number, |r| {
                Value::Number(r.resolve("quantity").and_then(|q| q.as_f64()).unwrap_or(f64::NAN) * 2.0)
            }))
    }

    #[test]
    fn test_get_resolves_and_coerces() {
        let fields = registry();
        let record = Record::new(json!({
            "task": { "sourcePrice": "19.5" },
            "store": { "name": "Alpha" },
            "createdAt": "2024-01-15T10:00:00Z",
            "quantity": 4
        }));
        assert_eq!(fields.get("sourcePrice", &record), Value::Number(19.5));
        assert_eq!(fields.get("store", &record), Value::Text("Alpha".into()));
        assert_eq!(fields.get("date", &record), Value::Text("2024-01-15T10:00:00Z".into()));
        assert_eq!(fields.get("doubled", &record), Value::Number(8.0));
        assert!(fields.get("unknown", &record).is_null());
    }

    #[test]
    fn test_missing_paths_yield_sentinels() {
        let fields = registry();
        let record = Record::new(json!({ "task": null }));
        assert!(fields.get("sourcePrice", &record).as_f64().is_nan());
        assert_eq!(fields.get("store", &record), Value::Text(String::new()));
        assert!(fields.get("date", &record).is_null());
        assert!(fields.get("doubled", &record).as_f64().is_nan());
    }

    #[test]
    fn test_labels() {
        let fields = registry();
        assert_eq!(fields.label("sourcePrice"), "Source Price");
        assert_eq!(fields.label("store"), "store");
        assert_eq!(fields.label("nope"), "nope");
    }

    #[test]
    fn test_distinct_values_first_seen() {
        let fields = registry();
        let records: Vec<Record> = vec![
            json!({"store": {"name": "B"}}),
            json!({"store": {"name": "A"}}),
            json!({}),
            json!({"store": {"name": "B"}}),
        ]
        .into_iter()
        .map(Record::new)
        .collect();
        assert_eq!(fields.distinct_values("store", &records), vec!["B", "A"]);
        assert!(fields.distinct_values("missing", &records).is_empty());
    }
}
