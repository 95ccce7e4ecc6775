use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::core::Result;
use crate::core::value::{json_number_text, parse_number};

/// A declarative single-field filter criterion.
///
/// The JSON form is externally tagged, e.g. `{"text": {"contains": "lamp"}}`
/// or `{"enum": {"in": ["A", "B"]}}`. A default spec of any kind matches
/// every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterSpec {
    Text(TextFilter),
    Numeric(NumericFilter),
    Enum(EnumFilter),
    Date(DateFilter),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextFilter {
    pub contains: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericFilter {
    #[serde(deserialize_with = "lenient_bound")]
    pub min: Option<f64>,
    #[serde(deserialize_with = "lenient_bound")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumFilter {
    #[serde(rename = "in", deserialize_with = "lenient_set")]
    pub values: IndexSet<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    #[default]
    None,
    Single,
    Range,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFilter {
    pub mode: DateMode,
    #[serde(deserialize_with = "lenient_day")]
    pub single: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_day")]
    pub from: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_day")]
    pub to: Option<NaiveDate>,
}

impl FilterSpec {
    pub fn contains(needle: impl Into<String>) -> Self {
        Self::Text(TextFilter {
            contains: needle.into(),
        })
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self::Numeric(NumericFilter { min, max })
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(EnumFilter {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn on_day(day: NaiveDate) -> Self {
        Self::Date(DateFilter {
            mode: DateMode::Single,
            single: Some(day),
            ..DateFilter::default()
        })
    }

    pub fn between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self::Date(DateFilter {
            mode: DateMode::Range,
            from,
            to,
            ..DateFilter::default()
        })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Numeric(_) => "numeric",
            Self::Enum(_) => "enum",
            Self::Date(_) => "date",
        }
    }

    /// Number of badge units this spec contributes.
    ///
    /// Numeric specs count once per bound actually set; every other kind
    /// counts once when populated.
    pub fn active_units(&self) -> usize {
        match self {
            Self::Text(f) => usize::from(!f.contains.is_empty()),
            Self::Numeric(f) => usize::from(f.min.is_some()) + usize::from(f.max.is_some()),
            Self::Enum(f) => usize::from(!f.values.is_empty()),
            Self::Date(f) => usize::from(f.is_active()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_units() > 0
    }
}

impl DateFilter {
    pub fn is_active(&self) -> bool {
        match self.mode {
            DateMode::None => false,
            DateMode::Single => self.single.is_some(),
            DateMode::Range => self.from.is_some() || self.to.is_some(),
        }
    }
}

/// Active filters keyed by field name. Entries combine with logical AND.
///
/// Deserializing never fails on a bad entry; see [`FilterSet::from_json`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilterSet {
    entries: IndexMap<String, FilterSpec>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a JSON object, entry by entry.
    ///
    /// Entries that do not parse are dropped, which leaves the field at its
    /// default always-match state.
    pub fn from_json(raw: &JsonValue) -> Self {
        let mut set = Self::new();
        let Some(map) = raw.as_object() else {
            warn!("Filter set is not an object, treating as empty: {}", raw);
            return set;
        };
        for (field, entry) in map {
            match serde_json::from_value::<FilterSpec>(entry.clone()) {
                Ok(spec) => set.set(field.clone(), spec),
                Err(err) => warn!("Ignoring malformed filter for '{}': {}", field, err),
            }
        }
        set
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let raw: JsonValue = serde_json::from_str(input)?;
        Ok(Self::from_json(&raw))
    }

    pub fn with(mut self, field: impl Into<String>, spec: FilterSpec) -> Self {
        self.set(field, spec);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, spec: FilterSpec) {
        self.entries.insert(field.into(), spec);
    }

    pub fn get(&self, field: &str) -> Option<&FilterSpec> {
        self.entries.get(field)
    }

    /// Reset one field to its default.
    pub fn clear(&mut self, field: &str) -> Option<FilterSpec> {
        self.entries.shift_remove(field)
    }

    /// Reset every field to its default.
    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterSpec)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Badge count: how many individual criteria are in a non-default state.
    pub fn active_count(&self) -> usize {
        self.entries.values().map(FilterSpec::active_units).sum()
    }
}

impl<'de> Deserialize<'de> for FilterSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = JsonValue::deserialize(deserializer)?;
        Ok(Self::from_json(&raw))
    }
}

fn lenient_bound<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = JsonValue::deserialize(deserializer)?;
    let bound = match raw {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) if s.trim().is_empty() => None,
        JsonValue::String(s) => Some(parse_number(&s)),
        _ => None,
    };
    Ok(bound.filter(|b| b.is_finite()))
}

fn lenient_day<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = JsonValue::deserialize(deserializer)?;
    Ok(raw
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

fn lenient_set<'de, D>(deserializer: D) -> std::result::Result<IndexSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = JsonValue::deserialize(deserializer)?;
    let items = match raw {
        JsonValue::Array(items) => items,
        JsonValue::Null => Vec::new(),
        single => vec![single],
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            JsonValue::String(s) => Some(s),
            JsonValue::Number(n) => Some(json_number_text(&n)),
            JsonValue::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect())
}
