use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One opaque data row from the backend: a task, assignment, order or
/// listing-completion entry.
///
/// The engine only reads records. Edits go back through the API and come
/// back as a fresh list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(JsonValue);

impl Record {
    pub fn new(raw: JsonValue) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_raw(self) -> JsonValue {
        self.0
    }

    /// Walk a dotted path such as `task.sourcePlatform.name`.
    ///
    /// Numeric segments index into arrays. Any missing hop yields `None`.
    pub fn resolve(&self, path: &str) -> Option<&JsonValue> {
        if path.is_empty() {
            return Some(&self.0);
        }
        let mut current = &self.0;
        for segment in path.split('.') {
            current = match current {
                JsonValue::Object(map) => map.get(segment)?,
                JsonValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Stable identity used for list diffing (`_id`, falling back to `id`).
    pub fn id(&self) -> Option<String> {
        ["_id", "id"].iter().find_map(|key| match self.0.get(key)? {
            JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

impl From<JsonValue> for Record {
    fn from(raw: JsonValue) -> Self {
        Self(raw)
    }
}
