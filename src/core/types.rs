use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared kind of a field, deciding how raw record data is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Date,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "TEXT"),
            Self::Number => write!(f, "NUMBER"),
            Self::Date => write!(f, "DATE"),
        }
    }
}
