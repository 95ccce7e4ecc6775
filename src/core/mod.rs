pub mod error;
pub mod record;
pub mod types;
pub mod value;

pub use error::{EngineError, Result};
pub use record::Record;
pub use types::FieldKind;
pub use value::Value;
