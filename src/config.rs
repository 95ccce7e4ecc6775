use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::core::{EngineError, Result};

/// Engine configuration
///
/// Holds the one canonical timezone policy used to turn timestamps into
/// calendar days, plus the field names the completion rule reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Fixed UTC offset for calendar-day normalization, in minutes
    pub utc_offset_minutes: i32,

    /// Group key for records whose key field is missing or empty
    pub fallback_group_key: String,

    /// Field carrying the workflow status
    pub status_field: String,

    /// Status value that marks a record as fully completed
    pub completed_status: String,

    /// Field carrying the requested quantity
    pub quantity_field: String,

    /// Field carrying the explicitly reported completed quantity
    pub completed_quantity_field: String,

    /// Interval between background re-fetches
    pub poll_interval_ms: u64,

    /// Number of filter chips listed before collapsing into "+N more"
    pub chip_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330, // +05:30
            fallback_group_key: "unassigned".to_string(),
            status_field: "status".to_string(),
            completed_status: "completed".to_string(),
            quantity_field: "quantity".to_string(),
            completed_quantity_field: "completedQuantity".to_string(),
            poll_interval_ms: 4000,
            chip_limit: 4,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document; missing keys keep their defaults.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the calendar-day offset in minutes east of UTC
    pub fn utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Set the fallback group key
    pub fn fallback_group_key(mut self, key: &str) -> Self {
        self.fallback_group_key = key.to_string();
        self
    }

    /// Set the status field and the value that means "completed"
    pub fn completion_status(mut self, field: &str, completed: &str) -> Self {
        self.status_field = field.to_string();
        self.completed_status = completed.to_string();
        self
    }

    /// Set the quantity and completed-quantity field names
    pub fn quantity_fields(mut self, quantity: &str, completed_quantity: &str) -> Self {
        self.quantity_field = quantity.to_string();
        self.completed_quantity_field = completed_quantity.to_string();
        self
    }

    /// Set the polling interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set how many chips are listed before the overflow count
    pub fn chip_limit(mut self, limit: usize) -> Self {
        self.chip_limit = limit;
        self
    }

    pub fn poll_interval_duration(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The configured offset as a chrono timezone.
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                EngineError::InvalidConfig(format!(
                    "utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ))
            })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.offset()?;

        if self.fallback_group_key.is_empty() {
            return Err(EngineError::InvalidConfig(
                "fallback_group_key cannot be empty".to_string(),
            ));
        }

        if self.quantity_field.is_empty() || self.completed_quantity_field.is_empty() {
            return Err(EngineError::InvalidConfig(
                "quantity fields cannot be empty".to_string(),
            ));
        }

        if self.status_field.is_empty() {
            return Err(EngineError::InvalidConfig(
                "status_field cannot be empty".to_string(),
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new();
        assert_eq!(config.utc_offset_minutes, 330);
        assert_eq!(config.fallback_group_key, "unassigned");
        assert_eq!(config.poll_interval_duration(), Duration::from_millis(4000));
        assert_eq!(config.offset().unwrap().local_minus_utc(), 330 * 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .utc_offset_minutes(-420)
            .fallback_group_key("unknown")
            .completion_status("state", "done")
            .quantity_fields("qty", "doneQty")
            .poll_interval(Duration::from_secs(10))
            .chip_limit(2);

        assert_eq!(config.offset().unwrap().local_minus_utc(), -420 * 60);
        assert_eq!(config.fallback_group_key, "unknown");
        assert_eq!(config.status_field, "state");
        assert_eq!(config.completed_status, "done");
        assert_eq!(config.quantity_field, "qty");
        assert_eq!(config.completed_quantity_field, "doneQty");
        assert_eq!(config.poll_interval_ms, 10_000);
        assert_eq!(config.chip_limit, 2);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json_str(r#"{"utcOffsetMinutes": 0, "chipLimit": 6}"#).unwrap();
        assert_eq!(config.utc_offset_minutes, 0);
        assert_eq!(config.chip_limit, 6);
        assert_eq!(config.completed_status, "completed");
    }

    #[test]
    fn test_validation() {
        assert!(EngineConfig::new().utc_offset_minutes(24 * 60).validate().is_err());
        assert!(EngineConfig::new().fallback_group_key("").validate().is_err());
        assert!(EngineConfig::new().poll_interval(Duration::ZERO).validate().is_err());
        assert!(EngineConfig::from_json_str(r#"{"pollIntervalMs": 0}"#).is_err());
        assert!(matches!(
            EngineConfig::from_json_str("not json"),
            Err(EngineError::Parse(_))
        ));
    }
}
