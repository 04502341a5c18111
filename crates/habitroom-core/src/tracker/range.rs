//! Date ranges for the tracker's view modes.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Calendar-day key format used for entries.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// How many days the tracker grid shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Yesterday and today.
    #[default]
    Daily,
    /// The last 8 days, today included.
    Weekly,
    /// The last 31 days, today included.
    Monthly,
}

impl ViewMode {
    /// Number of days in the range.
    pub fn span_days(&self) -> u64 {
        match self {
            ViewMode::Daily => 2,
            ViewMode::Weekly => 8,
            ViewMode::Monthly => 31,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Daily => "daily",
            ViewMode::Weekly => "weekly",
            ViewMode::Monthly => "monthly",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(ViewMode::Daily),
            "weekly" | "week" => Ok(ViewMode::Weekly),
            "monthly" | "month" => Ok(ViewMode::Monthly),
            _ => Err(ValidationError::InvalidValue {
                field: "view".to_string(),
                message: format!("unknown view mode '{s}'"),
            }),
        }
    }
}

/// Dates shown for `view_mode`, oldest first and ending at `today`.
pub fn date_range(view_mode: ViewMode, today: NaiveDate) -> Vec<NaiveDate> {
    (0..view_mode.span_days())
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect()
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` key.
pub fn parse_date_key(key: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).map_err(|e| {
        ValidationError::InvalidValue {
            field: "date".to_string(),
            message: format!("'{key}' is not a YYYY-MM-DD date: {e}"),
        }
    })
}
