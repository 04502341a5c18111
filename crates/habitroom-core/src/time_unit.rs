//! Time-unit arithmetic.
//!
//! Converts the span between two instants into a whole number of units and
//! advances an instant by a whole number of units. Seconds through weeks are
//! fixed-size and handled with millisecond arithmetic; months are calendar
//! months and go through chrono's month addition, which clamps to the last
//! valid day (Jan 31 + 1 month = Feb 28/29).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
const MS_PER_WEEK: i64 = 7 * MS_PER_DAY;

/// Unit a challenge expresses its elapsed and streak values in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl TimeUnit {
    /// Every unit, smallest first.
    pub const ALL: [TimeUnit; 6] = [
        TimeUnit::Seconds,
        TimeUnit::Minutes,
        TimeUnit::Hours,
        TimeUnit::Days,
        TimeUnit::Weeks,
        TimeUnit::Months,
    ];

    /// Fixed size of the unit in milliseconds, `None` for calendar months.
    pub fn fixed_millis(&self) -> Option<i64> {
        match self {
            TimeUnit::Seconds => Some(MS_PER_SECOND),
            TimeUnit::Minutes => Some(MS_PER_MINUTE),
            TimeUnit::Hours => Some(MS_PER_HOUR),
            TimeUnit::Days => Some(MS_PER_DAY),
            TimeUnit::Weeks => Some(MS_PER_WEEK),
            TimeUnit::Months => None,
        }
    }

    /// Lowercase identifier, also used for storage and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
            TimeUnit::Months => "months",
        }
    }

    /// Display label, singular for exactly one unit.
    pub fn label(&self, value: i64) -> &'static str {
        if value == 1 {
            match self {
                TimeUnit::Seconds => "second",
                TimeUnit::Minutes => "minute",
                TimeUnit::Hours => "hour",
                TimeUnit::Days => "day",
                TimeUnit::Weeks => "week",
                TimeUnit::Months => "month",
            }
        } else {
            self.as_str()
        }
    }

    /// How many of this unit fit in one day. Weeks and months are
    /// approximations (1/7 and 1/30) used only for display conversions.
    pub fn units_per_day(&self) -> f64 {
        match self {
            TimeUnit::Seconds => 86_400.0,
            TimeUnit::Minutes => 1_440.0,
            TimeUnit::Hours => 24.0,
            TimeUnit::Days => 1.0,
            TimeUnit::Weeks => 1.0 / 7.0,
            TimeUnit::Months => 1.0 / 30.0,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "time_unit".to_string(),
                message: format!("unknown time unit '{s}'"),
            })
    }
}

/// Whole units elapsed between `from` and `to`.
///
/// Fixed-size units use floor division, so a negative span rounds toward
/// negative infinity. Months count whole calendar months: the largest `n`
/// (toward zero) such that advancing `from` by `n` months does not pass `to`.
pub fn elapsed_units(from: DateTime<Utc>, to: DateTime<Utc>, unit: TimeUnit) -> i64 {
    match unit.fixed_millis() {
        Some(unit_ms) => (to - from).num_milliseconds().div_euclid(unit_ms),
        None => whole_months_between(from, to),
    }
}

/// Advance `instant` by `amount` whole units.
///
/// Results outside chrono's representable range saturate at the boundary.
pub fn advance_instant(instant: DateTime<Utc>, amount: i64, unit: TimeUnit) -> DateTime<Utc> {
    let advanced = match unit.fixed_millis() {
        Some(unit_ms) => amount
            .checked_mul(unit_ms)
            .and_then(Duration::try_milliseconds)
            .and_then(|delta| instant.checked_add_signed(delta)),
        None => add_months(instant, amount),
    };

    advanced.unwrap_or(if amount >= 0 {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    })
}

fn add_months(instant: DateTime<Utc>, amount: i64) -> Option<DateTime<Utc>> {
    let months = Months::new(u32::try_from(amount.unsigned_abs()).ok()?);
    if amount >= 0 {
        instant.checked_add_months(months)
    } else {
        instant.checked_sub_months(months)
    }
}

fn whole_months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let mut months = i64::from(to.year() - from.year()) * 12 + i64::from(to.month())
        - i64::from(from.month());

    // The calendar-month difference overshoots by one when the day/time of
    // `to` falls before that of `from` within the month.
    if months > 0 && add_months(from, months).map_or(true, |t| t > to) {
        months -= 1;
    } else if months < 0 && add_months(from, months).map_or(true, |t| t < to) {
        months += 1;
    }
    months
}

/// Human-friendly rendering of a value, breaking sub-day units into larger
/// parts: 150 seconds becomes "2 minutes 30 seconds". Days, weeks and months
/// are printed as-is.
pub fn smart_display(value: i64, unit: TimeUnit) -> String {
    let unit_seconds = match unit {
        TimeUnit::Seconds => 1,
        TimeUnit::Minutes => 60,
        TimeUnit::Hours => 3_600,
        TimeUnit::Days | TimeUnit::Weeks | TimeUnit::Months => {
            return format!("{} {}", value, unit.label(value));
        }
    };

    let mut remaining = value.saturating_mul(unit_seconds);
    if remaining <= 0 {
        return format!("{} {}", value, unit.label(value));
    }

    let mut parts = Vec::new();
    for (size, part_unit) in [
        (86_400, TimeUnit::Days),
        (3_600, TimeUnit::Hours),
        (60, TimeUnit::Minutes),
        (1, TimeUnit::Seconds),
    ] {
        if remaining >= size {
            let count = remaining / size;
            parts.push(format!("{} {}", count, part_unit.label(count)));
            remaining %= size;
        }
    }
    parts.join(" ")
}
