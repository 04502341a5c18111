//! Daily tracker data types.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How a tracker challenge's daily value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChallengeKind {
    /// 1 for done, 0 for not done.
    Boolean,
    /// Any count compared against the goal.
    Numeric,
    /// Minutes compared against the goal.
    Duration,
}

impl ChallengeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeKind::Boolean => "BOOLEAN",
            ChallengeKind::Numeric => "NUMERIC",
            ChallengeKind::Duration => "DURATION",
        }
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BOOLEAN" => Ok(ChallengeKind::Boolean),
            "NUMERIC" => Ok(ChallengeKind::Numeric),
            "DURATION" => Ok(ChallengeKind::Duration),
            _ => Err(ValidationError::InvalidValue {
                field: "type".to_string(),
                message: format!("unknown challenge type '{s}'"),
            }),
        }
    }
}

/// Which side of the goal counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalDirection {
    Minimize,
    #[default]
    Maximize,
}

impl GoalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalDirection::Minimize => "minimize",
            GoalDirection::Maximize => "maximize",
        }
    }
}

impl FromStr for GoalDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimize" => Ok(GoalDirection::Minimize),
            "maximize" => Ok(GoalDirection::Maximize),
            _ => Err(ValidationError::InvalidValue {
                field: "goal_direction".to_string(),
                message: format!("unknown goal direction '{s}'"),
            }),
        }
    }
}

/// Streak data persisted for the user's participation in a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParticipantData {
    pub current_streak: i64,
    pub best_streak: i64,
}

/// A challenge exposed for day-granularity tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerChallenge {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    #[serde(default)]
    pub goal_value: Option<f64>,
    #[serde(default)]
    pub goal_direction: Option<GoalDirection>,
    #[serde(default)]
    pub participant_data: Option<ParticipantData>,
}

impl TrackerChallenge {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: ChallengeKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            goal_value: None,
            goal_direction: None,
            participant_data: None,
        }
    }

    pub fn with_goal(mut self, value: f64, direction: GoalDirection) -> Self {
        self.goal_value = Some(value);
        self.goal_direction = Some(direction);
        self
    }

    pub fn current_streak(&self) -> i64 {
        self.participant_data.map_or(0, |p| p.current_streak)
    }
}

/// One observation for a (challenge, date) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entry {
    pub fn new(value: f64) -> Self {
        Self { value, notes: None }
    }
}

/// Display classification of a tracker cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// No entry recorded.
    Empty,
    Success,
    Failed,
    /// A value was recorded but there is nothing to compare it against.
    Neutral,
}

/// Entries keyed by date, then by tracker challenge id.
pub type EntriesByDate = BTreeMap<NaiveDate, HashMap<String, Entry>>;

/// Look up the entry for a cell; absent dates and ids are simply `None`.
pub fn entry_for<'a>(
    entries: &'a EntriesByDate,
    date: NaiveDate,
    challenge_id: &str,
) -> Option<&'a Entry> {
    entries.get(&date)?.get(challenge_id)
}
