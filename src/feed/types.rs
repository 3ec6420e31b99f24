//! Feed types for flock.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{FlockError, Result};

/// Largest number of records a caller may ask for.
pub const MAX_LIMIT: u8 = 100;

/// Keys a [`Record`] keeps from a raw feed entry. Everything else is dropped.
pub const RECORD_FIELDS: [&str; 10] = [
    "id",
    "title",
    "url",
    "permalink",
    "num_comments",
    "ups",
    "downs",
    "author",
    "feed_name",
    "created_utc",
];

/// One normalized submission linking to a video.
///
/// Built only through [`Record::project`] (or deserialization of a cached
/// record list), so it never carries more than [`RECORD_FIELDS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Feed-assigned identifier.
    pub id: String,
    /// Entity-decoded title.
    pub title: String,
    /// Canonical `http://www.youtube.com/watch?v=<id>` URL.
    pub url: String,
    /// Absolute URL of the submission on the feed site.
    pub permalink: String,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub ups: u64,
    #[serde(default)]
    pub downs: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    /// Feed the record is attributed to.
    #[serde(default, deserialize_with = "null_as_default")]
    pub feed_name: String,
    /// Seconds since the Unix epoch.
    #[serde(deserialize_with = "seconds_from_number")]
    pub created_utc: i64,
}

impl Record {
    /// Build a record from a raw entry, keeping only the whitelisted keys.
    ///
    /// Projecting the entry form of an existing record yields the same record.
    pub fn project(entry: &Map<String, Value>) -> Result<Self> {
        let kept: Map<String, Value> = RECORD_FIELDS
            .iter()
            .filter_map(|key| entry.get(*key).map(|v| ((*key).to_string(), v.clone())))
            .collect();

        serde_json::from_value(Value::Object(kept))
            .map_err(|e| FlockError::Parse(format!("invalid feed entry: {e}")))
    }

    /// The record as a JSON object keyed by [`RECORD_FIELDS`].
    pub fn to_entry(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Net votes (`ups - downs`).
    pub fn score(&self) -> i64 {
        self.ups as i64 - self.downs as i64
    }
}

fn null_as_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// The feed API reports timestamps as floats ("1385412345.0").
fn seconds_from_number<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = f64::deserialize(deserializer)?;
    Ok(seconds as i64)
}

/// Ranking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Raw vote margin.
    #[default]
    Top,
    /// Time-decayed popularity.
    Hot,
}

impl SortMode {
    /// Value used in feed URLs and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Top => "top",
            SortMode::Hot => "hot",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = FlockError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top" => Ok(SortMode::Top),
            "hot" => Ok(SortMode::Hot),
            other => Err(FlockError::Validation(format!(
                "Invalid sort type: {other}"
            ))),
        }
    }
}

/// Recency filter applied by the feed API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
    Month,
    Year,
    All,
}

impl TimeWindow {
    /// Value used in feed URLs and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Year => "year",
            TimeWindow::All => "all",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = FlockError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            "month" => Ok(TimeWindow::Month),
            "year" => Ok(TimeWindow::Year),
            "all" => Ok(TimeWindow::All),
            other => Err(FlockError::Validation(format!(
                "Invalid time type: {other}"
            ))),
        }
    }
}

/// Number of records to keep after ranking, in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Limit(u8);

impl Limit {
    /// Create a limit, rejecting values outside `1..=100`.
    pub fn new(value: u32) -> Result<Self> {
        if (1..=MAX_LIMIT as u32).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(FlockError::Validation(format!("Invalid limit: {value}")))
        }
    }

    /// The limit as a count.
    pub fn get(&self) -> usize {
        self.0 as usize
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self(MAX_LIMIT)
    }
}

impl FromStr for Limit {
    type Err = FlockError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u32>()
            .map_err(|_| FlockError::Validation(format!("Invalid limit: {s}")))
            .and_then(Limit::new)
    }
}

/// Split a user-supplied feed list into unique names, keeping first-seen order.
///
/// Names may be separated by whitespace or `+`. Duplicates are compared
/// case-insensitively.
pub fn parse_feed_names(input: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    input
        .split(|c: char| c.is_whitespace() || c == '+')
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(str::to_string)
        .collect()
}
