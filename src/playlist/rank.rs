//! Deduplication and ranking.

use std::collections::HashSet;

use crate::feed::{Limit, Record, SortMode};

/// Reference instant (seconds since the Unix epoch) for the `hot` score.
pub const HOT_EPOCH: i64 = 1_134_028_003;

/// Seconds of age worth one order of magnitude of vote margin.
pub const HOT_DECAY_SECONDS: f64 = 45_000.0;

/// Drop records whose URL was already seen. First occurrence wins and the
/// order of kept records is unchanged.
pub fn remove_duplicates(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.url.clone()))
        .collect()
}

/// Raw vote margin.
pub fn top(record: &Record) -> f64 {
    record.score() as f64
}

/// Vote margin decayed by age, rounded to 7 decimal places.
pub fn hot(record: &Record) -> f64 {
    let score = record.score();
    let order = (score.unsigned_abs().max(1) as f64).log10();
    let sign = score.signum() as f64;
    let seconds = (record.created_utc - HOT_EPOCH) as f64;

    let value = order + sign * seconds / HOT_DECAY_SECONDS;
    round_decimals(value, 7)
}

/// Round to `places` decimals from the exact binary value, the way decimal
/// formatting does. Scaling by a power of ten first can carry a rounding
/// error across the half-way point.
///
/// Negative zero comes back as zero so it ties with zero under `total_cmp`.
fn round_decimals(value: f64, places: usize) -> f64 {
    let rounded: f64 = format!("{value:.places$}").parse().unwrap_or(value);
    rounded + 0.0
}

impl SortMode {
    /// Scoring function for this mode.
    pub fn scorer(self) -> fn(&Record) -> f64 {
        match self {
            SortMode::Top => top,
            SortMode::Hot => hot,
        }
    }
}

/// Order `records` best-first and keep the first `limit`.
///
/// Equal scores end up newest-first: the list is stably sorted by age before
/// the stable score sort.
pub fn rank(records: &mut Vec<Record>, sort: SortMode, limit: Limit) {
    let score = sort.scorer();
    records.sort_by(|a, b| b.created_utc.cmp(&a.created_utc));
    records.sort_by(|a, b| score(b).total_cmp(&score(a)));
    records.truncate(limit.get());
}
