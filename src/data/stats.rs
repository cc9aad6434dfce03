use std::collections::BTreeMap;

use chrono::Weekday;
use thiserror::Error;

use super::model::TripTable;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a statistic group (or a part of one) could not be computed.  These
/// degrade to an informational line in the report; they never abort the
/// sibling groups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("no data for the selected filters")]
    EmptyDataset,
    #[error("{0} data unavailable")]
    MissingColumn(&'static str),
}

// ---------------------------------------------------------------------------
// Report structures
// ---------------------------------------------------------------------------

/// Most frequent travel times.  All three are modes over non-empty columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeStats {
    /// 1-based month number of the most common month.
    pub month: u32,
    pub weekday: Weekday,
    /// Most common start hour (0–23).
    pub hour: u32,
}

/// Most popular stations and station pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationStats {
    pub start: String,
    pub end: String,
    /// Most frequent (start, end) combination.
    pub trip: (String, String),
}

/// Trip duration totals, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationStats {
    pub total_secs: u64,
    pub mean_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthYearStats {
    pub earliest: i32,
    pub latest: i32,
    pub most_common: i32,
}

/// Rider demographics.  Gender and birth year carry their own results so
/// that a city without those columns still reports its user-type counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub user_types: BTreeMap<String, usize>,
    pub genders: Result<BTreeMap<String, usize>, StatsError>,
    pub birth_years: Result<BirthYearStats, StatsError>,
}

/// The four independent statistic groups over one filtered table.
#[derive(Debug, Clone)]
pub struct Report {
    pub time: Result<TimeStats, StatsError>,
    pub stations: Result<StationStats, StatsError>,
    pub durations: Result<DurationStats, StatsError>,
    pub users: Result<UserStats, StatsError>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Weekdays in Monday-first order, matching `Weekday::num_days_from_monday`.
const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Compute all four groups over the same immutable table.  The groups are
/// independent read-only passes, so they run in parallel.
pub fn compute(table: &TripTable) -> Report {
    let ((time, stations), (durations, users)) = rayon::join(
        || rayon::join(|| time_stats(table), || station_stats(table)),
        || rayon::join(|| duration_stats(table), || user_stats(table)),
    );
    Report {
        time,
        stations,
        durations,
        users,
    }
}

/// Most frequent month, weekday and start hour.
///
/// Every mode in this module breaks ties by the smallest key: earliest
/// month, earliest weekday (Monday first), smallest hour, lexicographically
/// smallest station or pair, smallest birth year.
pub fn time_stats(table: &TripTable) -> Result<TimeStats, StatsError> {
    if table.is_empty() {
        return Err(StatsError::EmptyDataset);
    }

    let mut months = [0usize; 12];
    let mut days = [0usize; 7];
    let mut hours = [0usize; 24];
    for trip in &table.rows {
        months[trip.month as usize - 1] += 1;
        days[trip.weekday.num_days_from_monday() as usize] += 1;
        hours[trip.start_hour as usize] += 1;
    }

    Ok(TimeStats {
        month: index_mode(&months) as u32 + 1,
        weekday: WEEKDAYS[index_mode(&days)],
        hour: index_mode(&hours) as u32,
    })
}

/// Most frequent start station, end station and (start, end) pair.
pub fn station_stats(table: &TripTable) -> Result<StationStats, StatsError> {
    let mut starts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut ends: BTreeMap<&str, usize> = BTreeMap::new();
    let mut pairs: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for trip in &table.rows {
        *starts.entry(&trip.start_station).or_insert(0) += 1;
        *ends.entry(&trip.end_station).or_insert(0) += 1;
        *pairs
            .entry((&trip.start_station, &trip.end_station))
            .or_insert(0) += 1;
    }

    let start = map_mode(&starts).ok_or(StatsError::EmptyDataset)?;
    let end = map_mode(&ends).ok_or(StatsError::EmptyDataset)?;
    let (trip_start, trip_end) = map_mode(&pairs).ok_or(StatsError::EmptyDataset)?;

    Ok(StationStats {
        start: start.to_string(),
        end: end.to_string(),
        trip: (trip_start.to_string(), trip_end.to_string()),
    })
}

/// Total and mean trip duration, truncated to whole seconds.
pub fn duration_stats(table: &TripTable) -> Result<DurationStats, StatsError> {
    if table.is_empty() {
        return Err(StatsError::EmptyDataset);
    }
    let total_secs: u64 = table.rows.iter().map(|trip| trip.duration_secs).sum();
    Ok(DurationStats {
        total_secs,
        mean_secs: total_secs / table.len() as u64,
    })
}

/// User-type counts plus, where the city publishes them, gender counts and
/// birth-year extremes.  Counting succeeds even over zero rows, yielding an
/// empty frequency table.
pub fn user_stats(table: &TripTable) -> Result<UserStats, StatsError> {
    let mut user_types: BTreeMap<String, usize> = BTreeMap::new();
    for trip in &table.rows {
        *user_types.entry(trip.user_type.clone()).or_insert(0) += 1;
    }

    let genders = if table.has_gender {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for trip in &table.rows {
            if let Some(gender) = &trip.gender {
                *counts.entry(gender.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    } else {
        Err(StatsError::MissingColumn("gender"))
    };

    Ok(UserStats {
        user_types,
        genders,
        birth_years: birth_year_stats(table),
    })
}

fn birth_year_stats(table: &TripTable) -> Result<BirthYearStats, StatsError> {
    if !table.has_birth_year {
        return Err(StatsError::MissingColumn("birth year"));
    }
    // Individual missing values are ignored; only a fully empty column (or
    // an empty table) has no defined min/max/mode.
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for trip in &table.rows {
        if let Some(year) = trip.birth_year {
            *counts.entry(year).or_insert(0) += 1;
        }
    }
    let earliest = *counts.keys().next().ok_or(StatsError::EmptyDataset)?;
    let latest = *counts.keys().next_back().ok_or(StatsError::EmptyDataset)?;
    let most_common = *map_mode(&counts).ok_or(StatsError::EmptyDataset)?;
    Ok(BirthYearStats {
        earliest,
        latest,
        most_common,
    })
}

// ---------------------------------------------------------------------------
// Mode helpers
// ---------------------------------------------------------------------------

/// Index of the largest count; ties go to the smallest index.
fn index_mode(counts: &[usize]) -> usize {
    let mut best = 0;
    for (i, &count) in counts.iter().enumerate().skip(1) {
        if count > counts[best] {
            best = i;
        }
    }
    best
}

/// Key with the largest count; ties go to the smallest key, which is the
/// first one encountered in the map's ascending iteration order.
fn map_mode<'a, K: Ord>(counts: &'a BTreeMap<K, usize>) -> Option<&'a K> {
    let mut best: Option<(&K, usize)> = None;
    for (key, &count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(key, _)| key)
}
