use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDateTime;
use thiserror::Error;

use super::model::{City, TripRecord, TripTable};

/// Timestamp layout used by all three cities' exports.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Anything that makes a city's dataset unusable for this cycle.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("cannot read the header row: {0}")]
    Header(#[source] csv::Error),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: {source}")]
    Record {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("row {row}: invalid start time '{value}': {source}")]
    Timestamp {
        row: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("row {row}: invalid trip duration '{value}'")]
    Duration { row: usize, value: String },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one city's trips from `<data_dir>/<city file>`.
///
/// Columns are located by header name, so the unnamed leading index column
/// of the source exports (and any other extra column) is ignored.  Gender
/// and Birth Year are optional at the table level; whether they were present
/// is recorded on the returned [`TripTable`].
pub fn load_city(data_dir: &Path, city: City) -> Result<TripTable, LoadError> {
    let path = data_dir.join(city.data_file());
    let started = Instant::now();

    let mut reader = csv::Reader::from_path(&path).map_err(|source| LoadError::Open {
        path: path.clone(),
        source,
    })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(LoadError::Header)?
        .iter()
        .map(str::to_string)
        .collect();
    let column = |name: &'static str| headers.iter().position(|h| h == name);
    let required = |name: &'static str| column(name).ok_or(LoadError::MissingColumn(name));

    let start_time_idx = required("Start Time")?;
    let duration_idx = required("Trip Duration")?;
    let start_station_idx = required("Start Station")?;
    let end_station_idx = required("End Station")?;
    let user_type_idx = required("User Type")?;

    let end_time_idx = column("End Time");
    let gender_idx = column("Gender");
    let birth_year_idx = column("Birth Year");

    let mut rows = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|source| LoadError::Record { row, source })?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let start_raw = field(start_time_idx);
        let start_time = NaiveDateTime::parse_from_str(start_raw, TIMESTAMP_FORMAT).map_err(
            |source| LoadError::Timestamp {
                row,
                value: start_raw.to_string(),
                source,
            },
        )?;

        let duration_raw = field(duration_idx);
        let duration_secs = parse_duration(duration_raw).ok_or_else(|| LoadError::Duration {
            row,
            value: duration_raw.to_string(),
        })?;

        // End Time is unused by every statistic; a malformed value is not
        // worth failing the load over.
        let end_time =
            end_time_idx.and_then(|i| NaiveDateTime::parse_from_str(field(i), TIMESTAMP_FORMAT).ok());
        let gender = gender_idx.and_then(|i| non_empty(field(i)));
        let birth_year = birth_year_idx.and_then(|i| parse_year(field(i)));

        rows.push(TripRecord::new(
            start_time,
            end_time,
            duration_secs,
            field(start_station_idx).to_string(),
            field(end_station_idx).to_string(),
            field(user_type_idx).to_string(),
            gender,
            birth_year,
        ));
    }

    log::info!(
        "loaded {} trips for {} in {:.2?}",
        rows.len(),
        city,
        started.elapsed()
    );

    Ok(TripTable {
        city,
        rows,
        has_gender: gender_idx.is_some(),
        has_birth_year: birth_year_idx.is_some(),
    })
}

// ---------------------------------------------------------------------------
// Cell parsing helpers
// ---------------------------------------------------------------------------

/// Chicago exports whole seconds, New York fractional ("671.0").  Both are
/// truncated to whole non-negative seconds.
fn parse_duration(s: &str) -> Option<u64> {
    if let Ok(secs) = s.parse::<u64>() {
        return Some(secs);
    }
    match s.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Some(secs as u64),
        _ => None,
    }
}

/// Birth years appear as floats ("1992.0"); an empty or malformed cell is an
/// individual missing value, distinct from the column being absent.
fn parse_year(s: &str) -> Option<i32> {
    if s.is_empty() {
        return None;
    }
    if let Ok(year) = s.parse::<i32>() {
        return Some(year);
    }
    match s.parse::<f64>() {
        Ok(year) if year.is_finite() => Some(year as i32),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    const CHICAGO_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
0,2017-01-02 09:15:00,2017-01-02 09:25:00,600,Clark & Lake,Canal & Madison,Subscriber,Male,1985.0
1,2017-02-07 18:05:00,,671.0,Canal & Madison,Clark & Lake,Customer,,
";

    const WASHINGTON_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
0,2017-03-01 07:00:00,2017-03-01 07:10:00,612.5,14th & V St,Georgia Ave,Subscriber
";

    #[test]
    fn loads_full_schema_and_derives_calendar_fields() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "chicago.csv", CHICAGO_CSV);

        let table = load_city(dir.path(), City::Chicago).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.has_gender);
        assert!(table.has_birth_year);

        let first = &table.rows[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.weekday, Weekday::Mon);
        assert_eq!(first.start_hour, 9);
        assert_eq!(first.duration_secs, 600);
        assert_eq!(first.gender.as_deref(), Some("Male"));
        assert_eq!(first.birth_year, Some(1985));
        assert!(first.end_time.is_some());

        // Fractional duration truncates; empty Gender / Birth Year cells are
        // individual missing values.
        let second = &table.rows[1];
        assert_eq!(second.duration_secs, 671);
        assert_eq!(second.gender, None);
        assert_eq!(second.birth_year, None);
        assert_eq!(second.end_time, None);
    }

    #[test]
    fn washington_schema_lacks_demographics() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "washington.csv", WASHINGTON_CSV);

        let table = load_city(dir.path(), City::Washington).unwrap();
        assert_eq!(table.len(), 1);
        assert!(!table.has_gender);
        assert!(!table.has_birth_year);
        assert_eq!(table.rows[0].duration_secs, 612);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_city(dir.path(), City::Chicago).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "chicago.csv",
            ",Start Time,Trip Duration,Start Station,End Station\n0,2017-01-02 09:15:00,600,A,B\n",
        );
        let err = load_city(dir.path(), City::Chicago).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("User Type")));
    }

    #[test]
    fn unparsable_start_time_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "chicago.csv",
            ",Start Time,Trip Duration,Start Station,End Station,User Type\n0,not-a-date,600,A,B,Subscriber\n",
        );
        let err = load_city(dir.path(), City::Chicago).unwrap_err();
        assert!(matches!(err, LoadError::Timestamp { row: 0, .. }));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "chicago.csv",
            ",Start Time,Trip Duration,Start Station,End Station,User Type\n0,2017-01-02 09:15:00,-5,A,B,Subscriber\n",
        );
        let err = load_city(dir.path(), City::Chicago).unwrap_err();
        assert!(matches!(err, LoadError::Duration { row: 0, .. }));
    }
}
