use std::fmt;

use chrono::{Datelike, Month, NaiveDateTime, Timelike, Weekday};

// ---------------------------------------------------------------------------
// City – the fixed set of supported datasets
// ---------------------------------------------------------------------------

/// One of the three cities with published trip data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

impl City {
    /// File name of this city's dataset inside the data directory.
    pub fn data_file(self) -> &'static str {
        match self {
            City::Chicago => "chicago.csv",
            City::NewYorkCity => "new_york_city.csv",
            City::Washington => "washington.csv",
        }
    }

    /// Parse a user-entered city name.  Case-insensitive; accepts both
    /// "new york city" and "new-york-city".
    pub fn parse(input: &str) -> Option<City> {
        let normalized = input.trim().to_ascii_lowercase().replace('-', " ");
        match normalized.as_str() {
            "chicago" => Some(City::Chicago),
            "new york city" => Some(City::NewYorkCity),
            "washington" => Some(City::Washington),
            _ => None,
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new york city",
            City::Washington => "washington",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Calendar name tables
// ---------------------------------------------------------------------------

/// Trip data is only published for the first half of the year.
pub const LAST_AVAILABLE_MONTH: u32 = 6;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Full English month name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month as usize - 1) % 12]
}

/// Full English weekday name.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ---------------------------------------------------------------------------
// TripRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single recorded trip with its derived calendar fields.
///
/// `month`, `weekday` and `start_hour` are computed once from `start_time`
/// at construction and never recomputed.
#[derive(Debug, Clone)]
pub struct TripRecord {
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    /// Trip length in whole seconds, non-negative by construction.
    pub duration_secs: u64,
    pub start_station: String,
    pub end_station: String,
    pub user_type: String,
    /// None when the cell is empty or the column is absent for this city.
    pub gender: Option<String>,
    pub birth_year: Option<i32>,

    /// 1-based month of `start_time` (January = 1).
    pub month: u32,
    pub weekday: Weekday,
    /// Hour of `start_time` (0–23).
    pub start_hour: u32,
}

impl TripRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        start_time: NaiveDateTime,
        end_time: Option<NaiveDateTime>,
        duration_secs: u64,
        start_station: String,
        end_station: String,
        user_type: String,
        gender: Option<String>,
        birth_year: Option<i32>,
    ) -> Self {
        Self {
            month: start_time.month(),
            weekday: start_time.weekday(),
            start_hour: start_time.hour(),
            start_time,
            end_time,
            duration_secs,
            start_station,
            end_station,
            user_type,
            gender,
            birth_year,
        }
    }
}

// ---------------------------------------------------------------------------
// TripTable – the full loaded dataset for one city
// ---------------------------------------------------------------------------

/// All trips for one city, pre- or post-filtering, with table-level schema
/// flags for the columns that vary by city (Washington publishes neither
/// Gender nor Birth Year).
#[derive(Debug, Clone)]
pub struct TripTable {
    pub city: City,
    pub rows: Vec<TripRecord>,
    pub has_gender: bool,
    pub has_birth_year: bool,
}

impl TripTable {
    /// Number of trips.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no trips.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FilterSpec – one analysis cycle's selection
// ---------------------------------------------------------------------------

/// Month selection: everything, or one named month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthFilter {
    All,
    In(Month),
}

/// Day-of-week selection: everything, or one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayFilter {
    All,
    On(Weekday),
}

/// The (city, month, day) triple selected for one cycle.  Immutable once
/// constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub city: City,
    pub month: MonthFilter,
    pub day: DayFilter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_parse_accepts_all_spellings() {
        assert_eq!(City::parse("Chicago"), Some(City::Chicago));
        assert_eq!(City::parse("new york city"), Some(City::NewYorkCity));
        assert_eq!(City::parse("New-York-City"), Some(City::NewYorkCity));
        assert_eq!(City::parse("  WASHINGTON "), Some(City::Washington));
        assert_eq!(City::parse("boston"), None);
        assert_eq!(City::parse(""), None);
    }

    #[test]
    fn city_file_mapping_is_fixed() {
        assert_eq!(City::Chicago.data_file(), "chicago.csv");
        assert_eq!(City::NewYorkCity.data_file(), "new_york_city.csv");
        assert_eq!(City::Washington.data_file(), "washington.csv");
    }

    #[test]
    fn derived_fields_follow_start_time() {
        // 2017-01-02 was a Monday.
        let start =
            NaiveDateTime::parse_from_str("2017-01-02 09:15:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let trip = TripRecord::new(
            start,
            None,
            60,
            "A".into(),
            "B".into(),
            "Subscriber".into(),
            None,
            None,
        );
        assert_eq!(trip.month, 1);
        assert_eq!(trip.weekday, Weekday::Mon);
        assert_eq!(trip.start_hour, 9);
    }

    #[test]
    fn calendar_names() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(6), "June");
        assert_eq!(weekday_name(Weekday::Sun), "Sunday");
    }
}
