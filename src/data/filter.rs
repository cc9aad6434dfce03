use thiserror::Error;

use super::model::{DayFilter, FilterSpec, MonthFilter, TripTable, LAST_AVAILABLE_MONTH};

/// A [`FilterSpec`] referencing a month outside the published range.  The
/// shell validates its prompts, so this is a defensive rejection rather
/// than a silent no-op.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("no data is published for {name} (only January through June)", name = .0.name())]
    MonthOutOfRange(chrono::Month),
}

/// Narrow `table` to the rows matching `spec`.
///
/// A pure, order-preserving selection: relative row order is kept, no row is
/// duplicated or mutated, and the schema flags carry over.  An empty result
/// is a value, not an error.
pub fn apply(table: &TripTable, spec: &FilterSpec) -> Result<TripTable, FilterError> {
    let wanted_month = match spec.month {
        MonthFilter::All => None,
        MonthFilter::In(month) => {
            let number = month.number_from_month();
            if number > LAST_AVAILABLE_MONTH {
                return Err(FilterError::MonthOutOfRange(month));
            }
            Some(number)
        }
    };
    let wanted_day = match spec.day {
        DayFilter::All => None,
        DayFilter::On(day) => Some(day),
    };

    let rows: Vec<_> = table
        .rows
        .iter()
        .filter(|trip| wanted_month.is_none_or(|month| trip.month == month))
        .filter(|trip| wanted_day.is_none_or(|day| trip.weekday == day))
        .cloned()
        .collect();

    log::debug!("filter retained {} of {} trips", rows.len(), table.len());

    Ok(TripTable {
        city: table.city,
        rows,
        has_gender: table.has_gender,
        has_birth_year: table.has_birth_year,
    })
}
