use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use chrono::{Month, Weekday};

use crate::data::filter;
use crate::data::loader;
use crate::data::model::{
    month_name, weekday_name, City, DayFilter, FilterSpec, MonthFilter, LAST_AVAILABLE_MONTH,
};
use crate::data::stats::{self, Report, UserStats};

const DIVIDER: &str = "----------------------------------------";

// ---------------------------------------------------------------------------
// Interaction loop
// ---------------------------------------------------------------------------

/// Run analysis cycles until the user declines to restart (or stdin ends).
pub fn run(data_dir: &Path) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("Hello! Let's explore some US bikeshare data!");
    loop {
        let Some(spec) = prompt_filters(&mut input)? else {
            break;
        };
        println!("{DIVIDER}");

        if let Err(err) = run_cycle(data_dir, &spec) {
            log::error!("cycle aborted: {err:#}");
            println!("Could not analyze {}: {err:#}", spec.city);
            println!("{DIVIDER}");
        }

        match prompt(&mut input, "\nWould you like to restart? Enter yes or no.\n")? {
            Some(answer) if answer.eq_ignore_ascii_case("yes") => continue,
            _ => break,
        }
    }
    Ok(())
}

/// One load → filter → aggregate → print cycle.
fn run_cycle(data_dir: &Path, spec: &FilterSpec) -> Result<()> {
    let table = loader::load_city(data_dir, spec.city)?;
    let filtered = filter::apply(&table, spec)?;

    let started = Instant::now();
    let report = stats::compute(&filtered);
    let elapsed = started.elapsed();

    print_report(&report);
    println!(
        "\nAnalyzed {} trips in {elapsed:.2?}.",
        filtered.len()
    );
    println!("{DIVIDER}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Print `message` and read one trimmed line.  None means stdin ended.
fn prompt(input: &mut impl BufRead, message: &str) -> Result<Option<String>> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask for city, month and day, re-prompting until each answer is valid.
fn prompt_filters(input: &mut impl BufRead) -> Result<Option<FilterSpec>> {
    let city = loop {
        let Some(answer) = prompt(
            input,
            "Which city would you like to explore? (chicago, new york city, washington): ",
        )?
        else {
            return Ok(None);
        };
        match City::parse(&answer) {
            Some(city) => break city,
            None => println!("Sorry, '{answer}' is not one of the available cities."),
        }
    };

    let month = loop {
        let Some(answer) = prompt(
            input,
            "Which month? (all, or january through june): ",
        )?
        else {
            return Ok(None);
        };
        if answer.eq_ignore_ascii_case("all") {
            break MonthFilter::All;
        }
        match answer.parse::<Month>() {
            Ok(month) if month.number_from_month() <= LAST_AVAILABLE_MONTH => {
                break MonthFilter::In(month)
            }
            _ => println!("Sorry, '{answer}' is not a month between January and June."),
        }
    };

    let day = loop {
        let Some(answer) = prompt(
            input,
            "Which day of the week? (all, or monday through sunday): ",
        )?
        else {
            return Ok(None);
        };
        if answer.eq_ignore_ascii_case("all") {
            break DayFilter::All;
        }
        match answer.parse::<Weekday>() {
            Ok(day) => break DayFilter::On(day),
            Err(_) => println!("Sorry, '{answer}' is not a day of the week."),
        }
    };

    Ok(Some(FilterSpec { city, month, day }))
}

// ---------------------------------------------------------------------------
// Report printing
// ---------------------------------------------------------------------------

/// Print the four report sections.  A group that could not be computed
/// prints its reason and never hides the sibling sections.
fn print_report(report: &Report) {
    println!("\nMost Frequent Times of Travel");
    match &report.time {
        Ok(time) => {
            println!("  most common month: {}", month_name(time.month));
            println!("  most common day of week: {}", weekday_name(time.weekday));
            println!("  most common start hour: {}:00", time.hour);
        }
        Err(err) => println!("  {err}"),
    }

    println!("\nMost Popular Stations and Trip");
    match &report.stations {
        Ok(stations) => {
            println!("  most common start station: {}", stations.start);
            println!("  most common end station: {}", stations.end);
            println!(
                "  most common trip: {} to {}",
                stations.trip.0, stations.trip.1
            );
        }
        Err(err) => println!("  {err}"),
    }

    println!("\nTrip Duration");
    match &report.durations {
        Ok(durations) => {
            println!("  total travel time: {} seconds", durations.total_secs);
            println!("  mean travel time: {} seconds", durations.mean_secs);
        }
        Err(err) => println!("  {err}"),
    }

    println!("\nUser Stats");
    match &report.users {
        Ok(users) => print_user_stats(users),
        Err(err) => println!("  {err}"),
    }
}

fn print_user_stats(users: &UserStats) {
    if users.user_types.is_empty() {
        println!("  no trips to count by user type");
    }
    for (user_type, count) in &users.user_types {
        println!("  {user_type}: {count}");
    }

    match &users.genders {
        Ok(counts) => {
            for (gender, count) in counts {
                println!("  {gender}: {count}");
            }
        }
        Err(err) => println!("  {err}"),
    }

    match &users.birth_years {
        Ok(years) => println!(
            "  earliest birth year: {}, most recent: {}, most common: {}",
            years.earliest, years.latest, years.most_common
        ),
        Err(err) => println!("  {err}"),
    }
}
