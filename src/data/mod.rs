/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  chicago.csv / new_york_city.csv / washington.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV, derive month/weekday/hour → TripTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterSpec → filtered TripTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  four independent statistic groups → Report
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
