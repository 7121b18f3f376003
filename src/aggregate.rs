use geojson::GeoJson;
use serde::{Deserialize, Serialize};

use crate::duration::elapsed;
use crate::error::{DayFetchError, StatsError};
use crate::geometry::{round_tenth, round_to_ten};
use crate::options::{AggregateOptions, TotalsRounding};
use crate::palette::day_color;
use crate::resolver::{default_day_number, resolve_day};

type Result<T> = std::result::Result<T, StatsError>;

/// One trip's `meta.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Day file references; list order is day order.
    #[serde(default)]
    pub days: Vec<String>,
}

/// Outcome of loading one day file.
pub type DayOutcome = std::result::Result<GeoJson, DayFetchError>;

/// Resolved (or failed) statistics for one entry of [`TripMeta::days`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayResult {
    pub index: usize,
    pub day: u32,
    pub file: String,
    pub success: bool,
    pub distance_miles: f64,
    pub elevation_gain_ft: f64,
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    unrounded_distance_miles: f64,
    #[serde(skip)]
    unrounded_elevation_gain_ft: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripTotals {
    pub distance_miles: f64,
    pub elevation_gain_ft: f64,
    /// Days that resolved successfully.
    pub day_count: usize,
    pub elapsed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripStats {
    pub totals: TripTotals,
    pub days: Vec<DayResult>,
}

/// Resolve every day of a trip and fold the successes into trip totals.
///
/// `outcomes` holds one entry per `meta.days` item, in the same order. A failed
/// day is kept as a failure row and contributes nothing to the totals.
pub fn aggregate(
    meta: &TripMeta,
    outcomes: &[DayOutcome],
    opts: &AggregateOptions,
) -> Result<TripStats> {
    if meta.days.is_empty() {
        return Err(StatsError::NoDayData);
    }
    if outcomes.len() != meta.days.len() {
        return Err(StatsError::OutcomeCountMismatch {
            expected: meta.days.len(),
            actual: outcomes.len(),
        });
    }

    let days: Vec<DayResult> = meta
        .days
        .iter()
        .zip(outcomes)
        .enumerate()
        .map(|(index, (file, outcome))| resolve_outcome(index, file, outcome))
        .collect();

    let totals = TripTotals {
        distance_miles: round_tenth(sum_successful(&days, |d| match opts.totals_rounding {
            TotalsRounding::PerDay => d.distance_miles,
            TotalsRounding::Once => d.unrounded_distance_miles,
        })),
        elevation_gain_ft: round_to_ten(sum_successful(&days, |d| match opts.totals_rounding {
            TotalsRounding::PerDay => d.elevation_gain_ft,
            TotalsRounding::Once => d.unrounded_elevation_gain_ft,
        })),
        day_count: days.iter().filter(|d| d.success).count(),
        elapsed: elapsed(
            &meta.start_date,
            meta.start_time.as_deref(),
            &meta.end_date,
            meta.end_time.as_deref(),
        )
        .to_string(),
    };

    tracing::debug!(
        title = %meta.title,
        distance_miles = totals.distance_miles,
        elevation_gain_ft = totals.elevation_gain_ft,
        day_count = totals.day_count,
        day_files = meta.days.len(),
        "aggregated trip"
    );

    let days = if opts.include_failed_days {
        days
    } else {
        days.into_iter().filter(|d| d.success).collect()
    };

    Ok(TripStats { totals, days })
}

fn resolve_outcome(index: usize, file: &str, outcome: &DayOutcome) -> DayResult {
    match outcome {
        Ok(record) => {
            let stats = resolve_day(record, index);
            DayResult {
                index,
                day: stats.day,
                file: file.to_string(),
                success: true,
                distance_miles: stats.distance_miles,
                elevation_gain_ft: stats.elevation_gain_ft,
                color: day_color(stats.day),
                error: None,
                unrounded_distance_miles: stats.unrounded_distance_miles,
                unrounded_elevation_gain_ft: stats.unrounded_elevation_gain_ft,
            }
        }
        Err(e) => {
            tracing::warn!(index, file, error = %e, "day file unavailable");
            let day = default_day_number(index);
            DayResult {
                index,
                day,
                file: file.to_string(),
                success: false,
                distance_miles: 0.0,
                elevation_gain_ft: 0.0,
                color: day_color(day),
                error: Some(e.to_string()),
                unrounded_distance_miles: 0.0,
                unrounded_elevation_gain_ft: 0.0,
            }
        }
    }
}

fn sum_successful(days: &[DayResult], value: impl Fn(&DayResult) -> f64) -> f64 {
    days.iter().filter(|d| d.success).map(value).sum()
}
