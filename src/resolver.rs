use geojson::GeoJson;
use serde::Serialize;

use crate::geometry::{
    round_tenth, round_to_ten, track_distance_raw, track_elevation_gain_raw,
};
use crate::record::{extract_override_properties, extract_track};

/// Final statistics for one successfully loaded day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    pub day: u32,
    pub distance_miles: f64,
    pub elevation_gain_ft: f64,
    pub point_count: usize,
    /// Distance before rounding, or the override as given.
    #[serde(skip)]
    pub unrounded_distance_miles: f64,
    #[serde(skip)]
    pub unrounded_elevation_gain_ft: f64,
}

/// Use the manual value when one was supplied, otherwise compute.
pub fn prefer_override(override_value: Option<f64>, computed: impl FnOnce() -> f64) -> f64 {
    override_value.unwrap_or_else(computed)
}

/// Resolve one day's stats from its record and its position in the day list.
pub fn resolve_day(record: &GeoJson, index: usize) -> DayStats {
    let track = extract_track(record);
    let overrides = extract_override_properties(record).unwrap_or_default();

    let day = overrides.day.unwrap_or_else(|| default_day_number(index));

    let raw_distance = prefer_override(overrides.distance_miles, || track_distance_raw(&track));
    let raw_gain = prefer_override(overrides.elevation_gain_ft, || {
        track_elevation_gain_raw(&track)
    });

    let distance_miles = prefer_override(overrides.distance_miles, || round_tenth(raw_distance));
    let elevation_gain_ft =
        prefer_override(overrides.elevation_gain_ft, || round_to_ten(raw_gain));

    tracing::debug!(
        index,
        day,
        points = track.len(),
        distance_miles,
        elevation_gain_ft,
        "resolved day"
    );

    DayStats {
        day,
        distance_miles,
        elevation_gain_ft,
        point_count: track.len(),
        unrounded_distance_miles: raw_distance,
        unrounded_elevation_gain_ft: raw_gain,
    }
}

pub(crate) fn default_day_number(index: usize) -> u32 {
    u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1))
}
