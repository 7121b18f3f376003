//! Great-circle distance and elevation gain over `[lon, lat, ele?]` positions.

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

pub const FEET_PER_METER: f64 = 3.28084;

/// Haversine distance in miles. Only `[0]` (longitude) and `[1]` (latitude)
/// are read; missing components count as 0.
pub fn distance_between(a: &[f64], b: &[f64]) -> f64 {
    let (lon1, lat1) = lon_lat(a);
    let (lon2, lat2) = lon_lat(b);

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Unrounded sum of segment distances in miles.
pub fn track_distance_raw<P: AsRef<[f64]>>(points: &[P]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_between(pair[0].as_ref(), pair[1].as_ref()))
        .sum()
}

/// Track length in miles, rounded to 0.1.
pub fn track_distance<P: AsRef<[f64]>>(points: &[P]) -> f64 {
    round_tenth(track_distance_raw(points))
}

/// Unrounded cumulative ascent in feet.
///
/// Only positive deltas count, and only for segments where both endpoints
/// carry a finite elevation.
pub fn track_elevation_gain_raw<P: AsRef<[f64]>>(points: &[P]) -> f64 {
    let gain_m: f64 = points
        .windows(2)
        .filter_map(|pair| {
            let from = elevation(pair[0].as_ref())?;
            let to = elevation(pair[1].as_ref())?;
            Some((to - from).max(0.0))
        })
        .sum();

    gain_m * FEET_PER_METER
}

/// Cumulative ascent in feet, rounded to the nearest 10.
pub fn track_elevation_gain<P: AsRef<[f64]>>(points: &[P]) -> f64 {
    round_to_ten(track_elevation_gain_raw(points))
}

/// Round half up to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Round half up to the nearest multiple of ten.
pub fn round_to_ten(value: f64) -> f64 {
    (value / 10.0 + 0.5).floor() * 10.0
}

fn lon_lat(p: &[f64]) -> (f64, f64) {
    (
        p.first().copied().unwrap_or(0.0),
        p.get(1).copied().unwrap_or(0.0),
    )
}

fn elevation(p: &[f64]) -> Option<f64> {
    p.get(2).copied().filter(|e| e.is_finite())
}
