pub mod aggregate;
pub mod duration;
pub mod error;
pub mod geometry;
pub mod gpx;
pub mod options;
pub mod palette;
pub mod record;
pub mod resolver;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::aggregate::{DayOutcome, TripMeta};
use crate::error::{DayFetchError, StatsError};
use crate::options::AggregateOptions;

/// One loaded (or failed) day file as handed over by the page script.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DayPayload {
    Record { record: serde_json::Value },
    Failed { error: String },
}

impl DayPayload {
    /// A day entry of the wrong shape fails that day only.
    fn outcome_from<E: std::fmt::Display>(entry: Result<DayPayload, E>) -> DayOutcome {
        entry
            .map_err(|e| DayFetchError::Malformed(format!("unrecognized day entry: {e}")))?
            .into_outcome()
    }

    fn into_outcome(self) -> DayOutcome {
        match self {
            DayPayload::Record { record } => {
                record::track_record_from_json(record).map_err(DayFetchError::from)
            }
            DayPayload::Failed { error } => Err(DayFetchError::Network(error)),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackStats {
    distance_miles: f64,
    elevation_gain_ft: f64,
    points: usize,
}

/// Aggregate a trip. `days` holds `{ record }` or `{ error }` per day file.
#[wasm_bindgen(js_name = aggregateTrip)]
pub fn aggregate_trip(
    meta: JsValue,
    days: js_sys::Array,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let meta: TripMeta = from_js(meta)?;
    let opts = parse_options(options)?;
    let outcomes: Vec<DayOutcome> = days
        .iter()
        .map(|entry| DayPayload::outcome_from(serde_wasm_bindgen::from_value(entry)))
        .collect();

    let stats = aggregate::aggregate(&meta, &outcomes, &opts)?;
    to_js(&stats)
}

/// Resolve a single day record at its 0-based position in the day list.
#[wasm_bindgen(js_name = resolveDay)]
pub fn resolve_day(record: JsValue, index: usize) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let record = record::track_record_from_json(from_js(record)?)?;
    to_js(&resolver::resolve_day(&record, index))
}

/// Computed distance and gain of a record's track, ignoring overrides.
#[wasm_bindgen(js_name = trackStats)]
pub fn track_stats(record: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let record = record::track_record_from_json(from_js(record)?)?;
    let track = record::extract_track(&record);
    to_js(&TrackStats {
        distance_miles: geometry::track_distance(&track),
        elevation_gain_ft: geometry::track_elevation_gain(&track),
        points: track.len(),
    })
}

/// Formatted elapsed time, e.g. `"14d 7h 30m"`, `"<1m"` or `"unknown"`.
#[wasm_bindgen(js_name = elapsedDuration)]
pub fn elapsed_duration(
    start_date: &str,
    start_time: Option<String>,
    end_date: &str,
    end_time: Option<String>,
) -> String {
    duration::elapsed(
        start_date,
        start_time.as_deref(),
        end_date,
        end_time.as_deref(),
    )
    .to_string()
}

#[wasm_bindgen(js_name = dayColor)]
pub fn day_color(day: u32) -> String {
    palette::day_color(day).to_string()
}

/// Convert a GPX day file into a GeoJSON track record.
#[wasm_bindgen(js_name = gpxToTrackRecord)]
pub fn gpx_to_track_record(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let record = gpx::parse_gpx_track(gpx_string)?;
    to_js(&record)
}

fn parse_options(options: JsValue) -> Result<AggregateOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(AggregateOptions::default())
    } else {
        from_js(options)
    }
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| StatsError::InvalidInput(e.to_string()).into())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    // Plain objects rather than Maps, so the page can read `totals.dayCount`.
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_payload_shapes() {
        let ok: DayPayload = serde_json::from_str(
            r#"{"record":{"type":"LineString","coordinates":[[0,0],[0,1]]}}"#,
        )
        .unwrap();
        assert!(ok.into_outcome().is_ok());

        let failed: DayPayload = serde_json::from_str(r#"{"error":"HTTP 404"}"#).unwrap();
        assert_eq!(
            failed.into_outcome().unwrap_err(),
            DayFetchError::Network("HTTP 404".into())
        );
    }

    #[test]
    fn test_malformed_record_payload_is_a_failed_day() {
        let bad: DayPayload =
            serde_json::from_str(r#"{"record":{"type":"Nope"}}"#).unwrap();
        assert!(matches!(
            bad.into_outcome(),
            Err(DayFetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_unrecognized_day_entry_fails_only_that_day() {
        for entry in [r#"{"error":404}"#, "{}", "[]"] {
            let outcome =
                DayPayload::outcome_from(serde_json::from_str::<DayPayload>(entry));
            assert!(
                matches!(&outcome, Err(DayFetchError::Malformed(m)) if m.starts_with("unrecognized day entry")),
                "{entry}: {outcome:?}"
            );
        }

        let ok = DayPayload::outcome_from(serde_json::from_str::<DayPayload>(
            r#"{"record":{"type":"Feature","properties":{"distance_miles":3.5}}}"#,
        ));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_elapsed_duration_export() {
        assert_eq!(
            elapsed_duration("2024-06-01", Some("07:00".into()), "2024-06-15", Some("14:30".into())),
            "14d 7h 30m"
        );
    }
}
