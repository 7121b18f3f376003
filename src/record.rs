use geojson::{GeoJson, Geometry, JsonObject, Position, Value};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::StatsError;

type Result<T> = std::result::Result<T, StatsError>;

/// Manually supplied per-day values carried in a track's properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOverrides {
    pub day: Option<u32>,
    pub distance_miles: Option<f64>,
    pub elevation_gain_ft: Option<f64>,
}

impl DayOverrides {
    /// Read the override keys from a properties object. `null`, missing and
    /// non-numeric values all read as absent.
    pub fn from_properties(props: &JsonObject) -> Self {
        Self {
            day: read_override(props, "day", day_number),
            distance_miles: read_override(props, "distance_miles", JsonValue::as_f64),
            elevation_gain_ft: read_override(props, "elevation_gain_ft", JsonValue::as_f64),
        }
    }
}

fn read_override<T>(
    props: &JsonObject,
    key: &str,
    read: impl Fn(&JsonValue) -> Option<T>,
) -> Option<T> {
    let value = props.get(key).filter(|v| !v.is_null())?;
    let parsed = read(value);
    if parsed.is_none() {
        tracing::debug!(key, %value, "ignoring unusable override, computing instead");
    }
    parsed
}

/// Whole, non-negative numbers only; JS hands integers over as floats.
fn day_number(value: &JsonValue) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|n| n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(n))
        .map(|n| n as u32)
}

/// Parse a day file's text into a track record.
pub fn parse_track_record(text: &str) -> Result<GeoJson> {
    let value: JsonValue =
        serde_json::from_str(text).map_err(|e| StatsError::InvalidRecord(e.to_string()))?;
    track_record_from_json(value)
}

/// Validate an already-decoded JSON value as a track record.
///
/// The top-level `type` must be a GeoJSON kind. Below that, gaps that only
/// cost track data are repaired instead of rejected: a missing `features` or
/// `geometry` reads as empty/null, a feature geometry of unknown kind reads as
/// null, and positions keep a numeric `[lon, lat]` plus the elevation only
/// when it is numeric.
pub fn track_record_from_json(mut value: JsonValue) -> Result<GeoJson> {
    if let JsonValue::Object(object) = &mut value {
        normalize_record(object);
    }
    Ok(GeoJson::from_json_value(value)?)
}

fn normalize_record(object: &mut JsonObject) {
    let kind = object
        .get("type")
        .and_then(JsonValue::as_str)
        .map(str::to_owned);
    match kind.as_deref() {
        Some("FeatureCollection") => {
            let features = object
                .entry("features")
                .or_insert_with(|| JsonValue::Array(Vec::new()));
            if features.is_null() {
                *features = JsonValue::Array(Vec::new());
            }
            if let JsonValue::Array(features) = features {
                for feature in features.iter_mut().filter_map(JsonValue::as_object_mut) {
                    normalize_feature(feature);
                }
            }
        }
        Some("Feature") => normalize_feature(object),
        _ => normalize_geometry(object),
    }
}

fn normalize_feature(feature: &mut JsonObject) {
    if !matches!(feature.get("properties"), Some(JsonValue::Object(_))) {
        feature.insert("properties".to_string(), JsonValue::Null);
    }

    let geometry = feature.entry("geometry").or_insert(JsonValue::Null);
    let usable = match &mut *geometry {
        JsonValue::Object(g) => {
            normalize_geometry(g);
            Geometry::from_json_value(JsonValue::Object(g.clone())).is_ok()
        }
        _ => false,
    };
    if !usable {
        if !geometry.is_null() {
            tracing::debug!(geometry = %geometry, "unsupported feature geometry, treating as empty");
        }
        *geometry = JsonValue::Null;
    }
}

fn normalize_geometry(geometry: &mut JsonObject) {
    let coordinates = geometry.get("coordinates");
    let normalized: Vec<JsonValue> = match geometry.get("type").and_then(JsonValue::as_str) {
        Some("LineString") => coordinates.map(normalize_line).unwrap_or_default(),
        Some("MultiLineString") => coordinates
            .and_then(JsonValue::as_array)
            .map(|lines| lines.iter().map(|l| normalize_line(l).into()).collect())
            .unwrap_or_default(),
        _ => return,
    };
    geometry.insert("coordinates".to_string(), JsonValue::Array(normalized));
}

/// Keep positions with numeric lon/lat; keep the elevation only if numeric.
fn normalize_line(coordinates: &JsonValue) -> Vec<JsonValue> {
    let Some(positions) = coordinates.as_array() else {
        return Vec::new();
    };
    positions
        .iter()
        .filter_map(|p| {
            let p = p.as_array()?;
            let lon = p.first()?.as_f64()?;
            let lat = p.get(1)?.as_f64()?;
            let mut position = vec![lon, lat];
            position.extend(p.get(2).and_then(JsonValue::as_f64));
            Some(position.into())
        })
        .collect()
}

/// The record's track as one flat position sequence.
///
/// Collections use the first feature whose geometry yields any points.
pub fn extract_track(record: &GeoJson) -> Vec<Position> {
    match record {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .iter()
            .map(|f| geometry_track(f.geometry.as_ref()))
            .find(|track| !track.is_empty())
            .unwrap_or_default(),
        GeoJson::Feature(feature) => geometry_track(feature.geometry.as_ref()),
        GeoJson::Geometry(geometry) => geometry_track(Some(geometry)),
    }
}

/// Override properties of the record's first feature, if it has one.
pub fn extract_override_properties(record: &GeoJson) -> Option<DayOverrides> {
    let props = match record {
        GeoJson::FeatureCollection(fc) => fc.features.first()?.properties.as_ref(),
        GeoJson::Feature(feature) => feature.properties.as_ref(),
        GeoJson::Geometry(_) => None,
    };
    props.map(DayOverrides::from_properties)
}

fn geometry_track(geometry: Option<&Geometry>) -> Vec<Position> {
    match geometry.map(|g| &g.value) {
        Some(Value::LineString(line)) => line.clone(),
        Some(Value::MultiLineString(lines)) => lines.iter().flatten().cloned().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> GeoJson {
        parse_track_record(text).unwrap()
    }

    #[test]
    fn test_bare_line_string() {
        let record = parse(r#"{"type":"LineString","coordinates":[[1,2,3],[4,5,6]]}"#);
        assert_eq!(
            extract_track(&record),
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]
        );
        assert_eq!(extract_override_properties(&record), None);
    }

    #[test]
    fn test_multi_line_string_is_flattened() {
        let record = parse(
            r#"{"type":"Feature","properties":null,
                "geometry":{"type":"MultiLineString","coordinates":[[[1,1],[2,2]],[[3,3]]]}}"#,
        );
        let track = extract_track(&record);
        assert_eq!(track.len(), 3);
        assert_eq!(track[2], vec![3.0, 3.0]);
    }

    #[test]
    fn test_collection_first_non_empty_track_wins() {
        let record = parse(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"day":4},"geometry":{"type":"Point","coordinates":[0,0]}},
                {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[]}},
                {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[1,1],[2,2]]}},
                {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[9,9],[8,8],[7,7]]}}
            ]}"#,
        );
        assert_eq!(extract_track(&record), vec![vec![1.0, 1.0], vec![2.0, 2.0]]);
        // Properties always come from the first feature.
        assert_eq!(extract_override_properties(&record).unwrap().day, Some(4));
    }

    #[test]
    fn test_non_line_geometry_yields_empty_track() {
        let point = parse(r#"{"type":"Point","coordinates":[1,2]}"#);
        assert!(extract_track(&point).is_empty());

        let no_geometry = parse(r#"{"type":"Feature","properties":{},"geometry":null}"#);
        assert!(extract_track(&no_geometry).is_empty());

        let empty = parse(r#"{"type":"FeatureCollection","features":[]}"#);
        assert!(extract_track(&empty).is_empty());
        assert_eq!(extract_override_properties(&empty), None);
    }

    #[test]
    fn test_override_values() {
        let record = parse(
            r#"{"type":"Feature","geometry":null,
                "properties":{"day":2,"distance_miles":14.2,"elevation_gain_ft":null,"name":"Forester"}}"#,
        );
        let overrides = extract_override_properties(&record).unwrap();
        assert_eq!(
            overrides,
            DayOverrides {
                day: Some(2),
                distance_miles: Some(14.2),
                elevation_gain_ft: None,
            }
        );
    }

    #[test]
    fn test_non_numeric_override_is_absent() {
        let mut props = JsonObject::new();
        props.insert("distance_miles".into(), JsonValue::String("12".into()));
        props.insert("day".into(), JsonValue::from(-1));
        assert_eq!(DayOverrides::from_properties(&props), DayOverrides::default());

        props.insert("day".into(), JsonValue::from(2.5));
        assert_eq!(DayOverrides::from_properties(&props).day, None);
        props.insert("day".into(), JsonValue::from("3"));
        assert_eq!(DayOverrides::from_properties(&props).day, None);
        props.insert("day".into(), JsonValue::from(3.0));
        assert_eq!(DayOverrides::from_properties(&props).day, Some(3));
    }

    #[test]
    fn test_unusable_elevation_is_dropped_not_rejected() {
        let record = parse(
            r#"{"type":"LineString","coordinates":
                [[0,0,100],[0,0.01,null],[0,0.02,"x"],[0,0.03,200]]}"#,
        );
        assert_eq!(
            extract_track(&record),
            vec![
                vec![0.0, 0.0, 100.0],
                vec![0.0, 0.01],
                vec![0.0, 0.02],
                vec![0.0, 0.03, 200.0]
            ]
        );
    }

    #[test]
    fn test_positions_without_numeric_lon_lat_are_skipped() {
        let record = parse(
            r#"{"type":"Feature","properties":{},"geometry":{"type":"MultiLineString",
                "coordinates":[[[1,1],["a",2],[3]],"junk",[[4,4,null]]]}}"#,
        );
        assert_eq!(extract_track(&record), vec![vec![1.0, 1.0], vec![4.0, 4.0]]);
    }

    #[test]
    fn test_feature_without_geometry_key() {
        let record = parse(r#"{"type":"Feature","properties":{"distance_miles":3.5}}"#);
        assert!(extract_track(&record).is_empty());
        assert_eq!(
            extract_override_properties(&record).unwrap().distance_miles,
            Some(3.5)
        );
    }

    #[test]
    fn test_collection_without_features() {
        let record = parse(r#"{"type":"FeatureCollection"}"#);
        assert!(extract_track(&record).is_empty());
        assert_eq!(extract_override_properties(&record), None);

        let null_features = parse(r#"{"type":"FeatureCollection","features":null}"#);
        assert!(extract_track(&null_features).is_empty());
    }

    #[test]
    fn test_unknown_feature_geometry_is_empty() {
        let record = parse(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"day":3},"geometry":{"type":"Blob","coordinates":[1]}},
                {"type":"Feature","properties":"oops","geometry":"nope"},
                {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[1,1],[2,2]]}}
            ]}"#,
        );
        assert_eq!(extract_track(&record), vec![vec![1.0, 1.0], vec![2.0, 2.0]]);
        assert_eq!(extract_override_properties(&record).unwrap().day, Some(3));
    }

    #[test]
    fn test_line_without_coordinates_is_empty() {
        let record = parse(r#"{"type":"LineString"}"#);
        assert!(extract_track(&record).is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            parse_track_record("{not json"),
            Err(StatsError::InvalidRecord(_))
        ));
        assert!(matches!(
            parse_track_record(r#"{"type":"Nonsense"}"#),
            Err(StatsError::InvalidRecord(_))
        ));
    }
}
