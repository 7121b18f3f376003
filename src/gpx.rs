//! Read recorded GPX day files into a track record.
//!
//! Each `<trkseg>` and each `<rte>` becomes one line of a `MultiLineString`,
//! so the track flattens in document order. Waypoints, timestamps and
//! extensions are ignored.

use geojson::{GeoJson, Geometry, Position, Value};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::StatsError;

type Result<T> = std::result::Result<T, StatsError>;

/// Parse a GPX document into a bare `MultiLineString` track record.
pub fn parse_gpx_track(xml: &str) -> Result<GeoJson> {
    let mut reader = Reader::from_str(xml);
    let mut lines: Vec<Vec<Position>> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"trkseg" => push_line(&mut lines, read_line(&mut reader, b"trkseg", b"trkpt")?),
                b"rte" => push_line(&mut lines, read_line(&mut reader, b"rte", b"rtept")?),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    tracing::debug!(lines = lines.len(), "read GPX track");
    Ok(GeoJson::Geometry(Geometry::new(Value::MultiLineString(lines))))
}

fn push_line(lines: &mut Vec<Vec<Position>>, line: Vec<Position>) {
    if !line.is_empty() {
        lines.push(line);
    }
}

/// Collect the points of one `<trkseg>` or `<rte>` up to its end tag.
fn read_line<'a>(
    reader: &mut Reader<&'a [u8]>,
    container: &[u8],
    point_tag: &[u8],
) -> Result<Vec<Position>> {
    let mut line = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == point_tag => {
                if let Some(pos) = read_point(&e, reader)? {
                    line.push(pos);
                }
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::Empty(e) if e.local_name().as_ref() == point_tag => {
                if let Some((lon, lat)) = lon_lat(&e) {
                    line.push(vec![lon, lat]);
                }
            }
            Event::End(e) if e.local_name().as_ref() == container => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(line)
}

/// Read a point element with children; `None` when lat/lon are unusable.
fn read_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
) -> Result<Option<Position>> {
    let Some((lon, lat)) = lon_lat(start) else {
        reader.read_to_end(start.name())?;
        return Ok(None);
    };

    let mut ele: Option<f64> = None;
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"ele" => {
                let text = reader.read_text(e.name())?;
                ele = text.trim().parse::<f64>().ok().filter(|v| v.is_finite());
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(Some(match ele {
        Some(ele) => vec![lon, lat, ele],
        None => vec![lon, lat],
    }))
}

fn lon_lat(e: &BytesStart<'_>) -> Option<(f64, f64)> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr in e.attributes().flatten() {
        let value = std::str::from_utf8(&attr.value).ok()?.trim().parse::<f64>().ok();
        match attr.key.local_name().as_ref() {
            b"lat" => lat = value,
            b"lon" => lon = value,
            _ => {}
        }
    }

    Some((lon?, lat?))
}
