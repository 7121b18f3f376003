use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors that stop a whole request. Per-day problems never surface here;
/// they are recorded on the affected [`crate::aggregate::DayResult`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    #[error("no day data: trip lists no day files")]
    NoDayData,
    #[error("expected {expected} day outcomes, got {actual}")]
    OutcomeCountMismatch { expected: usize, actual: usize },
    #[error("invalid track record: {0}")]
    InvalidRecord(String),
    #[error("invalid GPX: {0}")]
    InvalidGpx(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Why a single day file could not be supplied to the aggregator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DayFetchError {
    #[error("not found")]
    NotFound,
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("{0}")]
    Network(String),
}

impl From<geojson::Error> for StatsError {
    fn from(e: geojson::Error) -> Self {
        Self::InvalidRecord(e.to_string())
    }
}

impl From<quick_xml::Error> for StatsError {
    fn from(e: quick_xml::Error) -> Self {
        Self::InvalidGpx(e.to_string())
    }
}

impl From<StatsError> for DayFetchError {
    fn from(e: StatsError) -> Self {
        Self::Malformed(e.to_string())
    }
}

impl From<StatsError> for JsValue {
    fn from(e: StatsError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
