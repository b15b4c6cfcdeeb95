//! Earthquake and plate-boundary feeds.
//!
//! Both feeds are GeoJSON feature collections. A collection is decoded one
//! feature at a time so that a single bad feature is dropped on its own
//! instead of failing the whole feed.

mod client;
mod records;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub use client::{FeedSource, HttpFeedSource};
pub use records::{BoundaryRecord, EventRecord, LatLng};

/// Failure to obtain a usable feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("feed has no top-level `features` array")]
    MissingFeatures,
}

/// A single feature that cannot be drawn.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("feature has no geometry")]
    MissingGeometry,
    #[error("unsupported geometry type `{0}`")]
    UnsupportedGeometry(String),
    #[error("invalid coordinate")]
    InvalidCoordinate,
    #[error("feature has no numeric magnitude")]
    MissingMagnitude,
}

/// Records decoded from a feed plus the number of features that were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeed<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

fn features(document: &Value) -> Result<&Vec<Value>, FeedError> {
    document
        .get("features")
        .and_then(Value::as_array)
        .ok_or(FeedError::MissingFeatures)
}

/// Decodes the event feed. Features without a usable magnitude are skipped.
pub fn parse_event_feed(document: &Value) -> Result<ParsedFeed<EventRecord>, FeedError> {
    decode_all(features(document)?, "event", EventRecord::from_feature)
}

/// Decodes the plate-boundary feed.
pub fn parse_boundary_feed(document: &Value) -> Result<ParsedFeed<BoundaryRecord>, FeedError> {
    decode_all(features(document)?, "boundary", BoundaryRecord::from_feature)
}

fn decode_all<T>(
    features: &[Value],
    kind: &str,
    decode: impl Fn(&Value) -> Result<T, RecordError>,
) -> Result<ParsedFeed<T>, FeedError> {
    let mut records = Vec::with_capacity(features.len());
    let mut skipped = 0;

    for (index, feature) in features.iter().enumerate() {
        match decode(feature) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(index, kind, "skipping feature: {}", e);
                skipped += 1;
            }
        }
    }

    debug!(kind, decoded = records.len(), skipped, "feed decoded");
    Ok(ParsedFeed { records, skipped })
}
