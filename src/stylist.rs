use serde::Serialize;

use crate::classifier::{color_for, radius_for};
use crate::constants::{MARKER_FILL_OPACITY, MARKER_OPACITY, MARKER_STROKE_COLOR, MARKER_STROKE_WEIGHT};
use crate::feed::EventRecord;

/// Leaflet `circleMarker` path options for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDescriptor {
    pub fill_color: &'static str,
    pub color: &'static str,
    pub radius: f64,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
    pub stroke: bool,
}

/// Marker style for an event. Depends on the magnitude only.
pub fn style_for(event: &EventRecord) -> StyleDescriptor {
    StyleDescriptor {
        fill_color: color_for(event.magnitude),
        color: MARKER_STROKE_COLOR,
        radius: radius_for(event.magnitude),
        weight: MARKER_STROKE_WEIGHT,
        opacity: MARKER_OPACITY,
        fill_opacity: MARKER_FILL_OPACITY,
        stroke: true,
    }
}

/// Two-line popup body. The place name comes from the feed and is escaped.
pub fn popup_for(event: &EventRecord) -> String {
    format!(
        "Magnitude: {} <br>Location: {}",
        event.magnitude,
        html_escape::encode_text(&event.place)
    )
}
