//! Turns feed records into renderable layers.
//!
//! Records are styled in parallel; `collect` keeps the input order so the
//! output is deterministic. A record whose geometry cannot be drawn is
//! skipped and counted without affecting the rest of the layer.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::constants::{BOUNDARY_COLOR, BOUNDARY_WEIGHT};
use crate::feed::{BoundaryRecord, EventRecord, LatLng, RecordError};
use crate::stylist::StyleDescriptor;

/// Records that can be drawn as a single point.
pub trait PointGeometry {
    fn lat_lng(&self) -> Result<LatLng, RecordError>;
}

/// Records that can be drawn as one or more polylines.
pub trait LineGeometry {
    fn paths(&self) -> Result<Vec<Vec<LatLng>>, RecordError>;

    fn label(&self) -> Option<String> {
        None
    }
}

impl PointGeometry for EventRecord {
    fn lat_lng(&self) -> Result<LatLng, RecordError> {
        EventRecord::lat_lng(self)
    }
}

impl LineGeometry for BoundaryRecord {
    fn paths(&self) -> Result<Vec<Vec<LatLng>>, RecordError> {
        BoundaryRecord::paths(self)
    }

    fn label(&self) -> Option<String> {
        self.name.clone()
    }
}

/// Shared style for every line in a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub weight: f64,
}

pub const BOUNDARY_STYLE: LineStyle = LineStyle {
    color: BOUNDARY_COLOR,
    weight: BOUNDARY_WEIGHT,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointMarker {
    pub position: LatLng,
    pub style: StyleDescriptor,
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineFeature {
    pub paths: Vec<Vec<LatLng>>,
    pub style: LineStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapFeature {
    CircleMarker(PointMarker),
    Polyline(LineFeature),
}

/// A named, independently togglable group of features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub features: Vec<MapFeature>,
    /// Records dropped because their geometry was unusable.
    pub skipped: usize,
}

impl Layer {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
            skipped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[cfg(test)]
    pub fn markers(&self) -> impl Iterator<Item = &PointMarker> {
        self.features.iter().filter_map(|feature| match feature {
            MapFeature::CircleMarker(marker) => Some(marker),
            MapFeature::Polyline(_) => None,
        })
    }

    #[cfg(test)]
    pub fn lines(&self) -> impl Iterator<Item = &LineFeature> {
        self.features.iter().filter_map(|feature| match feature {
            MapFeature::Polyline(line) => Some(line),
            MapFeature::CircleMarker(_) => None,
        })
    }
}

/// One circle marker per record, styled by `style_fn` with a popup from `popup_fn`.
pub fn build_point_layer<R, S, P>(name: &str, records: &[R], style_fn: S, popup_fn: P) -> Layer
where
    R: PointGeometry + Sync,
    S: Fn(&R) -> StyleDescriptor + Sync,
    P: Fn(&R) -> String + Sync,
{
    let built: Vec<Result<MapFeature, RecordError>> = records
        .par_iter()
        .map(|record| {
            let position = record.lat_lng()?;
            Ok(MapFeature::CircleMarker(PointMarker {
                position,
                style: style_fn(record),
                popup: popup_fn(record),
            }))
        })
        .collect();

    collect_layer(name, built)
}

/// One polyline feature per record, all sharing `style`.
pub fn build_line_layer<R>(name: &str, records: &[R], style: LineStyle) -> Layer
where
    R: LineGeometry + Sync,
{
    let built: Vec<Result<MapFeature, RecordError>> = records
        .par_iter()
        .map(|record| {
            Ok(MapFeature::Polyline(LineFeature {
                paths: record.paths()?,
                style,
                label: record.label(),
            }))
        })
        .collect();

    collect_layer(name, built)
}

fn collect_layer(name: &str, built: Vec<Result<MapFeature, RecordError>>) -> Layer {
    let mut layer = Layer::empty(name);
    layer.features.reserve(built.len());

    for (index, result) in built.into_iter().enumerate() {
        match result {
            Ok(feature) => layer.features.push(feature),
            Err(e) => {
                warn!(layer = name, index, "skipping record: {}", e);
                layer.skipped += 1;
            }
        }
    }

    info!(layer = name, features = layer.len(), skipped = layer.skipped, "layer built");
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{color_for, radius_for};
    use crate::stylist::{popup_for, style_for};
    use serde_json::json;

    fn sample_events() -> Vec<EventRecord> {
        vec![
            EventRecord::new(0.0, "Zero", 10.0, 10.0),
            EventRecord::new(1.7, "Small", 11.0, 11.0),
            EventRecord::new(3.3, "Medium", 12.0, 12.0),
            EventRecord::new(5.8, "Large", 13.0, 13.0),
            EventRecord::new(-0.4, "Negative", 14.0, 14.0),
        ]
    }

    #[test]
    fn one_marker_per_record_in_order() {
        let events = sample_events();
        let layer = build_point_layer("Earthquakes", &events, style_for, popup_for);

        assert_eq!(layer.name, "Earthquakes");
        assert_eq!(layer.len(), events.len());
        assert_eq!(layer.skipped, 0);

        for (marker, event) in layer.markers().zip(&events) {
            assert_eq!(marker.style.radius, radius_for(event.magnitude));
            assert_eq!(marker.style.fill_color, color_for(event.magnitude));
            assert_eq!(marker.position.lat, event.position.unwrap().lat);
            assert!(marker.popup.contains(&event.place));
        }
    }

    #[test]
    fn malformed_record_is_skipped_alone() {
        let mut events = sample_events();
        events.insert(2, EventRecord { magnitude: 2.0, place: "Broken".into(), position: None });
        events.push(EventRecord::new(2.5, "Off the map", 0.0, 123.0));

        let layer = build_point_layer("Earthquakes", &events, style_for, popup_for);

        assert_eq!(layer.len(), events.len() - 2);
        assert_eq!(layer.skipped, 2);
        assert!(layer.markers().all(|m| !m.popup.contains("Broken")));
    }

    #[test]
    fn end_to_end_event_marker() {
        let events = vec![EventRecord::new(4.2, "10km NW of Testville", -120.0, 37.0)];
        let layer = build_point_layer("Earthquakes", &events, style_for, popup_for);

        let marker = layer.markers().next().unwrap();
        assert_eq!(marker.position, LatLng { lat: 37.0, lng: -120.0 });
        assert_eq!(marker.style.fill_color, "#ea822c");
        assert!((marker.style.radius - 12.6).abs() < 1e-9);
        assert!(marker.popup.contains("4.2"));
        assert!(marker.popup.contains("Testville"));
    }

    #[test]
    fn line_layer_shares_one_style() {
        let records = vec![
            BoundaryRecord {
                name: Some("AF-AN".into()),
                geometry: json!({ "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] }),
            },
            BoundaryRecord {
                name: None,
                geometry: json!({ "type": "GeometryCollection", "geometries": [] }),
            },
            BoundaryRecord {
                name: Some("AN-AU".into()),
                geometry: json!({ "type": "MultiLineString", "coordinates": [[[2.0, 2.0], [3.0, 3.0]], [[4.0, 4.0], [5.0, 5.0]]] }),
            },
        ];

        let layer = build_line_layer("Tectonic Plates", &records, BOUNDARY_STYLE);

        assert_eq!(layer.len(), 2);
        assert_eq!(layer.skipped, 1);
        assert!(layer.lines().all(|line| line.style == BOUNDARY_STYLE));
        let labels: Vec<_> = layer.lines().map(|l| l.label.as_deref()).collect();
        assert_eq!(labels, [Some("AF-AN"), Some("AN-AU")]);
        assert_eq!(BOUNDARY_STYLE.color, "orange");
        assert_eq!(BOUNDARY_STYLE.weight, 3.0);
    }

    #[test]
    fn features_serialize_with_kind_tag() {
        let events = vec![EventRecord::new(1.0, "x", 1.0, 2.0)];
        let layer = build_point_layer("Earthquakes", &events, style_for, popup_for);
        let json = serde_json::to_value(&layer).unwrap();

        assert_eq!(json["features"][0]["kind"], "circle_marker");
        assert_eq!(json["features"][0]["position"]["lat"], 2.0);
        assert_eq!(json["skipped"], 0);
    }
}
