use serde::Serialize;
use serde_json::Value;

use super::RecordError;

/// A map position in Leaflet order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Builds a position from a GeoJSON `[lon, lat, ...]` pair, rejecting
    /// anything that is not a finite, in-range coordinate.
    pub fn from_lon_lat(lon: f64, lat: f64) -> Result<Self, RecordError> {
        let valid = lon.is_finite()
            && lat.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if valid {
            Ok(LatLng { lat, lng: lon })
        } else {
            Err(RecordError::InvalidCoordinate)
        }
    }

    fn from_json(value: &Value) -> Result<Self, RecordError> {
        let pair = value.as_array().ok_or(RecordError::InvalidCoordinate)?;
        match (pair.first().and_then(Value::as_f64), pair.get(1).and_then(Value::as_f64)) {
            (Some(lon), Some(lat)) => LatLng::from_lon_lat(lon, lat),
            _ => Err(RecordError::InvalidCoordinate),
        }
    }
}

/// Raw point coordinate as published, before range checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

/// One seismic event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub magnitude: f64,
    pub place: String,
    /// `None` when the feature carried no readable point geometry.
    pub position: Option<Position>,
}

impl EventRecord {
    #[cfg(test)]
    pub fn new(magnitude: f64, place: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            magnitude,
            place: place.into(),
            position: Some(Position { lon, lat }),
        }
    }

    /// Decodes a feature. Only a missing magnitude rejects the record here;
    /// a bad position is left for the layer builder to skip.
    pub fn from_feature(feature: &Value) -> Result<Self, RecordError> {
        let properties = &feature["properties"];
        let magnitude = properties["mag"]
            .as_f64()
            .ok_or(RecordError::MissingMagnitude)?;
        let place = properties["place"]
            .as_str()
            .unwrap_or("Unknown location")
            .to_string();

        Ok(Self {
            magnitude,
            place,
            position: point_position(&feature["geometry"]),
        })
    }

    pub fn lat_lng(&self) -> Result<LatLng, RecordError> {
        let position = self.position.ok_or(RecordError::MissingGeometry)?;
        LatLng::from_lon_lat(position.lon, position.lat)
    }
}

fn point_position(geometry: &Value) -> Option<Position> {
    let coordinates = geometry["coordinates"].as_array()?;
    Some(Position {
        lon: coordinates.first()?.as_f64()?,
        lat: coordinates.get(1)?.as_f64()?,
    })
}

/// One plate-boundary feature.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRecord {
    pub name: Option<String>,
    pub geometry: Value,
}

impl BoundaryRecord {
    pub fn from_feature(feature: &Value) -> Result<Self, RecordError> {
        let geometry = &feature["geometry"];
        if !geometry.is_object() {
            return Err(RecordError::MissingGeometry);
        }
        let properties = &feature["properties"];
        let name = properties["Name"]
            .as_str()
            .or_else(|| properties["name"].as_str())
            .map(str::to_string);

        Ok(Self {
            name,
            geometry: geometry.clone(),
        })
    }

    /// Polylines for this boundary. Polygon rings are drawn as closed lines.
    pub fn paths(&self) -> Result<Vec<Vec<LatLng>>, RecordError> {
        let kind = self.geometry["type"]
            .as_str()
            .ok_or(RecordError::MissingGeometry)?;
        let coordinates = &self.geometry["coordinates"];

        let paths = match kind {
            "LineString" => vec![path(coordinates)?],
            "MultiLineString" | "Polygon" => paths(coordinates)?,
            "MultiPolygon" => {
                let polygons = coordinates.as_array().ok_or(RecordError::InvalidCoordinate)?;
                let mut rings = Vec::new();
                for polygon in polygons {
                    rings.extend(paths(polygon)?);
                }
                rings
            }
            other => return Err(RecordError::UnsupportedGeometry(other.to_string())),
        };

        if paths.is_empty() {
            return Err(RecordError::InvalidCoordinate);
        }
        Ok(paths)
    }
}

fn paths(value: &Value) -> Result<Vec<Vec<LatLng>>, RecordError> {
    value
        .as_array()
        .ok_or(RecordError::InvalidCoordinate)?
        .iter()
        .map(path)
        .collect()
}

fn path(value: &Value) -> Result<Vec<LatLng>, RecordError> {
    let points = value
        .as_array()
        .ok_or(RecordError::InvalidCoordinate)?
        .iter()
        .map(LatLng::from_json)
        .collect::<Result<Vec<_>, _>>()?;
    // a line needs two ends
    if points.len() < 2 {
        return Err(RecordError::InvalidCoordinate);
    }
    Ok(points)
}
