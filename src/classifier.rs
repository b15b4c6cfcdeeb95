//! Magnitude classification.
//!
//! [`MAGNITUDE_BUCKETS`] is the only place the thresholds are written down.
//! The marker color ([`color_for`]) and the legend (`legend::build_legend`)
//! both read this table, so the key can never drift from the markers.

use serde::Serialize;

/// One magnitude range and the fill color used for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MagnitudeBucket {
    /// Exclusive lower bound. The lowest bucket also catches everything below it.
    pub lower_bound: f64,
    pub color: &'static str,
}

/// Ordered from lowest to highest lower bound.
pub const MAGNITUDE_BUCKETS: [MagnitudeBucket; 6] = [
    MagnitudeBucket { lower_bound: 0.0, color: "#98ee00" },
    MagnitudeBucket { lower_bound: 1.0, color: "#d4ee00" },
    MagnitudeBucket { lower_bound: 2.0, color: "#eecc00" },
    MagnitudeBucket { lower_bound: 3.0, color: "#ee9c00" },
    MagnitudeBucket { lower_bound: 4.0, color: "#ea822c" },
    MagnitudeBucket { lower_bound: 5.0, color: "#ea2c2c" },
];

/// Smallest radius handed to the renderer.
pub const MIN_RADIUS: f64 = 1.0;

const RADIUS_SCALE: f64 = 3.0;

/// Rank of the bucket a magnitude falls in, `0` being the lowest.
///
/// Buckets are tried from the top with a strict `>`, so a magnitude sitting
/// exactly on a threshold belongs to the bucket below it. Anything that
/// matches no threshold (including `NaN`) lands in bucket `0`.
pub fn bucket_index(magnitude: f64) -> usize {
    MAGNITUDE_BUCKETS[1..]
        .iter()
        .rposition(|bucket| magnitude > bucket.lower_bound)
        .map_or(0, |i| i + 1)
}

/// Fill color for a magnitude. Total over `f64`.
pub fn color_for(magnitude: f64) -> &'static str {
    MAGNITUDE_BUCKETS[bucket_index(magnitude)].color
}

/// Marker radius for a magnitude.
///
/// Zero maps to `1`, positive magnitudes scale by three. Negative and
/// non-finite magnitudes are clamped to [`MIN_RADIUS`].
pub fn radius_for(magnitude: f64) -> f64 {
    if magnitude == 0.0 {
        return MIN_RADIUS;
    }
    let radius = magnitude * RADIUS_SCALE;
    if radius.is_finite() && radius > 0.0 {
        radius
    } else {
        MIN_RADIUS
    }
}
