// Port configuration
pub const DEFAULT_PORT: u16 = 3001;

// Feed sources
pub const DEFAULT_EVENT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";
pub const DEFAULT_BOUNDARY_FEED_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

// Initial view: continental United States
pub const DEFAULT_CENTER: [f64; 2] = [37.09, -95.71];
pub const DEFAULT_ZOOM: u8 = 5;

// Overlay names as shown in the layer control
pub const EARTHQUAKE_LAYER_NAME: &str = "Earthquakes";
pub const PLATE_LAYER_NAME: &str = "Tectonic Plates";

// Marker styling. Fill color and radius come from the classifier.
pub const MARKER_STROKE_COLOR: &str = "#000000";
pub const MARKER_STROKE_WEIGHT: f64 = 0.25;
pub const MARKER_OPACITY: f64 = 1.0;
pub const MARKER_FILL_OPACITY: f64 = 1.0;

// Plate boundary styling, shared by every boundary feature
pub const BOUNDARY_COLOR: &str = "orange";
pub const BOUNDARY_WEIGHT: f64 = 3.0;

// Tile provider
pub const TILE_MAX_ZOOM: u8 = 18;
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";
