use serde::Serialize;

use crate::constants::TILE_MAX_ZOOM;

const MAPBOX_V4_URL: &str =
    "https://api.tiles.mapbox.com/v4/{id}/{z}/{x}/{y}.png?access_token={accessToken}";
const MAPBOX_LIGHT_URL: &str =
    "https://api.mapbox.com/styles/v1/mapbox/light-v9/tiles/256/{z}/{x}/{y}?access_token={accessToken}";
const ATTRIBUTION: &str = "Map data &copy; <a href=\"https://www.openstreetmap.org/\">OpenStreetMap</a> contributors, \
<a href=\"https://creativecommons.org/licenses/by-sa/2.0/\">CC-BY-SA</a>, \
Imagery \u{a9} <a href=\"https://www.mapbox.com/\">Mapbox</a>";

/// A mutually exclusive background tile layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseLayer {
    pub name: &'static str,
    pub url_template: &'static str,
    pub attribution: &'static str,
    pub max_zoom: u8,
    pub id: &'static str,
    pub access_token: String,
}

impl BaseLayer {
    fn mapbox(name: &'static str, url_template: &'static str, id: &'static str, token: &str) -> Self {
        Self {
            name,
            url_template,
            attribution: ATTRIBUTION,
            max_zoom: TILE_MAX_ZOOM,
            id,
            access_token: token.to_string(),
        }
    }
}

/// Street, dark and light variants, in control order. The first one is the default.
pub fn default_base_layers(access_token: &str) -> Vec<BaseLayer> {
    vec![
        BaseLayer::mapbox("Street Map", MAPBOX_V4_URL, "mapbox.streets", access_token),
        BaseLayer::mapbox("Dark Map", MAPBOX_V4_URL, "mapbox.dark", access_token),
        BaseLayer::mapbox("Light Map", MAPBOX_LIGHT_URL, "mapbox.light", access_token),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_variants_share_token_and_zoom() {
        let layers = default_base_layers("pk.test");
        let names: Vec<_> = layers.iter().map(|l| l.name).collect();
        assert_eq!(names, ["Street Map", "Dark Map", "Light Map"]);
        assert!(layers.iter().all(|l| l.access_token == "pk.test" && l.max_zoom == 18));
        assert!(layers.iter().all(|l| l.url_template.contains("{accessToken}")));
        assert!(layers[0].attribution.contains("OpenStreetMap"));
    }

    #[test]
    fn serializes_leaflet_option_names() {
        let json = serde_json::to_value(&default_base_layers("t")[2]).unwrap();
        assert_eq!(json["maxZoom"], 18);
        assert_eq!(json["accessToken"], "t");
        assert_eq!(json["id"], "mapbox.light");
    }
}
