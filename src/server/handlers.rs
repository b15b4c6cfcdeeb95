use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use rust_embed::RustEmbed;

use crate::settings::Settings;

use super::state::AppState;

#[derive(RustEmbed)]
#[folder = "frontend/"]
struct Asset;

fn embedded(path: &str, content_type: &'static str) -> Response {
    match Asset::get(path) {
        Some(file) => ([(header::CONTENT_TYPE, content_type)], file.data.into_owned()).into_response(),
        None => {
            tracing::error!(path, "embedded asset missing");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

pub async fn index_html() -> Response {
    embedded("index.html", "text/html; charset=utf-8")
}

pub async fn style_css() -> Response {
    embedded("style.css", "text/css")
}

pub async fn script_js() -> Response {
    embedded("script.js", "application/javascript")
}

// Composed viewport: base layers, overlays, control, legend and notices
pub async fn get_map(State(state): State<AppState>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        state.map_json.clone(),
    )
        .into_response()
}

pub async fn get_legend(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    state
        .viewport
        .legend
        .as_ref()
        .map(|legend| Html(legend.to_html()))
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json((*state.settings).clone())
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let viewport = &state.viewport;
    let status = if viewport.notices.is_empty() { "ok" } else { "degraded" };
    Json(serde_json::json!({
        "status": status,
        "loaded_at": state.loaded_at.to_rfc3339(),
        "overlays": viewport
            .overlays
            .iter()
            .map(|overlay| serde_json::json!({
                "name": overlay.layer.name,
                "features": overlay.layer.len(),
                "empty": overlay.layer.is_empty(),
                "skipped": overlay.layer.skipped,
            }))
            .collect::<Vec<_>>(),
        "notices": viewport.notices,
    }))
}
