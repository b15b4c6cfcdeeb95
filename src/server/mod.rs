use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use self::state::AppState;
use handlers::{get_legend, get_map, get_settings, health, index_html, script_js, style_css};

// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_html))
        .route("/style.css", get(style_css))
        .route("/script.js", get(script_js))
        .route("/api/map", get(get_map))
        .route("/api/legend", get(get_legend))
        .route("/api/settings", get(get_settings))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

pub async fn start_server(state: AppState) -> Result<()> {
    let port = state.settings.port;
    let app = create_app(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server started at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basemaps::default_base_layers;
    use crate::classifier::MAGNITUDE_BUCKETS;
    use crate::composer::MapComposer;
    use crate::constants::EARTHQUAKE_LAYER_NAME;
    use crate::feed::EventRecord;
    use crate::layer::build_point_layer;
    use crate::legend::build_legend;
    use crate::settings::Settings;
    use crate::stylist::{popup_for, style_for};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(with_legend: bool) -> Router {
        let events = vec![EventRecord::new(4.2, "10km NW of Testville", -120.0, 37.0)];
        let mut composer = MapComposer::new(default_base_layers("pk.test"));
        composer
            .initialize(build_point_layer(EARTHQUAKE_LAYER_NAME, &events, style_for, popup_for))
            .unwrap();
        if with_legend {
            composer.attach_legend(build_legend(&MAGNITUDE_BUCKETS));
        }
        let settings = Settings {
            access_token: Some("pk.test".into()),
            ..Settings::default()
        };
        create_app(AppState::new(composer.finish(), settings).unwrap())
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body.to_vec())
    }

    #[tokio::test]
    async fn map_endpoint_serves_viewport() {
        let (status, content_type, body) = fetch(app(true), "/api/map").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));

        let map: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(map["zoom"], 5);
        assert_eq!(map["overlays"][0]["name"], "Earthquakes");
        let marker = &map["overlays"][0]["features"][0];
        assert_eq!(marker["style"]["fillColor"], "#ea822c");
        assert_eq!(marker["position"]["lng"], -120.0);
        assert_eq!(map["legend"]["entries"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn legend_endpoint() {
        let (status, _, body) = fetch(app(true), "/api/legend").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("5+"));

        let (status, _, _) = fetch(app(false), "/api/legend").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn settings_hide_token() {
        let (status, _, body) = fetch(app(true), "/api/settings").await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("event_feed_url"));
        assert!(!text.contains("pk.test"));
    }

    #[tokio::test]
    async fn health_reports_overlays() {
        let (status, _, body) = fetch(app(true), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["overlays"][0]["features"], 1);
        assert_eq!(health["overlays"][0]["empty"], false);
    }

    #[tokio::test]
    async fn frontend_assets_are_embedded() {
        let (status, content_type, body) = fetch(app(true), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/html"));
        assert!(String::from_utf8(body).unwrap().contains("leaflet"));

        let (status, content_type, _) = fetch(app(true), "/script.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/javascript"));
    }
}
