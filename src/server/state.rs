use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use chrono::{DateTime, Utc};

use crate::composer::Viewport;
use crate::settings::Settings;

// Application state shared by the handlers. The viewport is complete and
// read-only by the time the server starts.
#[derive(Clone)]
pub struct AppState {
    pub viewport: Arc<Viewport>,
    pub settings: Arc<Settings>,
    /// `viewport` serialized once, served as-is by `/api/map`.
    pub map_json: Bytes,
    pub loaded_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(viewport: Viewport, settings: Settings) -> Result<Self> {
        let map_json = serde_json::to_vec(&viewport).context("Failed to serialize viewport")?;
        Ok(Self {
            viewport: Arc::new(viewport),
            settings: Arc::new(settings),
            map_json: Bytes::from(map_json),
            loaded_at: Utc::now(),
        })
    }
}
