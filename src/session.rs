//! Loads both feeds and composes the session viewport.
//!
//! Each feed is fetched and turned into a layer by its own task. Both tasks
//! report on one channel, and a single loop owns the [`MapComposer`] and
//! applies the outcomes in whatever order they arrive. The viewport is
//! created when the earthquake outcome arrives (successful or not), and the
//! plate overlay is attached directly or held back until then.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::basemaps::default_base_layers;
use crate::classifier::MAGNITUDE_BUCKETS;
use crate::composer::{MapComposer, NoticeSource, Viewport};
use crate::constants::{EARTHQUAKE_LAYER_NAME, PLATE_LAYER_NAME};
use crate::feed::{parse_boundary_feed, parse_event_feed, FeedError, FeedSource};
use crate::layer::{build_line_layer, build_point_layer, Layer, BOUNDARY_STYLE};
use crate::legend::build_legend;
use crate::settings::Settings;
use crate::stylist::{popup_for, style_for};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("layer build task failed: {0}")]
    Build(#[from] tokio::task::JoinError),
}

#[derive(Debug)]
enum FeedOutcome {
    Events(Result<Layer, LoadError>),
    Boundaries(Result<Layer, LoadError>),
}

/// Fetches both feeds concurrently and returns the composed viewport.
///
/// Never fails: whatever could not be loaded is reported as a notice on
/// the returned viewport.
pub async fn load_viewport(source: Arc<dyn FeedSource>, settings: &Settings) -> Viewport {
    let (tx, mut rx) = mpsc::channel(2);

    {
        let source = Arc::clone(&source);
        let url = settings.event_feed_url.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = load_event_layer(source.as_ref(), &url).await;
            if tx.send(FeedOutcome::Events(outcome)).await.is_err() {
                debug!("event outcome dropped; session already finished");
            }
        });
    }
    {
        let url = settings.boundary_feed_url.clone();
        tokio::spawn(async move {
            let outcome = load_boundary_layer(source.as_ref(), &url).await;
            if tx.send(FeedOutcome::Boundaries(outcome)).await.is_err() {
                debug!("boundary outcome dropped; session already finished");
            }
        });
    }

    let mut composer = MapComposer::new(default_base_layers(
        settings.access_token.as_deref().unwrap_or_default(),
    ));
    if settings.access_token.is_none() {
        composer.add_notice(
            NoticeSource::Config,
            "No tile access token is configured; base maps may not load.",
        );
    }
    composer.attach_legend(build_legend(&MAGNITUDE_BUCKETS));

    let mut boundaries_received = false;
    // Ends once both tasks have reported or dropped their sender.
    while let Some(outcome) = rx.recv().await {
        boundaries_received |= matches!(outcome, FeedOutcome::Boundaries(_));
        apply_outcome(&mut composer, outcome);
    }

    if !boundaries_received {
        composer.add_notice(NoticeSource::Boundaries, "Plate boundary data was not received.");
    }

    let viewport = composer.finish();
    info!(
        overlays = viewport.overlays.len(),
        notices = viewport.notices.len(),
        "map session ready"
    );
    viewport
}

fn apply_outcome(composer: &mut MapComposer, outcome: FeedOutcome) {
    match outcome {
        FeedOutcome::Events(Ok(layer)) => {
            let skipped = layer.skipped;
            if let Err(e) = composer.initialize(layer) {
                warn!("earthquake layer discarded: {}", e);
            }
            if skipped > 0 {
                composer.add_notice(
                    NoticeSource::Events,
                    format!("{} earthquake record(s) could not be shown.", skipped),
                );
            }
        }
        FeedOutcome::Events(Err(e)) => {
            let reason = format!("Earthquake data could not be loaded: {}", e);
            if let Err(e) = composer.initialize_degraded(reason) {
                warn!("degraded map not created: {}", e);
            }
        }
        FeedOutcome::Boundaries(Ok(layer)) => {
            let skipped = layer.skipped;
            composer.attach_overlay(layer);
            if skipped > 0 {
                composer.add_notice(
                    NoticeSource::Boundaries,
                    format!("{} plate boundary record(s) could not be shown.", skipped),
                );
            }
        }
        FeedOutcome::Boundaries(Err(e)) => {
            composer.add_notice(
                NoticeSource::Boundaries,
                format!("Plate boundary data could not be loaded: {}", e),
            );
        }
    }
}

async fn load_event_layer(source: &dyn FeedSource, url: &str) -> Result<Layer, LoadError> {
    let document = source.fetch_json(url).await.inspect_err(|e| warn!("{}", e))?;
    let layer = tokio::task::spawn_blocking(move || -> Result<Layer, FeedError> {
        let parsed = parse_event_feed(&document)?;
        let mut layer = build_point_layer(EARTHQUAKE_LAYER_NAME, &parsed.records, style_for, popup_for);
        layer.skipped += parsed.skipped;
        Ok(layer)
    })
    .await??;
    Ok(layer)
}

async fn load_boundary_layer(source: &dyn FeedSource, url: &str) -> Result<Layer, LoadError> {
    let document = source.fetch_json(url).await.inspect_err(|e| warn!("{}", e))?;
    let layer = tokio::task::spawn_blocking(move || -> Result<Layer, FeedError> {
        let parsed = parse_boundary_feed(&document)?;
        let mut layer = build_line_layer(PLATE_LAYER_NAME, &parsed.records, BOUNDARY_STYLE);
        layer.skipped += parsed.skipped;
        Ok(layer)
    })
    .await??;
    Ok(layer)
}
