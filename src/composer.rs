//! Composition root.
//!
//! [`MapComposer`] owns the single [`Viewport`] of a session. The viewport is
//! created exactly once, from the earthquake layer. Overlays, the legend and
//! notices may arrive before it exists; they are held back and attached when
//! it is created, so the end result does not depend on arrival order.
//! Notices are kept per source and ordered by source when the viewport is
//! handed over.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::basemaps::BaseLayer;
use crate::constants::{DEFAULT_CENTER, DEFAULT_ZOOM, EARTHQUAKE_LAYER_NAME};
use crate::layer::Layer;
use crate::legend::LegendWidget;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompositionError {
    #[error("the viewport has already been initialized")]
    AlreadyInitialized,
}

/// Leaflet layer-toggle control: radio buttons for base layers, checkboxes for overlays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerControl {
    pub base_layers: Vec<String>,
    pub overlays: Vec<String>,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    #[serde(flatten)]
    pub layer: Layer,
    pub visible: bool,
}

/// Where a notice comes from. Notices are listed in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeSource {
    Events,
    Boundaries,
    Config,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub center: [f64; 2],
    pub zoom: u8,
    pub base_layers: Vec<BaseLayer>,
    pub active_base_layer: String,
    pub overlays: Vec<Overlay>,
    pub control: LayerControl,
    pub legend: Option<LegendWidget>,
    /// Visible messages about data that could not be shown.
    pub notices: Vec<String>,
}

impl Viewport {
    #[cfg(test)]
    pub fn overlay(&self, name: &str) -> Option<&Overlay> {
        self.overlays.iter().find(|overlay| overlay.layer.name == name)
    }

    fn push_overlay(&mut self, layer: Layer) {
        info!(overlay = %layer.name, features = layer.len(), "overlay attached");
        self.control.overlays.push(layer.name.clone());
        self.overlays.push(Overlay { layer, visible: true });
    }
}

pub struct MapComposer {
    base_layers: Vec<BaseLayer>,
    viewport: Option<Viewport>,
    pending_overlays: Vec<Layer>,
    pending_legend: Option<LegendWidget>,
    notices: Vec<(NoticeSource, String)>,
}

impl MapComposer {
    /// `base_layers` must not be empty; the first one is shown initially.
    pub fn new(base_layers: Vec<BaseLayer>) -> Self {
        Self {
            base_layers,
            viewport: None,
            pending_overlays: Vec::new(),
            pending_legend: None,
            notices: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    #[cfg(test)]
    pub fn is_initialized(&self) -> bool {
        self.viewport.is_some()
    }

    /// Creates the viewport with the earthquake layer shown on the default base layer.
    pub fn initialize(&mut self, event_layer: Layer) -> Result<&Viewport, CompositionError> {
        self.create(event_layer, None)
    }

    /// Creates the viewport without earthquake data, showing `reason` instead.
    pub fn initialize_degraded(
        &mut self,
        reason: impl Into<String>,
    ) -> Result<&Viewport, CompositionError> {
        self.create(Layer::empty(EARTHQUAKE_LAYER_NAME), Some(reason.into()))
    }

    fn create(
        &mut self,
        event_layer: Layer,
        notice: Option<String>,
    ) -> Result<&Viewport, CompositionError> {
        if self.viewport.is_some() {
            return Err(CompositionError::AlreadyInitialized);
        }
        let viewport = self.build(event_layer, notice);
        Ok(self.viewport.insert(viewport))
    }

    fn build(&mut self, event_layer: Layer, notice: Option<String>) -> Viewport {
        let active_base_layer = self
            .base_layers
            .first()
            .map(|layer| layer.name.to_string())
            .unwrap_or_default();

        let mut viewport = Viewport {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            control: LayerControl {
                base_layers: self.base_layers.iter().map(|l| l.name.to_string()).collect(),
                overlays: Vec::new(),
                collapsed: false,
            },
            base_layers: self.base_layers.clone(),
            active_base_layer,
            overlays: Vec::new(),
            legend: self.pending_legend.take(),
            notices: Vec::new(),
        };

        if let Some(notice) = notice {
            warn!("map created without earthquakes: {}", notice);
            self.notices.push((NoticeSource::Events, notice));
        }
        viewport.push_overlay(event_layer);
        for layer in self.pending_overlays.drain(..) {
            viewport.push_overlay(layer);
        }

        info!(
            base = %viewport.active_base_layer,
            overlays = viewport.overlays.len(),
            "viewport created"
        );
        viewport
    }

    /// Adds an overlay now, or as soon as the viewport is created.
    pub fn attach_overlay(&mut self, layer: Layer) {
        match self.viewport.as_mut() {
            Some(viewport) => viewport.push_overlay(layer),
            None => self.pending_overlays.push(layer),
        }
    }

    pub fn attach_legend(&mut self, legend: LegendWidget) {
        match self.viewport.as_mut() {
            Some(viewport) => viewport.legend = Some(legend),
            None => self.pending_legend = Some(legend),
        }
    }

    /// Records a notice. Within one source notices keep the order they were
    /// added in.
    pub fn add_notice(&mut self, source: NoticeSource, notice: impl Into<String>) {
        let notice = notice.into();
        warn!(?source, "{}", notice);
        self.notices.push((source, notice));
    }

    /// Hands over the finished viewport, creating a degraded one if the
    /// earthquake layer never arrived.
    pub fn finish(mut self) -> Viewport {
        let mut viewport = match self.viewport.take() {
            Some(viewport) => viewport,
            None => self.build(
                Layer::empty(EARTHQUAKE_LAYER_NAME),
                Some("Earthquake data was not received.".to_string()),
            ),
        };
        self.notices.sort_by_key(|(source, _)| *source);
        viewport.notices = self.notices.into_iter().map(|(_, notice)| notice).collect();
        viewport
    }
}
