//! [`FilteredLayerGroup`] – a read-only view of a stored group with an
//! overridden member list.

use std::sync::Arc;

use geoveil_types::{LayerGroup, LayerGroupMode, PublishedInfo};

/// Exposes `layers` in place of the delegate's members; every other
/// attribute is read from the delegate, which is never modified.
#[derive(Debug)]
pub struct FilteredLayerGroup {
    delegate: Arc<dyn LayerGroup>,
    layers: Vec<PublishedInfo>,
}

impl FilteredLayerGroup {
    pub fn new(delegate: Arc<dyn LayerGroup>, layers: Vec<PublishedInfo>) -> Self {
        Self { delegate, layers }
    }

    /// The group this view was derived from.
    pub fn delegate(&self) -> &Arc<dyn LayerGroup> {
        &self.delegate
    }
}

impl LayerGroup for FilteredLayerGroup {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn name(&self) -> &str {
        self.delegate.name()
    }

    fn title(&self) -> Option<&str> {
        self.delegate.title()
    }

    fn abstract_text(&self) -> Option<&str> {
        self.delegate.abstract_text()
    }

    fn mode(&self) -> LayerGroupMode {
        self.delegate.mode()
    }

    fn workspace(&self) -> Option<&str> {
        self.delegate.workspace()
    }

    fn layers(&self) -> &[PublishedInfo] {
        &self.layers
    }
}
