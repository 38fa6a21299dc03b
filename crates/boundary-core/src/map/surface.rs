//! The narrow contract a rendering backend exposes to the assembler.

use serde::Serialize;

use crate::layers::OverlayLayer;

/// A basemap tile layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub attribution: String,
    pub show: bool,
}

pub trait MapSurface {
    fn add_tile_layer(&mut self, layer: TileLayer);

    /// Attach a toggleable overlay group. Attachment order is stacking and
    /// layer-control order.
    fn add_overlay(&mut self, layer: OverlayLayer);

    fn add_layer_control(&mut self);
}
