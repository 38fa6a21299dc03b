pub mod builder;
pub mod style;

pub use builder::{build_layer, OverlayLayer, PopupSpec, TooltipSpec};
pub use style::{HighlightStyle, ResolvedStyle};
