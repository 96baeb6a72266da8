//! Output writers. The service produces a single artifact: a Leaflet HTML map.
pub mod html;
pub use html::{BaseLayer, MapDocument, OverlayLayer};
