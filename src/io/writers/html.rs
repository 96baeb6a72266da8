use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::core::geometry::Bounds;
use crate::io::earthengine::TileSource;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

static SAVE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Background tiles under the overlays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseLayer {
    pub name: String,
    pub url_template: String,
    pub attribution: String,
}

impl Default for BaseLayer {
    fn default() -> Self {
        Self {
            name: "OpenStreetMap".to_string(),
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
        }
    }
}

/// One named tile overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayLayer {
    pub name: String,
    pub tiles: TileSource,
}

/// Self-contained Leaflet page: a base layer, overlays in draw order and a
/// layer switcher.
#[derive(Clone, Debug)]
pub struct MapDocument {
    pub title: String,
    pub width: String,
    pub height: String,
    pub base: BaseLayer,
    /// Initial view when no bounds are set: `(lat, lon)` and zoom
    pub center: (f64, f64),
    pub zoom: u8,
    pub bounds: Option<Bounds>,
    layers: Vec<OverlayLayer>,
}

impl Default for MapDocument {
    fn default() -> Self {
        Self {
            title: "My Map".to_string(),
            width: "100%".to_string(),
            height: "880px".to_string(),
            base: BaseLayer::default(),
            center: (20.0, 0.0),
            zoom: 2,
            bounds: None,
            layers: Vec::new(),
        }
    }
}

fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl MapDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn add_overlay(&mut self, name: impl Into<String>, tiles: TileSource) {
        self.layers.push(OverlayLayer {
            name: name.into(),
            tiles,
        });
    }

    pub fn layers(&self) -> &[OverlayLayer] {
        &self.layers
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", escape_html(&self.title)));
        html.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", LEAFLET_CSS));
        html.push_str(&format!("<script src=\"{}\"></script>\n", LEAFLET_JS));
        html.push_str(&format!(
            "<style>html, body {{ margin: 0; padding: 0; }} #map {{ width: {}; height: {}; }}</style>\n",
            escape_html(&self.width),
            escape_html(&self.height)
        ));
        html.push_str("</head>\n<body>\n<div id=\"map\"></div>\n<script>\n");

        html.push_str(&format!(
            "const map = L.map(\"map\").setView([{}, {}], {});\n",
            self.center.0, self.center.1, self.zoom
        ));
        html.push_str(&format!(
            "const base = L.tileLayer({}, {{ attribution: {}, maxZoom: 19 }}).addTo(map);\n",
            js_string(&self.base.url_template),
            js_string(&self.base.attribution)
        ));
        html.push_str("const overlays = {};\n");
        for layer in &self.layers {
            html.push_str(&format!(
                "overlays[{}] = L.tileLayer({}, {{ maxZoom: 19 }}).addTo(map);\n",
                js_string(&layer.name),
                js_string(&layer.tiles.url_template)
            ));
        }
        html.push_str(&format!(
            "L.control.layers({{ [{}]: base }}, overlays, {{ collapsed: false }}).addTo(map);\n",
            js_string(&self.base.name)
        ));
        if let Some(b) = self.bounds {
            html.push_str(&format!(
                "map.fitBounds([[{}, {}], [{}, {}]]);\n",
                b.south, b.west, b.north, b.east
            ));
        }

        html.push_str("</script>\n</body>\n</html>\n");
        html
    }

    /// Write the page, replacing any previous file at `path`.
    ///
    /// The page is written next to `path` and renamed over it, so readers
    /// and concurrent writers only ever see a complete document.
    pub async fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut staging = path.as_os_str().to_owned();
        staging.push(format!(
            ".{}.{}.tmp",
            std::process::id(),
            SAVE_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let result = async {
            tokio::fs::write(&staging, self.to_html()).await?;
            tokio::fs::rename(&staging, path).await
        }
        .await;
        if result.is_err() {
            let _ = tokio::fs::remove_file(&staging).await;
        }
        result
    }
}
