//! Self-contained interactive HTML map.
//!
//! Every layer becomes a Leaflet `ImageOverlay` whose PNG is inlined as a
//! base64 data URI, so the document opens offline apart from the base map
//! tiles and the Leaflet scripts.

use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flood_common::{BoundingBox, CrsCode, GridSpec, LayerKind, RasterGrid};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::gradient::{array_to_colormap, display_normalize, render_overlay_rgba};
use crate::png::{create_png, create_png_rgb};
use crate::style::{ColorRamp, Legend};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const FULLSCREEN_CSS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet.fullscreen@3.0.0/Control.FullScreen.css";
const FULLSCREEN_JS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet.fullscreen@3.0.0/Control.FullScreen.min.js";
const MINIMAP_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet-minimap/3.6.1/Control.MiniMap.css";
const MINIMAP_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet-minimap/3.6.1/Control.MiniMap.js";

/// Ramp used for a layer unless configured otherwise.
pub fn default_ramp(kind: LayerKind) -> ColorRamp {
    match kind {
        LayerKind::Water => ColorRamp::Blues,
        LayerKind::Elevation => ColorRamp::Viridis,
        LayerKind::Population => ColorRamp::Purples,
        LayerKind::Risk => ColorRamp::Reds,
    }
}

/// Lon/lat envelope of a grid, whatever its CRS.
pub fn geographic_bounds(spec: &GridSpec) -> BoundingBox {
    let bounds = spec.bounds();
    if spec.crs == CrsCode::Epsg4326 {
        return bounds;
    }
    let (west, south) = spec
        .crs
        .transform_point(CrsCode::Epsg4326, bounds.min_x, bounds.min_y);
    let (east, north) = spec
        .crs
        .transform_point(CrsCode::Epsg4326, bounds.max_x, bounds.max_y);
    BoundingBox::new(west, south, east, north)
}

/// Map-wide presentation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    pub title: String,
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub overlay_opacity: f32,
    pub tiles_url: String,
    pub attribution: String,
    pub scale_control: bool,
    pub fullscreen: bool,
    pub minimap: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            title: "Flood Risk Index".to_string(),
            center: [12.15, -61.65],
            zoom: 10,
            overlay_opacity: 0.7,
            tiles_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            scale_control: true,
            fullscreen: true,
            minimap: true,
        }
    }
}

/// One raster layer ready to be drawn.
#[derive(Debug, Clone)]
pub struct MapLayer {
    pub name: String,
    /// Row-major values in [0, 1]; NaN is drawn transparent.
    pub values: Vec<f32>,
    pub width: usize,
    pub height: usize,
    /// Lon/lat envelope.
    pub bounds: BoundingBox,
    pub ramp: ColorRamp,
    pub legend: Option<Legend>,
}

impl MapLayer {
    /// Build a display layer from a grid, stretching its values to [0, 1].
    pub fn from_grid(kind: LayerKind, grid: &RasterGrid, ramp: ColorRamp) -> Self {
        Self {
            name: kind.label().to_string(),
            values: display_normalize(&grid.data),
            width: grid.width(),
            height: grid.height(),
            bounds: geographic_bounds(&grid.spec),
            ramp,
            legend: Some(Legend::unit(kind.label(), ramp)),
        }
    }
}

/// An overlay after PNG encoding.
#[derive(Debug, Clone, Serialize)]
struct Overlay {
    name: String,
    url: String,
    /// `[[south, west], [north, east]]`
    bounds: [[f64; 2]; 2],
}

/// Builder for the HTML map document.
#[derive(Debug, Clone)]
pub struct MapDocument {
    options: MapOptions,
    overlays: Vec<Overlay>,
    legends: Vec<Legend>,
}

impl MapDocument {
    pub fn new(options: MapOptions) -> Self {
        Self {
            options,
            overlays: Vec::new(),
            legends: Vec::new(),
        }
    }

    /// Encode a layer as a PNG overlay.
    pub fn add_layer(&mut self, layer: &MapLayer) -> Result<&mut Self> {
        if layer.width == 0 || layer.height == 0 {
            return Err(RenderError::EmptyLayer(layer.name.clone()));
        }
        if layer.values.len() != layer.width * layer.height {
            return Err(RenderError::EmptyLayer(format!(
                "{}: {} values for a {}x{} layer",
                layer.name,
                layer.values.len(),
                layer.width,
                layer.height
            )));
        }

        let png = encode_overlay(&layer.values, layer.width, layer.height, layer.ramp)?;

        debug!(
            layer = %layer.name,
            width = layer.width,
            height = layer.height,
            png_bytes = png.len(),
            "Encoded overlay"
        );

        self.overlays.push(Overlay {
            name: layer.name.clone(),
            url: format!("data:image/png;base64,{}", BASE64.encode(&png)),
            bounds: layer.bounds.to_lat_lon_corners(),
        });
        if let Some(legend) = &layer.legend {
            self.legends.push(legend.clone());
        }
        Ok(self)
    }

    pub fn layer_count(&self) -> usize {
        self.overlays.len()
    }

    /// Produce the complete HTML document.
    pub fn to_html(&self) -> Result<String> {
        let opts = &self.options;
        let overlays = script_json(&self.overlays)?;
        let center = script_json(&opts.center)?;
        let tiles = script_json(&opts.tiles_url)?;
        let attribution = script_json(&opts.attribution)?;

        let mut html = String::with_capacity(4096 + self.overlays.iter().map(|o| o.url.len()).sum::<usize>());
        let _ = write!(
            html,
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<link rel="stylesheet" href="{leaflet_css}">
"#,
            title = escape_html(&opts.title),
            leaflet_css = LEAFLET_CSS,
        );
        if opts.fullscreen {
            let _ = writeln!(html, r#"<link rel="stylesheet" href="{}">"#, FULLSCREEN_CSS);
        }
        if opts.minimap {
            let _ = writeln!(html, r#"<link rel="stylesheet" href="{}">"#, MINIMAP_CSS);
        }
        html.push_str(
            r#"<style>
html, body, #map { height: 100%; margin: 0; }
.legend { background: rgba(255,255,255,0.9); padding: 6px 8px; font: 12px sans-serif; border-radius: 4px; }
.legend .bar { width: 200px; height: 10px; margin: 4px 0 2px; }
.legend .ticks { display: flex; justify-content: space-between; }
.footer { position: absolute; bottom: 0; left: 0; z-index: 1000; font: 10px sans-serif; background: rgba(255,255,255,0.7); padding: 1px 4px; }
</style>
"#,
        );
        let _ = writeln!(html, r#"<script src="{}"></script>"#, LEAFLET_JS);
        if opts.fullscreen {
            let _ = writeln!(html, r#"<script src="{}"></script>"#, FULLSCREEN_JS);
        }
        if opts.minimap {
            let _ = writeln!(html, r#"<script src="{}"></script>"#, MINIMAP_JS);
        }
        html.push_str("</head>\n<body>\n<div id=\"map\"></div>\n");
        let _ = writeln!(
            html,
            r#"<div class="footer">Generated {}</div>"#,
            chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")
        );

        html.push_str("<script>\n");
        let _ = write!(
            html,
            r#"var map = L.map("map", {{
  center: {center},
  zoom: {zoom},
  zoomControl: true,
  scrollWheelZoom: true,
  dragging: true
}});
var base = L.tileLayer({tiles}, {{ maxZoom: 19, attribution: {attribution} }}).addTo(map);
var overlays = {{}};
{overlays}.forEach(function (o) {{
  overlays[o.name] = L.imageOverlay(o.url, o.bounds, {{ opacity: {opacity} }}).addTo(map);
}});
L.control.layers({{ "OpenStreetMap": base }}, overlays, {{ collapsed: false }}).addTo(map);
"#,
            center = center,
            zoom = opts.zoom,
            tiles = tiles,
            attribution = attribution,
            overlays = overlays,
            opacity = opts.overlay_opacity,
        );
        if opts.scale_control {
            html.push_str("L.control.scale().addTo(map);\n");
        }
        if opts.fullscreen {
            html.push_str("L.control.fullscreen({ position: \"topright\" }).addTo(map);\n");
        }
        if opts.minimap {
            let _ = writeln!(
                html,
                "new L.Control.MiniMap(L.tileLayer({}), {{ toggleDisplay: true }}).addTo(map);",
                tiles
            );
        }
        for legend in &self.legends {
            let _ = writeln!(
                html,
                "var legend = L.control({{ position: \"bottomright\" }});\nlegend.onAdd = function () {{ var div = L.DomUtil.create(\"div\", \"legend\"); div.innerHTML = {}; return div; }};\nlegend.addTo(map);",
                script_json(&legend_html(legend))?
            );
        }
        html.push_str("</script>\n</body>\n</html>\n");

        Ok(html)
    }
}

/// PNG for one overlay: an opaque RGB color image when every cell is valid,
/// RGBA with transparent holes otherwise.
fn encode_overlay(values: &[f32], width: usize, height: usize, ramp: ColorRamp) -> Result<Vec<u8>> {
    if values.iter().all(|v| v.is_finite()) {
        create_png_rgb(&array_to_colormap(values, ramp), width, height)
    } else {
        create_png(&render_overlay_rgba(values, width, height, ramp), width, height)
    }
}

/// Render layers into an HTML document.
pub fn render(layers: &[MapLayer], options: &MapOptions) -> Result<String> {
    let mut doc = MapDocument::new(options.clone());
    for layer in layers {
        doc.add_layer(layer)?;
    }
    debug!(layers = doc.layer_count(), "Rendering map document");
    doc.to_html()
}

fn legend_html(legend: &Legend) -> String {
    let ticks: String = legend
        .ticks(5)
        .iter()
        .map(|t| format!("<span>{}</span>", t))
        .collect();
    format!(
        r#"<div class="caption"><b>{}</b></div><div class="bar" style="background: {}"></div><div class="ticks">{}</div>"#,
        escape_html(&legend.caption),
        legend.ramp.css_gradient(),
        ticks
    )
}

/// JSON for embedding inside a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(json.replace("</", "<\\/"))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
