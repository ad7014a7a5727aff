//! Tests for the interactive HTML map document.

use flood_common::{LayerKind, RasterGrid};
use renderer::map::geographic_bounds;
use renderer::{default_ramp, render, ColorRamp, MapLayer, MapOptions};
use test_utils::fixtures::reference_spec;
use test_utils::{gradient_raster, raster_with_nans};

fn layers() -> Vec<MapLayer> {
    let water = gradient_raster(reference_spec(), -1.0, 1.0);
    let risk = raster_with_nans(reference_spec(), 0.4, &[(0, 0)]);
    vec![
        MapLayer::from_grid(LayerKind::Water, &water, default_ramp(LayerKind::Water)),
        MapLayer::from_grid(LayerKind::Risk, &risk, default_ramp(LayerKind::Risk)),
    ]
}

#[test]
fn test_document_contains_layers_and_controls() {
    let html = render(&layers(), &MapOptions::default()).unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("\"NDWI\""));
    assert!(html.contains("\"Flood Risk Index\""));
    assert!(html.contains("<b>NDWI"));
    assert!(html.contains("<b>Flood Risk Index"));
    assert!(html.contains("L.control.layers"));
    assert!(html.contains("L.control.fullscreen({ position: \"topright\" })"));
    assert!(html.contains("toggleDisplay: true"));
    assert!(html.contains("L.control.scale()"));
    assert!(html.contains("tile.openstreetmap.org"));
    assert_eq!(html.matches("data:image/png;base64,").count(), 2);
}

#[test]
fn test_default_view_and_opacity() {
    let html = render(&layers(), &MapOptions::default()).unwrap();
    assert!(html.contains("center: [12.15,-61.65]"));
    assert!(html.contains("zoom: 10"));
    assert!(html.contains("opacity: 0.7"));
    assert!(html.contains("scrollWheelZoom: true"));
    assert!(html.contains("dragging: true"));
}

#[test]
fn test_overlay_bounds_south_west_north_east() {
    let html = render(&layers(), &MapOptions::default()).unwrap();
    assert!(html.contains("[[12.0,-61.8],[12.6,-61.3]]"));
}

#[test]
fn test_optional_controls_can_be_disabled() {
    let options = MapOptions {
        fullscreen: false,
        minimap: false,
        ..MapOptions::default()
    };
    let html = render(&layers(), &options).unwrap();
    assert!(!html.contains("L.control.fullscreen"));
    assert!(!html.contains("MiniMap"));
}

#[test]
fn test_empty_layer_fails() {
    let empty = RasterGrid::filled(
        flood_common::GridSpec::new(0, 0, reference_spec().transform, reference_spec().crs),
        0.0,
    );
    let layer = MapLayer::from_grid(LayerKind::Risk, &empty, ColorRamp::Reds);
    assert!(render(&[layer], &MapOptions::default()).is_err());
}

#[test]
fn test_geographic_bounds_passthrough() {
    let bounds = geographic_bounds(&reference_spec());
    assert_eq!(bounds, reference_spec().bounds());
}
