//! Tests for color ramps and gradient rendering.

use renderer::{array_to_colormap, display_normalize, hex_to_rgb, render_overlay_rgba, ColorRamp};

const ALL_RAMPS: [ColorRamp; 5] = [
    ColorRamp::Blues,
    ColorRamp::Reds,
    ColorRamp::Greens,
    ColorRamp::Purples,
    ColorRamp::Viridis,
];

// ============================================================================
// Color ramps
// ============================================================================

#[test]
fn test_ramps_hit_end_stops() {
    for ramp in ALL_RAMPS {
        let stops = ramp.stops();
        let first = hex_to_rgb(stops[0]).unwrap();
        let last = hex_to_rgb(stops[stops.len() - 1]).unwrap();

        let low = ramp.color_at(0.0);
        let high = ramp.color_at(1.0);
        assert_eq!((low.r, low.g, low.b), first, "{} low end", ramp);
        assert_eq!((high.r, high.g, high.b), last, "{} high end", ramp);
        assert_eq!(high.a, 255);
    }
}

#[test]
fn test_out_of_range_values_clip() {
    let ramp = ColorRamp::Reds;
    assert_eq!(ramp.color_at(-3.0), ramp.color_at(0.0));
    assert_eq!(ramp.color_at(7.5), ramp.color_at(1.0));
}

#[test]
fn test_sequential_ramps_darken() {
    // ColorBrewer sequential ramps run light to dark
    for ramp in [ColorRamp::Blues, ColorRamp::Reds, ColorRamp::Greens, ColorRamp::Purples] {
        let brightness = |t: f32| {
            let c = ramp.color_at(t);
            c.r as u32 + c.g as u32 + c.b as u32
        };
        assert!(brightness(0.0) > brightness(0.5), "{}", ramp);
        assert!(brightness(0.5) > brightness(1.0), "{}", ramp);
    }
}

#[test]
fn test_css_gradient_lists_stops() {
    let css = ColorRamp::Blues.css_gradient();
    assert!(css.starts_with("linear-gradient(to right, #f7fbff"));
    assert!(css.ends_with("#08306b)"));
}

// ============================================================================
// Pixel conversion
// ============================================================================

#[test]
fn test_array_to_colormap_rgb8() {
    let pixels = array_to_colormap(&[0.0, 1.0, 0.5], ColorRamp::Blues);
    assert_eq!(pixels.len(), 9);
    assert_eq!(&pixels[0..3], &[0xf7, 0xfb, 0xff]);
    assert_eq!(&pixels[3..6], &[0x08, 0x30, 0x6b]);
    // Midpoint of a 9-stop ramp is the fifth stop
    assert_eq!(&pixels[6..9], &[0x6b, 0xae, 0xd6]);
}

#[test]
fn test_array_to_colormap_clips() {
    let clipped = array_to_colormap(&[-1.0, 2.0], ColorRamp::Reds);
    let bounds = array_to_colormap(&[0.0, 1.0], ColorRamp::Reds);
    assert_eq!(clipped, bounds);
}

#[test]
fn test_nan_renders_transparent() {
    let rgba = render_overlay_rgba(&[f32::NAN, 0.5, f32::INFINITY, 1.0], 2, 2, ColorRamp::Reds);
    assert_eq!(rgba.len(), 16);
    assert_eq!(rgba[3], 0);
    assert_eq!(rgba[7], 255);
    assert_eq!(rgba[11], 0);
    assert_eq!(rgba[15], 255);
}

#[test]
fn test_display_normalize_stretches_to_unit_interval() {
    let out = display_normalize(&[-0.4, 0.1, 0.6]);
    assert_eq!(out[0], 0.0);
    assert!((out[1] - 0.5).abs() < 1e-5);
    assert!(out.iter().all(|v| (0.0..1.0).contains(v)));
}

#[test]
fn test_display_normalize_constant_is_zero() {
    let out = display_normalize(&[3.0; 4]);
    assert!(out.iter().all(|v| *v == 0.0));
}
