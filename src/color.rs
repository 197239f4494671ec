//! Trait Color Model
//!
//! Maps colour trait labels (backgrounds, bodies) to RGB, converts RGB to HSL,
//! and scores how well two colours complement each other.
//!
//! Pure functions, total over every input: an unknown label resolves to
//! neutral gray instead of failing.

use crate::utils::normalization::canonical_label;
use serde::{Deserialize, Serialize};

/// RGB triple, 0-255 per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// HSL triple: hue 0-360, saturation 0-100, lightness 0-100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

/// Colour used for labels missing from the palette
pub const NEUTRAL_GRAY: Rgb = Rgb::new(128, 128, 128);

/// Weight of hue opposition in the complementarity score
const HUE_WEIGHT: f64 = 0.7;
/// Weight of the saturation/lightness similarity bonus
const SIMILARITY_WEIGHT: f64 = 0.3;

/// Background and body colours of the collection
const PALETTE: &[(&str, Rgb)] = &[
    // Backgrounds
    ("Deep Space", Rgb::new(75, 0, 130)),
    ("Purple Sky", Rgb::new(147, 112, 219)),
    ("Dead", Rgb::new(105, 105, 105)),
    ("Heaven", Rgb::new(135, 206, 250)),
    ("Holo", Rgb::new(255, 20, 147)),
    ("Gold", Rgb::new(255, 215, 0)),
    ("Splat", Rgb::new(255, 192, 203)),
    ("Hell", Rgb::new(255, 69, 0)),
    ("Zebra", Rgb::new(245, 245, 220)),
    ("Sunset", Rgb::new(255, 140, 0)),
    ("Iridescent", Rgb::new(221, 160, 221)),
    ("Pink", Rgb::new(255, 192, 203)),
    ("Dusk", Rgb::new(138, 43, 226)),
    ("Purple", Rgb::new(128, 0, 128)),
    ("Neotide", Rgb::new(64, 224, 208)),
    ("Blue", Rgb::new(0, 191, 255)),
    ("Lagoon", Rgb::new(0, 206, 209)),
    ("Green", Rgb::new(50, 205, 50)),
    ("Yellow", Rgb::new(255, 255, 0)),
    // Body-only patterns
    ("Splats", Rgb::new(255, 192, 203)),
    ("Cheetah", Rgb::new(255, 165, 0)),
    ("Camo", Rgb::new(120, 134, 107)),
    // Older labels
    ("Red", Rgb::new(244, 67, 54)),
    ("Orange", Rgb::new(255, 152, 0)),
    ("Unknown", NEUTRAL_GRAY),
];

/// Colour of a trait label
///
/// Exact match first, then case-insensitive; unknown labels are neutral gray.
pub fn color_of(label: &str) -> Rgb {
    canonical_label(PALETTE.iter().map(|(name, _)| *name), label.trim())
        .found()
        .and_then(|name| PALETTE.iter().find(|(n, _)| *n == name))
        .map_or(NEUTRAL_GRAY, |(_, rgb)| *rgb)
}

/// Standard max/min-channel RGB -> HSL conversion
///
/// When several channels share the maximum, the hue branch is chosen in
/// r -> g -> b order.
pub fn to_hsl(rgb: Rgb) -> Hsl {
    let r = f64::from(rgb.r) / 255.0;
    let g = f64::from(rgb.g) / 255.0;
    let b = f64::from(rgb.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;

    if max == min {
        return Hsl {
            hue: 0.0,
            saturation: 0.0,
            lightness: lightness * 100.0,
        };
    }

    let delta = max - min;
    let saturation = if lightness > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let sector = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    Hsl {
        hue: libm::fmod(sector * 60.0, 360.0),
        saturation: saturation * 100.0,
        lightness: lightness * 100.0,
    }
}

/// Circular distance between two hues, in degrees (0-180)
pub fn hue_distance(h1: f64, h2: f64) -> f64 {
    let diff = libm::fabs(h1 - h2);
    diff.min(360.0 - diff)
}

/// Visual complementarity of two colours, in [0, 1]
///
/// 70% hue opposition (180 degrees apart = 1, identical hue = 0) plus 30%
/// similarity of saturation and lightness.
pub fn complementarity(a: Rgb, b: Rgb) -> f64 {
    let hsl_a = to_hsl(a);
    let hsl_b = to_hsl(b);

    let hue_score = hue_distance(hsl_a.hue, hsl_b.hue) / 180.0;

    let saturation_delta = libm::fabs(hsl_a.saturation - hsl_b.saturation) / 100.0;
    let lightness_delta = libm::fabs(hsl_a.lightness - hsl_b.lightness) / 100.0;
    let similarity = 1.0 - (saturation_delta + lightness_delta) / 2.0;

    (HUE_WEIGHT * hue_score + SIMILARITY_WEIGHT * similarity).clamp(0.0, 1.0)
}
