use crate::core::RgbaRaster;

/// Flat color blended over a pixel as the final grading step.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorOverlay {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Blend weight in `0..=1`.
    pub opacity: f64,
}

/// Per-pixel grading parameters.
///
/// `hue` is carried for the encoder graph only; the raster pipeline's step
/// order (temperature, saturation, brightness, contrast, overlay, clamp)
/// has no hue stage.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RasterAdjustments {
    /// Additive, `-100..=100`, mapped onto a `-255..=255` channel shift.
    pub brightness: f64,
    /// Gain about the channel midpoint, `-255..255`.
    pub contrast: f64,
    /// `1.0` leaves colors untouched; `0.0` is grayscale.
    pub saturation: f64,
    /// Hue rotation in degrees, encoder graph only.
    pub hue: f64,
    /// `-100..=100`; warm shifts are positive.
    pub temperature: f64,
    pub overlay: Option<ColorOverlay>,
}

impl RasterAdjustments {
    const IDENTITY: Self = Self {
        brightness: 0.0,
        contrast: 0.0,
        saturation: 1.0,
        hue: 0.0,
        temperature: 0.0,
        overlay: None,
    };

    fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// A named color grade: raster parameters plus the equivalent ffmpeg
/// filter-graph fragment. The catalog is fixed; presets are looked up,
/// never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterPreset {
    pub name: &'static str,
    pub raster: RasterAdjustments,
    /// Unlabelled fragment; empty means "omit this stage".
    pub graph: &'static str,
}

/// Catalog names, in catalog order.
pub const PRESET_NAMES: [&str; 8] = [
    "none", "winter", "autumn", "spring", "summer", "night", "sepia", "vintage",
];

static PRESETS: [FilterPreset; 8] = [
    FilterPreset {
        name: "none",
        raster: RasterAdjustments::IDENTITY,
        graph: "",
    },
    FilterPreset {
        name: "winter",
        raster: RasterAdjustments {
            brightness: 5.0,
            contrast: 5.0,
            saturation: 0.7,
            hue: 0.0,
            temperature: -40.0,
            overlay: Some(ColorOverlay {
                r: 205,
                g: 222,
                b: 255,
                opacity: 0.12,
            }),
        },
        graph: "eq=brightness=0.05:contrast=1.05:saturation=0.7,colorbalance=rs=-0.15:bs=0.15",
    },
    FilterPreset {
        name: "autumn",
        raster: RasterAdjustments {
            brightness: 0.0,
            contrast: 8.0,
            saturation: 1.15,
            hue: -10.0,
            temperature: 35.0,
            overlay: Some(ColorOverlay {
                r: 255,
                g: 147,
                b: 41,
                opacity: 0.08,
            }),
        },
        graph: "eq=contrast=1.08:saturation=1.15,colorbalance=rs=0.12:bs=-0.12,hue=h=-10",
    },
    FilterPreset {
        name: "spring",
        raster: RasterAdjustments {
            brightness: 6.0,
            contrast: 0.0,
            saturation: 1.2,
            hue: 0.0,
            temperature: 10.0,
            overlay: None,
        },
        graph: "eq=brightness=0.06:saturation=1.2,colorbalance=rs=0.04:bs=-0.04",
    },
    FilterPreset {
        name: "summer",
        raster: RasterAdjustments {
            brightness: 4.0,
            contrast: 10.0,
            saturation: 1.3,
            hue: 0.0,
            temperature: 25.0,
            overlay: None,
        },
        graph: "eq=brightness=0.04:contrast=1.1:saturation=1.3,colorbalance=rs=0.1:bs=-0.1",
    },
    FilterPreset {
        name: "night",
        raster: RasterAdjustments {
            brightness: -35.0,
            contrast: 10.0,
            saturation: 0.6,
            hue: 0.0,
            temperature: -30.0,
            overlay: Some(ColorOverlay {
                r: 16,
                g: 24,
                b: 64,
                opacity: 0.25,
            }),
        },
        graph: "eq=brightness=-0.35:contrast=1.1:saturation=0.6,colorbalance=rs=-0.12:bs=0.12",
    },
    FilterPreset {
        name: "sepia",
        raster: RasterAdjustments {
            brightness: 2.0,
            contrast: 5.0,
            saturation: 0.25,
            hue: 0.0,
            temperature: 45.0,
            overlay: Some(ColorOverlay {
                r: 112,
                g: 66,
                b: 20,
                opacity: 0.18,
            }),
        },
        graph: "colorchannelmixer=.393:.769:.189:0:.349:.686:.168:0:.272:.534:.131,eq=contrast=1.05",
    },
    FilterPreset {
        name: "vintage",
        raster: RasterAdjustments {
            brightness: 3.0,
            contrast: -8.0,
            saturation: 0.75,
            hue: 5.0,
            temperature: 20.0,
            overlay: Some(ColorOverlay {
                r: 255,
                g: 240,
                b: 200,
                opacity: 0.08,
            }),
        },
        graph: "eq=brightness=0.03:contrast=0.92:saturation=0.75,colorbalance=rs=0.08:bs=-0.08,hue=h=5",
    },
];

/// Look up a preset by name; unknown names resolve to the identity preset
/// so forward-compatible callers never fail here.
pub fn by_name(name: &str) -> &'static FilterPreset {
    PRESETS
        .iter()
        .find(|p| p.name == name)
        .unwrap_or(&PRESETS[0])
}

/// The preset's encoder fragment bracketed with the given stream labels,
/// or an empty string for the identity preset ("omit this stage").
pub fn graph_for(name: &str, input_label: &str, output_label: &str) -> String {
    let preset = by_name(name);
    if preset.graph.is_empty() {
        return String::new();
    }
    format!("[{input_label}]{}[{output_label}]", preset.graph)
}

/// Grade a straight-alpha raster in place. Zero-alpha pixels are skipped.
///
/// The per-pixel step order is fixed and not commutative: temperature,
/// saturation, brightness, contrast, overlay, then clamp and round.
pub fn apply_to_raster(raster: &mut RgbaRaster, preset: &FilterPreset) {
    let adj = &preset.raster;
    if adj.is_identity() {
        return;
    }

    let brightness_shift = adj.brightness * 2.55;
    let contrast_gain =
        (259.0 * (adj.contrast + 255.0)) / (255.0 * (259.0 - adj.contrast));

    for px in raster.data_mut().chunks_exact_mut(4) {
        if px[3] == 0 {
            continue;
        }

        let mut r = f64::from(px[0]);
        let mut g = f64::from(px[1]);
        let mut b = f64::from(px[2]);

        if adj.temperature != 0.0 {
            let f = adj.temperature / 100.0;
            if f > 0.0 {
                r += 30.0 * f;
                g += 10.0 * f;
                b -= 20.0 * f;
            } else {
                r += 20.0 * f;
                b -= 30.0 * f;
            }
        }

        let luma = 0.299 * r + 0.587 * g + 0.114 * b;
        r = luma + adj.saturation * (r - luma);
        g = luma + adj.saturation * (g - luma);
        b = luma + adj.saturation * (b - luma);

        r += brightness_shift;
        g += brightness_shift;
        b += brightness_shift;

        r = contrast_gain * (r - 128.0) + 128.0;
        g = contrast_gain * (g - 128.0) + 128.0;
        b = contrast_gain * (b - 128.0) + 128.0;

        if let Some(overlay) = adj.overlay
            && overlay.opacity > 0.0
        {
            let w = overlay.opacity.clamp(0.0, 1.0);
            r = r * (1.0 - w) + f64::from(overlay.r) * w;
            g = g * (1.0 - w) + f64::from(overlay.g) * w;
            b = b * (1.0 - w) + f64::from(overlay.b) * w;
        }

        px[0] = r.clamp(0.0, 255.0).round() as u8;
        px[1] = g.clamp(0.0, 255.0).round() as u8;
        px[2] = b.clamp(0.0, 255.0).round() as u8;
    }
}
