use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::{
    anchor::{ContentAnchor, detect_anchor},
    core::RgbaRaster,
    error::{TilegardenError, TilegardenResult},
    filter,
    grid::{GridConfig, canvas_dimensions, tile_positions},
    order::paint_order,
    sprite::{SpriteMedia, fallback_sample_raster, load_sprite},
    surface::{CpuSurface, DrawSurface},
    tile::{TileRenderOptions, draw_tile, sprite_placement},
};

/// One diorama: grid metrics, sprite assets, placements, and grading.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Diorama {
    pub grid_size: u32,
    pub config: GridConfig,
    /// Straight-alpha background fill; `None` leaves the canvas transparent.
    #[serde(default)]
    pub background: Option<[u8; 4]>,
    /// Allow grass tufts on unoccupied tiles.
    #[serde(default)]
    pub decorations: bool,
    /// Grading preset name; unknown names resolve to `none`.
    #[serde(default)]
    pub filter: Option<String>,
    /// Sprite assets by stable key.
    #[serde(default)]
    pub sprites: BTreeMap<String, SpriteAsset>,
    #[serde(default)]
    pub placements: Vec<Placement>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum SpriteAsset {
    Image(ImageSprite),
    Sample(SampleSprite),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImageSprite {
    /// Image path, resolved against the scene's assets root.
    pub source: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SampleSprite {
    /// Built-in fallback sample name.
    pub name: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    pub grid_x: u32,
    pub grid_y: u32,
    /// Key into [`Diorama::sprites`].
    pub sprite: String,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Diorama {
    pub fn validate(&self) -> TilegardenResult<()> {
        if self.grid_size == 0 {
            return Err(TilegardenError::validation("grid_size must be > 0"));
        }
        self.config.validate()?;

        let mut occupied = HashMap::new();
        for p in &self.placements {
            if p.grid_x >= self.grid_size || p.grid_y >= self.grid_size {
                return Err(TilegardenError::validation(format!(
                    "placement ({}, {}) is outside the {size}x{size} grid",
                    p.grid_x,
                    p.grid_y,
                    size = self.grid_size
                )));
            }
            if !self.sprites.contains_key(&p.sprite) {
                return Err(TilegardenError::validation(format!(
                    "placement references unknown sprite '{}'",
                    p.sprite
                )));
            }
            if !p.scale.is_finite() || p.scale <= 0.0 {
                return Err(TilegardenError::validation(format!(
                    "placement ({}, {}) scale must be finite and > 0",
                    p.grid_x, p.grid_y
                )));
            }
            if occupied.insert((p.grid_x, p.grid_y), &p.sprite).is_some() {
                return Err(TilegardenError::validation(format!(
                    "duplicate placement at ({}, {})",
                    p.grid_x, p.grid_y
                )));
            }
        }
        Ok(())
    }
}

/// Resolve a sprite asset to its media outcome without touching pixels.
pub fn resolve_media(asset: &SpriteAsset, assets_root: &Path) -> SpriteMedia {
    match asset {
        SpriteAsset::Image(img) => SpriteMedia::ImageFile(assets_root.join(&img.source)),
        SpriteAsset::Sample(sample) => SpriteMedia::FallbackSample(sample.name.clone()),
    }
}

/// Materialize media into a raster the compositor can place.
pub fn load_media(media: &SpriteMedia) -> TilegardenResult<RgbaRaster> {
    match media {
        SpriteMedia::ImageFile(path) => load_sprite(path),
        SpriteMedia::Buffer(raster) => Ok(raster.clone()),
        SpriteMedia::FallbackSample(name) => fallback_sample_raster(name),
        SpriteMedia::VideoFile(path) => Err(TilegardenError::evaluation(format!(
            "video media '{}' is consumed by the encoding pipeline, not the raster compositor",
            path.display()
        ))),
    }
}

/// Render a whole diorama: positions, paint order, tiles, sprites, and the
/// optional grading pass, as one deterministic raster.
pub fn render_diorama(scene: &Diorama, assets_root: &Path) -> TilegardenResult<RgbaRaster> {
    scene.validate()?;

    let canvas = canvas_dimensions(scene.grid_size, &scene.config)?;
    tracing::debug!(width = canvas.width, height = canvas.height, "diorama canvas");

    let mut surface = CpuSurface::new(canvas)?;
    if let Some([r, g, b, a]) = scene.background {
        surface.clear(crate::core::Rgba8::new(r, g, b, a));
    }

    let positions = tile_positions(scene.grid_size, canvas.width, &scene.config)?;
    let ordered = paint_order(&positions);

    // Decode each referenced sprite once; the anchor is detected once per
    // asset and cached alongside it.
    let mut prepared: BTreeMap<&str, (RgbaRaster, ContentAnchor)> = BTreeMap::new();
    for p in &scene.placements {
        if prepared.contains_key(p.sprite.as_str()) {
            continue;
        }
        let asset = &scene.sprites[&p.sprite];
        let raster = load_media(&resolve_media(asset, assets_root))?;
        let anchor = detect_anchor(&raster);
        prepared.insert(p.sprite.as_str(), (raster, anchor));
    }

    let by_cell: HashMap<(u32, u32), &Placement> = scene
        .placements
        .iter()
        .map(|p| ((p.grid_x, p.grid_y), p))
        .collect();

    for pos in &ordered {
        let placement = by_cell.get(&(pos.grid_x, pos.grid_y)).copied();
        let shadow_width = placement.and_then(|p| {
            let (_, anchor) = &prepared[p.sprite.as_str()];
            (anchor.content_width > 0.0).then(|| anchor.content_width * p.scale)
        });

        draw_tile(
            &mut surface,
            pos,
            &scene.config,
            &TileRenderOptions {
                has_shadow: placement.is_some(),
                shadow_width,
                draw_decoration: scene.decorations,
            },
        )?;

        if let Some(p) = placement {
            let (raster, anchor) = &prepared[p.sprite.as_str()];
            let dest = sprite_placement(pos, raster.width(), raster.height(), anchor, p.scale);
            surface.draw_raster(raster, dest)?;
        }
    }

    let mut out = surface.into_raster()?;
    if let Some(name) = &scene.filter {
        let preset = filter::by_name(name);
        tracing::debug!(preset = preset.name, "grading pass");
        filter::apply_to_raster(&mut out, preset);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_scene() -> Diorama {
        let mut sprites = BTreeMap::new();
        sprites.insert(
            "tree".to_string(),
            SpriteAsset::Sample(SampleSprite {
                name: "oak".to_string(),
            }),
        );
        Diorama {
            grid_size: 2,
            config: GridConfig {
                tile_width: 40.0,
                grass_height: 6.0,
                soil_height: 16.0,
                scale_factor: 0.1,
            },
            background: None,
            decorations: true,
            filter: None,
            sprites,
            placements: vec![Placement {
                grid_x: 0,
                grid_y: 1,
                sprite: "tree".to_string(),
                scale: 1.0,
            }],
        }
    }

    #[test]
    fn validate_rejects_bad_scenes() {
        let mut s = small_scene();
        s.grid_size = 0;
        assert!(s.validate().is_err());

        let mut s = small_scene();
        s.placements[0].grid_x = 2;
        assert!(s.validate().is_err());

        let mut s = small_scene();
        s.placements[0].sprite = "missing".to_string();
        assert!(s.validate().is_err());

        let mut s = small_scene();
        s.placements[0].scale = 0.0;
        assert!(s.validate().is_err());

        let mut s = small_scene();
        let dup = s.placements[0].clone();
        s.placements.push(dup);
        assert!(s.validate().is_err());

        assert!(small_scene().validate().is_ok());
    }

    #[test]
    fn video_media_is_refused_by_the_compositor() {
        let media = SpriteMedia::VideoFile(std::path::PathBuf::from("out/tree.mp4"));
        let err = load_media(&media).unwrap_err();
        assert!(err.to_string().contains("encoding pipeline"));
    }

    #[test]
    fn buffer_and_sample_media_materialize() {
        let buffer = RgbaRaster::new(2, 2).unwrap();
        let via_buffer = load_media(&SpriteMedia::Buffer(buffer.clone())).unwrap();
        assert_eq!(via_buffer, buffer);

        let via_sample =
            load_media(&SpriteMedia::FallbackSample("oak".to_string())).unwrap();
        assert_eq!(via_sample, fallback_sample_raster("oak").unwrap());
    }

    #[test]
    fn render_produces_a_square_nonempty_raster() {
        let scene = small_scene();
        let raster = render_diorama(&scene, Path::new(".")).unwrap();
        assert_eq!(raster.width(), raster.height());
        assert!(raster.data().iter().any(|&b| b != 0));
    }

    #[test]
    fn unknown_filter_name_degrades_to_identity() {
        let mut graded = small_scene();
        graded.filter = Some("definitely-not-a-preset".to_string());
        let plain = render_diorama(&small_scene(), Path::new(".")).unwrap();
        let fallback = render_diorama(&graded, Path::new(".")).unwrap();
        assert_eq!(plain, fallback);
    }
}
