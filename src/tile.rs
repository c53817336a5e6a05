use crate::{
    anchor::ContentAnchor,
    core::{Point, Rect, Rgba8, Vec2},
    error::TilegardenResult,
    grid::{GridConfig, GridPosition},
    surface::DrawSurface,
};

const GRASS_TOP: Rgba8 = Rgba8::new(124, 179, 66, 255);
const GRASS_TOP_STROKE: Rgba8 = Rgba8::new(85, 139, 47, 255);
const GRASS_LEFT: Rgba8 = Rgba8::new(104, 159, 56, 255);
const GRASS_RIGHT: Rgba8 = Rgba8::new(85, 139, 47, 255);
const SOIL_LEFT: Rgba8 = Rgba8::new(121, 85, 72, 255);
const SOIL_RIGHT: Rgba8 = Rgba8::new(93, 64, 55, 255);
const SHADOW: Rgba8 = Rgba8::new(0, 0, 0, 60);
const TUFT: Rgba8 = Rgba8::new(139, 195, 74, 255);

/// Full waves per grass/soil seam edge.
const WAVE_FREQUENCY: f64 = 2.0;
/// Straight segments approximating one seam edge.
const WAVE_SEGMENTS: usize = 16;
/// Default shadow horizontal radius as a fraction of the tile width.
const SHADOW_WIDTH_FRACTION: f64 = 0.3;
/// Horizontal-to-vertical shadow radius ratio.
const SHADOW_ASPECT: f64 = 2.5;

/// Per-draw-call options for one tile.
#[derive(Clone, Copy, Debug, Default)]
pub struct TileRenderOptions {
    /// Ground the tile's occupant with a soft ellipse.
    pub has_shadow: bool,
    /// Shadow diameter override; falls back to a fixed fraction of the
    /// tile width when absent or non-positive.
    pub shadow_width: Option<f64>,
    /// Allow a grass tuft on unoccupied tiles.
    pub draw_decoration: bool,
}

/// Sample `segments + 1` points along the sinusoidal seam between `a` and
/// `b`, displacing each perpendicular to the edge direction.
///
/// A grass face's bottom edge and the adjoining soil face's top edge must
/// both be generated by this function with identical endpoints and
/// parameters; that is what keeps the seam gap-free.
pub fn wavy_edge(a: Point, b: Point, amplitude: f64, frequency: f64, segments: usize) -> Vec<Point> {
    let segments = segments.max(1);
    let dir = b - a;
    let len = dir.hypot();
    if len == 0.0 {
        return vec![a; segments + 1];
    }
    let perp = Vec2::new(-dir.y, dir.x) * (1.0 / len);

    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            let offset = amplitude * (std::f64::consts::TAU * frequency * t).sin();
            a + dir * t + perp * offset
        })
        .collect()
}

struct TileCorners {
    top: Point,
    right: Point,
    bottom: Point,
    left: Point,
}

fn corners(pos: &GridPosition, config: &GridConfig) -> TileCorners {
    let cx = f64::from(pos.pixel_x);
    let cy = f64::from(pos.pixel_y);
    TileCorners {
        top: Point::new(cx, cy - config.quarter_tile()),
        right: Point::new(cx + config.half_tile(), cy),
        bottom: Point::new(cx, cy + config.quarter_tile()),
        left: Point::new(cx - config.half_tile(), cy),
    }
}

fn down(p: Point, dy: f64) -> Point {
    Point::new(p.x, p.y + dy)
}

/// Grass face between two top-face corners: straight top edge, wavy seam
/// as its trailing edge.
pub(crate) fn grass_face_points(
    edge_a: Point,
    edge_b: Point,
    grass_height: f64,
    amplitude: f64,
) -> Vec<Point> {
    let seam = wavy_edge(
        down(edge_a, grass_height),
        down(edge_b, grass_height),
        amplitude,
        WAVE_FREQUENCY,
        WAVE_SEGMENTS,
    );
    let mut points = vec![edge_a, edge_b];
    points.extend(seam.into_iter().rev());
    points
}

/// Soil face below a seam: wavy leading edge, straight bottom.
pub(crate) fn soil_face_points(
    seam_a: Point,
    seam_b: Point,
    soil_height: f64,
    amplitude: f64,
) -> Vec<Point> {
    let mut points = wavy_edge(seam_a, seam_b, amplitude, WAVE_FREQUENCY, WAVE_SEGMENTS);
    points.push(down(seam_b, soil_height));
    points.push(down(seam_a, soil_height));
    points
}

/// Paint one tile back-to-front: right soil, left soil, right grass, left
/// grass, top face, then the optional shadow or tuft.
pub fn draw_tile(
    surface: &mut dyn DrawSurface,
    pos: &GridPosition,
    config: &GridConfig,
    opts: &TileRenderOptions,
) -> TilegardenResult<()> {
    config.validate()?;

    let c = corners(pos, config);
    let amplitude = 3.0 * config.scale_factor;
    let grass = config.grass_height;
    let soil = config.soil_height;

    surface.fill_polygon(
        &soil_face_points(down(c.bottom, grass), down(c.right, grass), soil, amplitude),
        SOIL_RIGHT,
    )?;
    surface.fill_polygon(
        &soil_face_points(down(c.left, grass), down(c.bottom, grass), soil, amplitude),
        SOIL_LEFT,
    )?;
    surface.fill_polygon(&grass_face_points(c.bottom, c.right, grass, amplitude), GRASS_RIGHT)?;
    surface.fill_polygon(&grass_face_points(c.left, c.bottom, grass, amplitude), GRASS_LEFT)?;

    let top = [c.top, c.right, c.bottom, c.left];
    surface.fill_polygon(&top, GRASS_TOP)?;
    surface.stroke_polygon(&top, GRASS_TOP_STROKE, 1.5 * config.scale_factor)?;

    if opts.has_shadow {
        let radius_x = match opts.shadow_width {
            Some(w) if w > 0.0 => w / 2.0,
            _ => SHADOW_WIDTH_FRACTION * config.tile_width,
        };
        surface.fill_ellipse(
            Point::new(f64::from(pos.pixel_x), f64::from(pos.pixel_y)),
            radius_x,
            radius_x / SHADOW_ASPECT,
            SHADOW,
        )?;
    } else if opts.draw_decoration {
        draw_tuft(surface, pos, config)?;
    }

    Ok(())
}

/// Fractional-sine hash in `[0, 1)`. The formula is part of the visual
/// contract: the same grid address always produces the same decoration,
/// with no stored seed.
fn hash01(grid_x: u32, grid_y: u32, salt: f64) -> f64 {
    let v = (f64::from(grid_x) * 12.9898 + f64::from(grid_y) * 78.233 + salt).sin() * 43758.5453;
    v - v.floor()
}

fn draw_tuft(
    surface: &mut dyn DrawSurface,
    pos: &GridPosition,
    config: &GridConfig,
) -> TilegardenResult<()> {
    // Roughly half of eligible tiles stay bare.
    if hash01(pos.grid_x, pos.grid_y, 0.0) >= 0.5 {
        return Ok(());
    }

    let s = config.scale_factor;
    let jitter_x = (hash01(pos.grid_x, pos.grid_y, 1.0) - 0.5) * config.half_tile() * 0.6;
    let jitter_y = (hash01(pos.grid_x, pos.grid_y, 2.0) - 0.5) * config.quarter_tile() * 0.6;
    let base = Point::new(
        f64::from(pos.pixel_x) + jitter_x,
        f64::from(pos.pixel_y) + jitter_y,
    );

    for blade in 0..3u32 {
        let dx = (f64::from(blade) - 1.0) * 3.0 * s;
        let height = (6.0 + 4.0 * hash01(pos.grid_x, pos.grid_y, 3.0 + f64::from(blade))) * s;
        let lean = (hash01(pos.grid_x, pos.grid_y, 6.0 + f64::from(blade)) - 0.5) * 4.0 * s;
        surface.fill_polygon(
            &[
                Point::new(base.x + dx - 1.2 * s, base.y),
                Point::new(base.x + dx + 1.2 * s, base.y),
                Point::new(base.x + dx + lean, base.y - height),
            ],
            TUFT,
        )?;
    }
    Ok(())
}

/// Draw rectangle that lands a sprite's detected anchor on the tile's
/// pixel center, correcting the horizontal offset and bottom padding of
/// asymmetric transparent margins.
pub fn sprite_placement(
    pos: &GridPosition,
    sprite_width: u32,
    sprite_height: u32,
    anchor: &ContentAnchor,
    scale: f64,
) -> Rect {
    let w = f64::from(sprite_width) * scale;
    let h = f64::from(sprite_height) * scale;
    let x0 = f64::from(pos.pixel_x) - w / 2.0 - anchor.x_offset * scale;
    let y0 = f64::from(pos.pixel_y) - h + anchor.y_padding * scale;
    Rect::new(x0, y0, x0 + w, y0 + h)
}
