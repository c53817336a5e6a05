use crate::{
    core::Canvas,
    error::{TilegardenError, TilegardenResult},
};

/// Horizontal margin around the diamond, split across both sides.
const HORIZONTAL_MARGIN: f64 = 400.0;
/// Vertical margin covering tile height and shadow bleed below the diamond.
const VERTICAL_MARGIN: f64 = 800.0;
/// Offset from the canvas top to the first tile row.
const TOP_MARGIN: f64 = 600.0;

/// Tile metrics for one diorama. Immutable once constructed; every geometry
/// and render call takes it as a parameter.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridConfig {
    /// Width of a tile's top-face diamond in pixels.
    pub tile_width: f64,
    /// Height of the grass band on the side faces.
    pub grass_height: f64,
    /// Height of the soil band below the grass.
    pub soil_height: f64,
    /// Uniform scale applied to stylistic details (wave amplitude, tufts).
    pub scale_factor: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_width: 400.0,
            grass_height: 60.0,
            soil_height: 160.0,
            scale_factor: 1.0,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> TilegardenResult<()> {
        for (name, v) in [
            ("tile_width", self.tile_width),
            ("grass_height", self.grass_height),
            ("soil_height", self.soil_height),
            ("scale_factor", self.scale_factor),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(TilegardenError::validation(format!(
                    "GridConfig.{name} must be finite and > 0"
                )));
            }
        }
        Ok(())
    }

    /// Half-diagonal of the top-face diamond along x.
    pub(crate) fn half_tile(&self) -> f64 {
        self.tile_width / 2.0
    }

    /// Half-diagonal of the top-face diamond along y.
    pub(crate) fn quarter_tile(&self) -> f64 {
        self.tile_width / 4.0
    }
}

/// A tile's logical grid address plus the screen-space center of its top face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridPosition {
    /// Logical column, `0..grid_size`.
    pub grid_x: u32,
    /// Logical row, `0..grid_size`.
    pub grid_y: u32,
    /// Screen-space x of the top-face center.
    pub pixel_x: i32,
    /// Screen-space y of the top-face center.
    pub pixel_y: i32,
}

/// Minimal square canvas that fits a `grid_size x grid_size` diamond plus
/// fixed margins for tile height and shadow bleed.
pub fn canvas_dimensions(grid_size: u32, config: &GridConfig) -> TilegardenResult<Canvas> {
    if grid_size == 0 {
        return Err(TilegardenError::validation("grid size must be > 0"));
    }
    config.validate()?;

    let g = f64::from(grid_size);
    let width = 2.0 * g * config.half_tile() + HORIZONTAL_MARGIN;
    let height = g * config.half_tile()
        + 2.0 * (config.soil_height + config.grass_height)
        + VERTICAL_MARGIN;

    // Square canvas on the larger extent so the diamond is never clipped.
    let side = width.max(height).round() as u32;
    Ok(Canvas {
        width: side,
        height: side,
    })
}

/// One `GridPosition` per tile of a `grid_size x grid_size` grid, in
/// row-major generation order. Ordering for compositing is the concern of
/// [`crate::order::paint_order`], not this function.
pub fn tile_positions(
    grid_size: u32,
    canvas_width: u32,
    config: &GridConfig,
) -> TilegardenResult<Vec<GridPosition>> {
    if grid_size == 0 {
        return Err(TilegardenError::validation("grid size must be > 0"));
    }
    if canvas_width == 0 {
        return Err(TilegardenError::validation("canvas width must be > 0"));
    }
    config.validate()?;

    let half_w = f64::from(canvas_width) / 2.0;
    let mut positions = Vec::with_capacity(grid_size as usize * grid_size as usize);
    for y in 0..grid_size {
        for x in 0..grid_size {
            let iso_x = (f64::from(x) - f64::from(y)) * config.half_tile();
            let iso_y = (f64::from(x) + f64::from(y)) * config.quarter_tile();
            positions.push(GridPosition {
                grid_x: x,
                grid_y: y,
                pixel_x: (half_w + iso_x).round() as i32,
                pixel_y: (TOP_MARGIN + iso_y + config.quarter_tile()).round() as i32,
            });
        }
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_config() -> GridConfig {
        GridConfig {
            tile_width: 400.0,
            grass_height: 60.0,
            soil_height: 160.0,
            scale_factor: 1.0,
        }
    }

    #[test]
    fn reference_scenario_canvas_is_1840_square() {
        let canvas = canvas_dimensions(3, &reference_config()).unwrap();
        assert_eq!(
            canvas,
            Canvas {
                width: 1840,
                height: 1840
            }
        );
    }

    #[test]
    fn reference_scenario_single_tile_center() {
        let positions = tile_positions(1, 1840, &reference_config()).unwrap();
        assert_eq!(positions.len(), 1);
        let p = positions[0];
        assert_eq!((p.grid_x, p.grid_y), (0, 0));
        assert_eq!((p.pixel_x, p.pixel_y), (920, 700));
    }

    #[test]
    fn positions_are_deterministic_and_bijective() {
        let cfg = reference_config();
        let a = tile_positions(4, 2000, &cfg).unwrap();
        let b = tile_positions(4, 2000, &cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);

        let mut centers: Vec<(i32, i32)> = a.iter().map(|p| (p.pixel_x, p.pixel_y)).collect();
        centers.sort_unstable();
        centers.dedup();
        assert_eq!(centers.len(), 16, "tile centers must be distinct");
    }

    #[test]
    fn generation_order_is_row_major() {
        let positions = tile_positions(2, 1000, &reference_config()).unwrap();
        let addresses: Vec<(u32, u32)> =
            positions.iter().map(|p| (p.grid_x, p.grid_y)).collect();
        assert_eq!(addresses, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn configuration_errors_are_rejected_at_the_boundary() {
        assert!(canvas_dimensions(0, &reference_config()).is_err());
        assert!(tile_positions(0, 100, &reference_config()).is_err());
        assert!(tile_positions(2, 0, &reference_config()).is_err());

        let mut bad = reference_config();
        bad.tile_width = 0.0;
        assert!(canvas_dimensions(2, &bad).is_err());

        bad = reference_config();
        bad.grass_height = -1.0;
        assert!(canvas_dimensions(2, &bad).is_err());

        bad = reference_config();
        bad.scale_factor = f64::NAN;
        assert!(tile_positions(2, 100, &bad).is_err());
    }
}
