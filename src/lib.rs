#![forbid(unsafe_code)]

pub mod anchor;
pub mod core;
pub mod error;
pub mod filter;
pub mod grid;
pub mod order;
pub mod scene;
pub mod sprite;
pub mod surface;
pub mod tile;

pub use anchor::{ContentAnchor, detect_anchor};
pub use core::{Canvas, Point, Rect, Rgba8, RgbaRaster, Vec2};
pub use error::{TilegardenError, TilegardenResult};
pub use filter::{FilterPreset, apply_to_raster, by_name, graph_for};
pub use grid::{GridConfig, GridPosition, canvas_dimensions, tile_positions};
pub use order::paint_order;
pub use scene::{Diorama, Placement, SpriteAsset, render_diorama};
pub use sprite::SpriteMedia;
pub use surface::{CpuSurface, DrawSurface, PixelRect};
pub use tile::{TileRenderOptions, draw_tile, sprite_placement, wavy_edge};
