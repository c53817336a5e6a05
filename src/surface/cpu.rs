use std::sync::Arc;

use crate::{
    core::{self, Canvas, Point, Rect, Rgba8, RgbaRaster},
    error::{TilegardenError, TilegardenResult},
    surface::{DrawSurface, PixelRect},
};

/// CPU drawing surface backed by a `vello_cpu` pixmap.
///
/// Draw calls are queued on a render context and replayed onto the pixmap
/// whenever raw pixel access needs a consistent view, mirroring the
/// flush-then-read discipline of a scene pass.
pub struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuSurface {
    pub fn new(canvas: Canvas) -> TilegardenResult<Self> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| TilegardenError::evaluation("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| TilegardenError::evaluation("surface height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(TilegardenError::validation(
                "surface width/height must be non-zero",
            ));
        }

        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
            ctx: None,
        })
    }

    /// Fill the whole surface with one color, dropping any queued draws.
    pub fn clear(&mut self, color: Rgba8) {
        self.ctx = None;
        let premul = premul_bytes(color);
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&premul);
        }
    }

    /// Flush queued draws and take the finished raster, straight alpha.
    pub fn into_raster(mut self) -> TilegardenResult<RgbaRaster> {
        self.flush_ops();
        let mut data = self.pixmap.data_as_u8_slice().to_vec();
        core::unpremultiply_rgba8_in_place(&mut data);
        RgbaRaster::from_raw(u32::from(self.width), u32::from(self.height), data)
    }

    fn ctx(&mut self) -> &mut vello_cpu::RenderContext {
        let (w, h) = (self.width, self.height);
        self.ctx
            .get_or_insert_with(|| vello_cpu::RenderContext::new(w, h))
    }

    fn flush_ops(&mut self) {
        if let Some(mut ctx) = self.ctx.take() {
            ctx.flush();
            ctx.render_to_pixmap(&mut self.pixmap);
        }
    }

    fn check_region(&self, region: PixelRect) -> TilegardenResult<()> {
        if region.width == 0 || region.height == 0 {
            return Err(TilegardenError::validation(
                "pixel region must be non-empty",
            ));
        }
        let in_x = region.x.checked_add(region.width).is_some_and(|end| end <= u32::from(self.width));
        let in_y = region
            .y
            .checked_add(region.height)
            .is_some_and(|end| end <= u32::from(self.height));
        if !in_x || !in_y {
            return Err(TilegardenError::validation(
                "pixel region exceeds surface bounds",
            ));
        }
        Ok(())
    }
}

impl DrawSurface for CpuSurface {
    fn width(&self) -> u32 {
        u32::from(self.width)
    }

    fn height(&self) -> u32 {
        u32::from(self.height)
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgba8) -> TilegardenResult<()> {
        let path = polygon_path(points)?;
        let ctx = self.ctx();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(color));
        ctx.fill_path(&path);
        Ok(())
    }

    fn stroke_polygon(
        &mut self,
        points: &[Point],
        color: Rgba8,
        stroke_width: f64,
    ) -> TilegardenResult<()> {
        if !stroke_width.is_finite() || stroke_width <= 0.0 {
            return Err(TilegardenError::validation(
                "stroke width must be finite and > 0",
            ));
        }
        let path = polygon_path(points)?;
        let ctx = self.ctx();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(color));
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(stroke_width));
        ctx.stroke_path(&path);
        Ok(())
    }

    fn fill_ellipse(
        &mut self,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        color: Rgba8,
    ) -> TilegardenResult<()> {
        if !radius_x.is_finite() || !radius_y.is_finite() || radius_x <= 0.0 || radius_y <= 0.0 {
            return Err(TilegardenError::validation(
                "ellipse radii must be finite and > 0",
            ));
        }
        use vello_cpu::kurbo::Shape as _;
        let ellipse = vello_cpu::kurbo::Ellipse::new(
            point_to_cpu(center),
            vello_cpu::kurbo::Vec2::new(radius_x, radius_y),
            0.0,
        );
        let path = ellipse.to_path(0.1);
        let ctx = self.ctx();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(color));
        ctx.fill_path(&path);
        Ok(())
    }

    fn draw_raster(&mut self, raster: &RgbaRaster, dest: Rect) -> TilegardenResult<()> {
        if !dest.x0.is_finite() || !dest.y0.is_finite() || !dest.x1.is_finite() || !dest.y1.is_finite()
        {
            return Err(TilegardenError::validation("draw rect must be finite"));
        }
        if dest.width() <= 0.0 || dest.height() <= 0.0 {
            return Err(TilegardenError::validation(
                "draw rect must have positive extent",
            ));
        }

        let paint = raster_to_image_paint(raster)?;
        let sx = dest.width() / f64::from(raster.width());
        let sy = dest.height() / f64::from(raster.height());
        let transform = vello_cpu::kurbo::Affine::translate((dest.x0, dest.y0))
            * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy);

        let (w, h) = (f64::from(raster.width()), f64::from(raster.height()));
        let ctx = self.ctx();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(transform);
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        Ok(())
    }

    fn read_pixels(&mut self, region: PixelRect) -> TilegardenResult<RgbaRaster> {
        self.check_region(region)?;
        self.flush_ops();

        let stride = usize::from(self.width) * 4;
        let src = self.pixmap.data_as_u8_slice();
        let row_bytes = region.width as usize * 4;
        let mut data = Vec::with_capacity(region.height as usize * row_bytes);
        for row in 0..region.height as usize {
            let start = (region.y as usize + row) * stride + region.x as usize * 4;
            data.extend_from_slice(&src[start..start + row_bytes]);
        }
        core::unpremultiply_rgba8_in_place(&mut data);
        RgbaRaster::from_raw(region.width, region.height, data)
    }

    fn write_pixels(&mut self, region: PixelRect, pixels: &RgbaRaster) -> TilegardenResult<()> {
        self.check_region(region)?;
        if pixels.width() != region.width || pixels.height() != region.height {
            return Err(TilegardenError::validation(
                "pixel buffer dimensions must match the target region",
            ));
        }
        self.flush_ops();

        let mut premul = pixels.data().to_vec();
        core::premultiply_rgba8_in_place(&mut premul);

        let stride = usize::from(self.width) * 4;
        let dst = self.pixmap.data_as_u8_slice_mut();
        let row_bytes = region.width as usize * 4;
        for row in 0..region.height as usize {
            let start = (region.y as usize + row) * stride + region.x as usize * 4;
            dst[start..start + row_bytes]
                .copy_from_slice(&premul[row * row_bytes..(row + 1) * row_bytes]);
        }
        Ok(())
    }
}

fn premul_bytes(color: Rgba8) -> [u8; 4] {
    let mut px = [color.r, color.g, color.b, color.a];
    core::premultiply_rgba8_in_place(&mut px);
    px
}

fn color_to_cpu(color: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn polygon_path(points: &[Point]) -> TilegardenResult<vello_cpu::kurbo::BezPath> {
    if points.len() < 3 {
        return Err(TilegardenError::validation(
            "polygon needs at least 3 points",
        ));
    }
    let mut path = vello_cpu::kurbo::BezPath::new();
    path.move_to(point_to_cpu(points[0]));
    for &p in &points[1..] {
        path.line_to(point_to_cpu(p));
    }
    path.close_path();
    Ok(path)
}

fn raster_to_image_paint(raster: &RgbaRaster) -> TilegardenResult<vello_cpu::Image> {
    let w: u16 = raster
        .width()
        .try_into()
        .map_err(|_| TilegardenError::evaluation("raster width exceeds u16"))?;
    let h: u16 = raster
        .height()
        .try_into()
        .map_err(|_| TilegardenError::evaluation("raster height exceeds u16"))?;

    let mut premul = raster.data().to_vec();
    core::premultiply_rgba8_in_place(&mut premul);

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(premul.len() / 4);
    for px in premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}
