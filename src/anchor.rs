use crate::core::RgbaRaster;

/// Alpha above which a pixel counts as solid content rather than an
/// anti-aliased edge.
const SOLID_ALPHA: u8 = 200;

/// Fraction of rows scanned, counted up from the bottom of the raster.
const SCAN_FRACTION: f64 = 0.3;

/// Where a sprite's visual base sits relative to its raw bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContentAnchor {
    /// Horizontal distance from the raster's geometric center to the
    /// content's center on the anchor row. Positive means content sits
    /// right of center.
    pub x_offset: f64,
    /// Transparent margin below the anchor row.
    pub y_padding: f64,
    /// Width of the solid span on the anchor row.
    pub content_width: f64,
}

/// Detect a sprite's visual base by scanning the bottom rows of its alpha
/// channel.
///
/// The anchor row is the scanned row with the highest opacity-weighted
/// average darkness. Trunks and stems are typically the darkest, most
/// opaque band near a sprite's base, which distinguishes them from lighter
/// foliage that may reach lower. This is a heuristic: light-colored or
/// trunk-less sprites may anchor on foliage instead.
///
/// A raster with no solid pixel in the scanned band yields the zero anchor;
/// "no visible content" is a valid result, not an error.
pub fn detect_anchor(raster: &RgbaRaster) -> ContentAnchor {
    let (w, h) = (raster.width(), raster.height());
    let scan_rows = ((f64::from(h) * SCAN_FRACTION).ceil() as u32).clamp(1, h);

    let mut best: Option<(u32, f64)> = None;
    for row in (h - scan_rows..h).rev() {
        let mut darkness = 0.0f64;
        let mut solid = 0u32;
        for x in 0..w {
            let px = raster.pixel(x, row);
            if px.a <= SOLID_ALPHA {
                continue;
            }
            let rgb_sum = u32::from(px.r) + u32::from(px.g) + u32::from(px.b);
            darkness += f64::from(765 - rgb_sum as i32) * f64::from(px.a) / 255.0;
            solid += 1;
        }
        if solid == 0 {
            continue;
        }
        let avg = darkness / f64::from(solid);
        // Strictly greater: on a tie the lowest row wins, since we scan
        // bottom-up.
        if best.is_none_or(|(_, b)| avg > b) {
            best = Some((row, avg));
        }
    }

    let Some((anchor_row, _)) = best else {
        return ContentAnchor::default();
    };

    let mut leftmost = None;
    let mut rightmost = 0u32;
    for x in 0..w {
        if raster.pixel(x, anchor_row).a > SOLID_ALPHA {
            leftmost.get_or_insert(x);
            rightmost = x;
        }
    }
    let leftmost = leftmost.unwrap_or(0);

    ContentAnchor {
        x_offset: f64::from(leftmost + rightmost) / 2.0 - f64::from(w) / 2.0,
        y_padding: f64::from(h - anchor_row - 1),
        content_width: f64::from(rightmost - leftmost + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rgba8;

    fn raster_with_rect(
        w: u32,
        h: u32,
        rows: std::ops::RangeInclusive<u32>,
        cols: std::ops::RangeInclusive<u32>,
        color: Rgba8,
    ) -> RgbaRaster {
        let mut r = RgbaRaster::new(w, h).unwrap();
        for y in rows {
            for x in cols.clone() {
                r.put_pixel(x, y, color);
            }
        }
        r
    }

    #[test]
    fn solid_rectangle_round_trips() {
        // Opaque dark rectangle rows 70..=89, cols 10..=29 in a 100x100 raster.
        let r = raster_with_rect(100, 100, 70..=89, 10..=29, Rgba8::new(40, 30, 20, 255));
        let a = detect_anchor(&r);
        assert_eq!(a.y_padding, 100.0 - 89.0 - 1.0);
        assert_eq!(a.content_width, 20.0);
        assert_eq!(a.x_offset, (10.0 + 29.0) / 2.0 - 50.0);
    }

    #[test]
    fn fully_transparent_raster_yields_zero_anchor() {
        let r = RgbaRaster::new(100, 100).unwrap();
        assert_eq!(detect_anchor(&r), ContentAnchor::default());
    }

    #[test]
    fn darker_trunk_row_beats_lighter_foliage_below() {
        let mut r = RgbaRaster::new(60, 100).unwrap();
        // Light foliage fringe on the lowest rows.
        for y in 95..100 {
            for x in 5..55 {
                r.put_pixel(x, y, Rgba8::new(200, 230, 180, 255));
            }
        }
        // Dark trunk band a little higher.
        for y in 85..92 {
            for x in 27..33 {
                r.put_pixel(x, y, Rgba8::new(60, 40, 25, 255));
            }
        }
        let a = detect_anchor(&r);
        // Anchor row is the lowest trunk row (91), not the foliage bottom.
        assert_eq!(a.y_padding, 100.0 - 91.0 - 1.0);
        assert_eq!(a.content_width, 6.0);
        assert_eq!(a.x_offset, (27.0 + 32.0) / 2.0 - 30.0);
    }

    #[test]
    fn antialiased_edges_are_ignored() {
        // Only low-alpha pixels in the scan band: treated as no content.
        let r = raster_with_rect(40, 40, 30..=39, 0..=39, Rgba8::new(0, 0, 0, 128));
        assert_eq!(detect_anchor(&r), ContentAnchor::default());
    }

    #[test]
    fn scan_is_limited_to_the_bottom_rows() {
        // Solid content only in the top half; outside the bottom 30%.
        let r = raster_with_rect(50, 100, 10..=20, 10..=40, Rgba8::new(10, 10, 10, 255));
        assert_eq!(detect_anchor(&r), ContentAnchor::default());
    }
}
