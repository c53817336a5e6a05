use crate::grid::GridPosition;

/// Stable back-to-front compositing order: ascending `grid_x + grid_y`,
/// ties keeping their input order.
///
/// A single global key is sufficient for correct occlusion here because a
/// tile's isometric footprint only interacts with its diagonal neighbors,
/// and those always differ in this sum.
pub fn paint_order(positions: &[GridPosition]) -> Vec<GridPosition> {
    let mut ordered = positions.to_vec();
    ordered.sort_by_key(|p| u64::from(p.grid_x) + u64::from(p.grid_y));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(grid_x: u32, grid_y: u32, tag: i32) -> GridPosition {
        GridPosition {
            grid_x,
            grid_y,
            pixel_x: tag,
            pixel_y: 0,
        }
    }

    #[test]
    fn output_is_non_decreasing_in_diagonal_sum() {
        let input = vec![pos(2, 2, 0), pos(0, 0, 1), pos(2, 0, 2), pos(0, 1, 3)];
        let ordered = paint_order(&input);
        let sums: Vec<u32> = ordered.iter().map(|p| p.grid_x + p.grid_y).collect();
        assert!(sums.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn ties_preserve_input_order() {
        // Three positions on the same diagonal, tagged via pixel_x.
        let input = vec![pos(0, 2, 10), pos(2, 0, 20), pos(1, 1, 30), pos(0, 0, 40)];
        let ordered = paint_order(&input);
        assert_eq!(ordered[0].pixel_x, 40);
        let diagonal_tags: Vec<i32> = ordered[1..].iter().map(|p| p.pixel_x).collect();
        assert_eq!(diagonal_tags, vec![10, 20, 30]);
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(paint_order(&[]).is_empty());
    }
}
