// THEORY:
// Overlays are one-pixel rectangular strokes painted straight into a buffer. The
// cluster engine uses `draw_outline` for its bounding boxes; `draw_border` frames
// an extracted character one pixel outside its box, and `draw_marker` stamps a
// 7x7 square around a point of interest.
//
// A stroke is validated as a whole before anything is written: if any of its
// pixels would fall outside the buffer the call fails with `OutOfBounds` and the
// buffer is left untouched.

use crate::core_modules::boundary_extractor::CharacterBoundary;
use crate::core_modules::cluster::Point;
use crate::core_modules::pixel_buffer::pixel_buffer::{Color, PixelBuffer};
use crate::error::Result;

/// Half the side length of a point marker, excluding the center pixel.
pub const MARKER_RADIUS: i64 = 3;

/// Strokes the closed rectangle with corners (min_x, min_y) and (max_x, max_y).
fn stroke_rect(
    buffer: &mut PixelBuffer,
    (min_x, min_y): (i64, i64),
    (max_x, max_y): (i64, i64),
    color: Color,
) -> Result<()> {
    for (x, y) in [(min_x, min_y), (max_x, max_y)] {
        if !buffer.contains(x, y) {
            return Err(buffer.out_of_bounds(x, y));
        }
    }

    // Both corners are in bounds, so every coordinate below fits in u32.
    let (min_x, min_y, max_x, max_y) = (min_x as u32, min_y as u32, max_x as u32, max_y as u32);
    for x in min_x..=max_x {
        buffer.set_pixel(x, min_y, &color)?;
        buffer.set_pixel(x, max_y, &color)?;
    }
    for y in min_y..=max_y {
        buffer.set_pixel(min_x, y, &color)?;
        buffer.set_pixel(max_x, y, &color)?;
    }
    Ok(())
}

/// Outlines the box itself: the four edges pass through both corners.
pub fn draw_outline(
    buffer: &mut PixelBuffer,
    top_left: Point,
    bottom_right: Point,
    color: Color,
) -> Result<()> {
    stroke_rect(
        buffer,
        (top_left.x as i64, top_left.y as i64),
        (bottom_right.x as i64, bottom_right.y as i64),
        color,
    )
}

/// Frames a character one pixel outside its bounding box.
pub fn draw_border(
    buffer: &mut PixelBuffer,
    boundary: &CharacterBoundary,
    color: Color,
) -> Result<()> {
    stroke_rect(
        buffer,
        (boundary.top_left.x as i64 - 1, boundary.top_left.y as i64 - 1),
        (boundary.bottom_right.x as i64 + 1, boundary.bottom_right.y as i64 + 1),
        color,
    )
}

/// Stamps a square outline centered on `center`.
pub fn draw_marker(buffer: &mut PixelBuffer, center: Point, color: Color) -> Result<()> {
    let (x, y) = (center.x as i64, center.y as i64);
    stroke_rect(
        buffer,
        (x - MARKER_RADIUS, y - MARKER_RADIUS),
        (x + MARKER_RADIUS, y + MARKER_RADIUS),
        color,
    )
}
