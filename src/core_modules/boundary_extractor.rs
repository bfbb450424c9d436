// THEORY:
// The boundary extractor measures a dark character on a light background,
// typically right after binarization. One full scan finds every ink pixel (red
// channel equal to the ink value) and keeps a running min/max of x and y. A second
// pass over just that rectangle materializes a binary occupancy grid.
//
// A buffer without any ink has no boundary. That case is returned as `None`
// rather than as an inverted box with min > max.

use crate::core_modules::cluster::Point;
use crate::core_modules::palette::palette::INK_VALUE;
use crate::core_modules::pixel_buffer::pixel_buffer::{CHANNELS, Color, PixelBuffer};
use serde::{Deserialize, Serialize};

pub type Occupancy = u8;

/// The tight bounding box of all ink pixels and the ink mask inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterBoundary {
    pub top_left: Point,
    pub bottom_right: Point,
    /// Row-major, `grid[y - top_left.y][x - top_left.x]`; 1 = ink, 0 = background.
    pub grid: Vec<Vec<Occupancy>>,
}

impl CharacterBoundary {
    pub fn width(&self) -> u32 {
        self.bottom_right.x - self.top_left.x + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom_right.y - self.top_left.y + 1
    }

    pub fn ink_count(&self) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|&&cell| cell == 1)
            .count()
    }
}

pub fn is_ink(color: &Color) -> bool {
    color[0] == INK_VALUE
}

pub fn extract_boundary(buffer: &PixelBuffer) -> Option<CharacterBoundary> {
    // --- 1. Bounding box ---
    let mut bounds: Option<(Point, Point)> = None;
    for (x, y, color) in buffer.pixels() {
        if !is_ink(&color) {
            continue;
        }
        bounds = Some(match bounds {
            Some((min, max)) => (
                Point::new(min.x.min(x), min.y.min(y)),
                Point::new(max.x.max(x), max.y.max(y)),
            ),
            None => (Point::new(x, y), Point::new(x, y)),
        });
    }
    let (top_left, bottom_right) = bounds?;

    // --- 2. Occupancy grid ---
    let grid = (top_left.y..=bottom_right.y)
        .map(|y| {
            (top_left.x..=bottom_right.x)
                .map(|x| {
                    let red = buffer.data()[buffer.index_of(x, y) * CHANNELS];
                    Occupancy::from(red as i32 == INK_VALUE)
                })
                .collect()
        })
        .collect();

    Some(CharacterBoundary {
        top_left,
        bottom_right,
        grid,
    })
}
