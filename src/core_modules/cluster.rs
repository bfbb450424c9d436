// THEORY:
// A `Cluster` is the output unit of region extraction: one 8-connected group of
// classifier-positive pixels found in a single buffer. Like the other result
// types it is a plain data container. It carries no identifier, its member list
// is kept in discovery order (which says nothing about spatial layout), and its
// corners are the axis-aligned bounding box of the members.

use serde::{Deserialize, Serialize};

/// A pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A connected region of classified pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Member coordinates in the order the flood fill reached them.
    pub members: Vec<Point>,
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn width(&self) -> u32 {
        self.bottom_right.x - self.top_left.x + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom_right.y - self.top_left.y + 1
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.top_left.x..=self.bottom_right.x).contains(&point.x)
            && (self.top_left.y..=self.bottom_right.y).contains(&point.y)
    }
}

/// Accumulates members and a running bounding box while a fill is in progress.
#[derive(Debug, Default)]
pub(crate) struct ClusterBuilder {
    members: Vec<Point>,
    min: Option<Point>,
    max: Option<Point>,
}

impl ClusterBuilder {
    pub(crate) fn push(&mut self, point: Point) {
        self.min = Some(match self.min {
            Some(min) => Point::new(min.x.min(point.x), min.y.min(point.y)),
            None => point,
        });
        self.max = Some(match self.max {
            Some(max) => Point::new(max.x.max(point.x), max.y.max(point.y)),
            None => point,
        });
        self.members.push(point);
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `None` for a fill that never accepted a pixel.
    pub(crate) fn build(self) -> Option<Cluster> {
        Some(Cluster {
            top_left: self.min?,
            bottom_right: self.max?,
            members: self.members,
        })
    }
}
