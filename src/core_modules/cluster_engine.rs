// THEORY:
// The `ClusterEngine` is the region-extraction layer. It partitions every
// classifier-positive pixel of a buffer into 8-connected groups, reports each
// group as a `Cluster` with its bounding box, and annotates the buffer so the
// result can be inspected visually.
//
// Algorithm steps:
// 1.  **Classification**: One scan turns the buffer into a dense boolean mask.
//     This phase is pure; nothing is painted while pixels are still being read.
// 2.  **Flood Fill**: Every positive cell, in scan order, is a candidate seed.
//     From each unvisited seed an iterative fill runs on an explicit LIFO stack.
//     A popped cell is marked visited and joins the cluster. Its in-bounds
//     neighbors are then inspected in the fixed order up, up-right, right,
//     down-right, down, down-left, left, up-left. Positive neighbors are pushed
//     even when already visited; negative neighbors are recorded as "explored".
// 3.  **Revisit Policy**: Popping a cell that is already visited either halts the
//     whole fill (`Halt`, the historical behavior, which can truncate a region
//     depending on traversal order) or just skips that cell (`Skip`, a classic
//     exhaustive flood fill).
// 4.  **Retention**: A finished fill becomes a cluster only if it has strictly
//     more members than the minimum cluster size.
// 5.  **Rendering**: A separate pass paints rejected pixels as background,
//     explored rejected pixels as a halo, and each retained cluster's bounding
//     box as an outline.
//
// Worst case is O(W*H) classifications plus O(W*H) fill visits, with up to eight
// duplicate pushes per pixel.

use crate::core_modules::cluster::{Cluster, ClusterBuilder, Point};
use crate::core_modules::overlay::draw_outline;
use crate::core_modules::palette::palette::Marker;
use crate::core_modules::pixel_buffer::pixel_buffer::PixelBuffer;
use crate::core_modules::skin_classifier::PixelClassifier;
use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};

pub mod cluster_engine {
    use super::*;

    /// Fills with this many members or fewer are discarded.
    pub const MIN_PIXELS_PER_CLUSTER: usize = 25;

    /// Neighbor offsets in the order they are inspected.
    const NEIGHBORS: [(i64, i64); 8] = [
        (0, -1),  // up
        (1, -1),  // up-right
        (1, 0),   // right
        (1, 1),   // down-right
        (0, 1),   // down
        (-1, 1),  // down-left
        (-1, 0),  // left
        (-1, -1), // up-left
    ];

    /// What a fill does when it pops a cell that has already been visited.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RevisitPolicy {
        /// Stop the current fill immediately and leave the rest of its stack.
        #[default]
        Halt,
        /// Ignore the cell and keep draining the stack.
        Skip,
    }

    /// Tunables for a clustering pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ClusterSettings {
        pub min_cluster_size: usize,
        pub revisit_policy: RevisitPolicy,
    }

    impl Default for ClusterSettings {
        fn default() -> Self {
            Self {
                min_cluster_size: MIN_PIXELS_PER_CLUSTER,
                revisit_policy: RevisitPolicy::default(),
            }
        }
    }

    /// Per-pixel classifier output for one buffer, indexed by `y * width + x`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ClassificationMask {
        width: u32,
        height: u32,
        cells: Vec<bool>,
    }

    impl ClassificationMask {
        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        pub fn cells(&self) -> &[bool] {
            &self.cells
        }

        pub fn is_positive(&self, x: u32, y: u32) -> bool {
            x < self.width && y < self.height && self.cells[self.index(x, y)]
        }

        pub fn positive_count(&self) -> usize {
            self.cells.iter().filter(|&&cell| cell).count()
        }

        /// Positive cells in scan order.
        pub fn seeds(&self) -> impl Iterator<Item = Point> + '_ {
            let width = self.width as usize;
            self.cells
                .iter()
                .enumerate()
                .filter(|(_, positive)| **positive)
                .map(move |(i, _)| Point::new((i % width) as u32, (i / width) as u32))
        }

        fn index(&self, x: u32, y: u32) -> usize {
            y as usize * self.width as usize + x as usize
        }
    }

    /// Everything one clustering pass learned about a buffer.
    #[derive(Debug, Clone)]
    pub struct ClusterScan {
        pub mask: ClassificationMask,
        /// Negative cells that some fill inspected as a neighbor.
        pub explored: Vec<bool>,
        /// Retained clusters in the order their seeds were reached.
        pub clusters: Vec<Cluster>,
        /// Fills that ended at or below the minimum size.
        pub discarded: usize,
    }

    pub fn classify<C>(buffer: &PixelBuffer, classifier: &C) -> ClassificationMask
    where
        C: PixelClassifier + ?Sized,
    {
        let cells = buffer
            .pixels()
            .map(|(_, _, color)| classifier.classify(&color))
            .collect();
        ClassificationMask {
            width: buffer.width(),
            height: buffer.height(),
            cells,
        }
    }

    /// Runs classification and flood fill without touching the buffer.
    pub fn find_clusters<C>(
        buffer: &PixelBuffer,
        classifier: &C,
        settings: &ClusterSettings,
    ) -> ClusterScan
    where
        C: PixelClassifier + ?Sized,
    {
        let mask = classify(buffer, classifier);
        let mut visited = vec![false; mask.cells.len()];
        let mut explored = vec![false; mask.cells.len()];
        let mut clusters = Vec::new();
        let mut discarded = 0;

        let seeds: Vec<Point> = mask.seeds().collect();
        for seed in seeds {
            if visited[mask.index(seed.x, seed.y)] {
                continue;
            }

            let builder = flood_fill(
                seed,
                &mask,
                &mut visited,
                &mut explored,
                settings.revisit_policy,
            );

            if builder.len() > settings.min_cluster_size {
                clusters.extend(builder.build());
            } else {
                discarded += 1;
            }
        }

        tracing::debug!(
            "clustered {} positive pixels into {} clusters ({} fills discarded)",
            mask.positive_count(),
            clusters.len(),
            discarded
        );

        ClusterScan {
            mask,
            explored,
            clusters,
            discarded,
        }
    }

    /// Grows one region from `seed` with an explicit stack.
    fn flood_fill(
        seed: Point,
        mask: &ClassificationMask,
        visited: &mut [bool],
        explored: &mut [bool],
        policy: RevisitPolicy,
    ) -> ClusterBuilder {
        let mut cluster = ClusterBuilder::default();
        let mut stack = vec![seed];
        let (width, height) = (mask.width as i64, mask.height as i64);

        while let Some(current) = stack.pop() {
            let index = mask.index(current.x, current.y);
            if visited[index] {
                match policy {
                    RevisitPolicy::Halt => break,
                    RevisitPolicy::Skip => continue,
                }
            }
            visited[index] = true;
            cluster.push(current);

            for (dx, dy) in NEIGHBORS {
                let nx = current.x as i64 + dx;
                let ny = current.y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= width || ny >= height {
                    continue;
                }

                let neighbor = Point::new(nx as u32, ny as u32);
                let neighbor_index = mask.index(neighbor.x, neighbor.y);
                if mask.cells[neighbor_index] {
                    stack.push(neighbor);
                } else {
                    explored[neighbor_index] = true;
                }
            }
        }

        cluster
    }

    /// Paints a scan's annotations into the buffer it was computed from.
    pub fn render(buffer: &mut PixelBuffer, scan: &ClusterScan) -> Result<()> {
        if buffer.width() != scan.mask.width || buffer.height() != scan.mask.height {
            return Err(VisionError::InvalidArgument(format!(
                "scan of a {}x{} buffer cannot be rendered onto {}x{}",
                scan.mask.width,
                scan.mask.height,
                buffer.width(),
                buffer.height()
            )));
        }

        let background = Marker::Background.color();
        let halo = Marker::ExploredNegative.color();
        let mut cells = scan.mask.cells.iter().zip(&scan.explored);
        buffer.map_pixels(|color| match cells.next() {
            Some((false, true)) => halo,
            Some((false, false)) => background,
            _ => color,
        });

        let outline = Marker::ClusterOutline.color();
        for cluster in &scan.clusters {
            draw_outline(buffer, cluster.top_left, cluster.bottom_right, outline)?;
        }
        Ok(())
    }

    /// Classifies, clusters and annotates a buffer in one call.
    pub fn detect<C>(
        buffer: &mut PixelBuffer,
        classifier: &C,
        settings: &ClusterSettings,
    ) -> Result<Vec<Cluster>>
    where
        C: PixelClassifier + ?Sized,
    {
        let scan = find_clusters(buffer, classifier, settings);
        render(buffer, &scan)?;
        Ok(scan.clusters)
    }
}

#[cfg(test)]
mod tests {
    use super::cluster_engine::*;
    use crate::core_modules::cluster::Point;
    use crate::core_modules::palette::palette::{BLACK, GREEN, RED};
    use crate::core_modules::pixel_buffer::pixel_buffer::{Color, PixelBuffer};
    use crate::core_modules::skin_classifier::SkinClassifier;

    const SKIN: Color = [200, 150, 120, 255];

    fn buffer_with_square(size: u32, top_left: (u32, u32), side: u32) -> PixelBuffer {
        let mut buffer = PixelBuffer::filled(size, size, BLACK).unwrap();
        for y in top_left.1..top_left.1 + side {
            for x in top_left.0..top_left.0 + side {
                buffer.set_pixel(x, y, &SKIN).unwrap();
            }
        }
        buffer
    }

    fn skip() -> ClusterSettings {
        ClusterSettings {
            revisit_policy: RevisitPolicy::Skip,
            ..ClusterSettings::default()
        }
    }

    #[test]
    fn defaults_match_the_historical_engine() {
        let settings = ClusterSettings::default();
        assert_eq!(settings.min_cluster_size, 25);
        assert_eq!(settings.revisit_policy, RevisitPolicy::Halt);
    }

    #[test]
    fn six_by_six_square_is_one_cluster() {
        let buffer = buffer_with_square(10, (4, 4), 6);
        let scan = find_clusters(&buffer, &SkinClassifier, &skip());

        assert_eq!(scan.clusters.len(), 1);
        let cluster = &scan.clusters[0];
        assert_eq!(cluster.size(), 36);
        assert_eq!(cluster.top_left, Point::new(4, 4));
        assert_eq!(cluster.bottom_right, Point::new(9, 9));
        assert_eq!(cluster.members[0], Point::new(4, 4));
    }

    #[test]
    fn small_patch_is_discarded() {
        let buffer = buffer_with_square(10, (3, 3), 4);
        let scan = find_clusters(&buffer, &SkinClassifier, &skip());
        assert!(scan.clusters.is_empty());
        assert_eq!(scan.discarded, 1);
    }

    #[test]
    fn size_threshold_is_exclusive() {
        // 5x5 = 25 members, which is not more than 25.
        let buffer = buffer_with_square(8, (0, 0), 5);
        assert!(find_clusters(&buffer, &SkinClassifier, &skip()).clusters.is_empty());

        let lenient = ClusterSettings {
            min_cluster_size: 24,
            ..skip()
        };
        assert_eq!(find_clusters(&buffer, &SkinClassifier, &lenient).clusters.len(), 1);
    }

    #[test]
    fn diagonal_neighbors_connect() {
        let mut buffer = PixelBuffer::filled(30, 30, BLACK).unwrap();
        for i in 0..30 {
            buffer.set_pixel(i, i, &SKIN).unwrap();
        }
        let scan = find_clusters(&buffer, &SkinClassifier, &skip());
        assert_eq!(scan.clusters.len(), 1);
        assert_eq!(scan.clusters[0].size(), 30);
        assert_eq!(scan.clusters[0].bottom_right, Point::new(29, 29));
    }

    #[test]
    fn separate_regions_become_separate_clusters() {
        let mut buffer = PixelBuffer::filled(20, 8, BLACK).unwrap();
        for y in 0..6 {
            for x in 0..6 {
                buffer.set_pixel(x, y, &SKIN).unwrap();
                buffer.set_pixel(x + 12, y + 2, &SKIN).unwrap();
            }
        }
        let scan = find_clusters(&buffer, &SkinClassifier, &skip());
        assert_eq!(scan.clusters.len(), 2);
        assert_eq!(scan.clusters[0].top_left, Point::new(0, 0));
        assert_eq!(scan.clusters[1].top_left, Point::new(12, 2));
        assert_eq!(scan.clusters[1].bottom_right, Point::new(17, 7));
    }

    #[test]
    fn halt_policy_keeps_a_vertical_line() {
        // Going down, the unvisited cell below is always pushed after the visited
        // cell above, so the fill reaches the end before it pops a revisit.
        let buffer = {
            let mut buffer = PixelBuffer::filled(1, 30, BLACK).unwrap();
            for y in 0..30 {
                buffer.set_pixel(0, y, &SKIN).unwrap();
            }
            buffer
        };
        let scan = find_clusters(&buffer, &SkinClassifier, &ClusterSettings::default());
        assert_eq!(scan.clusters.len(), 1);
        assert_eq!(scan.clusters[0].size(), 30);
    }

    #[test]
    fn halt_policy_fragments_a_horizontal_line() {
        // Going right, the visited cell on the left is pushed last and popped
        // next, which ends every fill after at most two pixels.
        let buffer = {
            let mut buffer = PixelBuffer::filled(30, 1, BLACK).unwrap();
            for x in 0..30 {
                buffer.set_pixel(x, 0, &SKIN).unwrap();
            }
            buffer
        };
        let halted = find_clusters(&buffer, &SkinClassifier, &ClusterSettings::default());
        assert!(halted.clusters.is_empty());
        assert_eq!(halted.discarded, 29);

        let skipped = find_clusters(&buffer, &SkinClassifier, &skip());
        assert_eq!(skipped.clusters.len(), 1);
        assert_eq!(skipped.clusters[0].size(), 30);
    }

    #[test]
    fn find_clusters_leaves_the_buffer_untouched() {
        let buffer = buffer_with_square(10, (4, 4), 6);
        let before = buffer.clone();
        let _ = find_clusters(&buffer, &SkinClassifier, &skip());
        assert_eq!(buffer, before);
    }

    #[test]
    fn detect_annotates_background_halo_and_outline() {
        let mut buffer = buffer_with_square(10, (4, 4), 6);
        let clusters = detect(&mut buffer, &SkinClassifier, &skip()).unwrap();
        assert_eq!(clusters.len(), 1);

        assert_eq!(buffer.get_pixel(0, 0).unwrap(), BLACK);
        assert_eq!(buffer.get_pixel(2, 2).unwrap(), BLACK);
        assert_eq!(buffer.get_pixel(3, 3).unwrap(), GREEN);
        assert_eq!(buffer.get_pixel(3, 9).unwrap(), GREEN);
        assert_eq!(buffer.get_pixel(4, 4).unwrap(), RED);
        assert_eq!(buffer.get_pixel(9, 6).unwrap(), RED);
        assert_eq!(buffer.get_pixel(6, 6).unwrap(), SKIN);
    }

    #[test]
    fn discarded_regions_still_leave_a_halo() {
        let mut buffer = buffer_with_square(10, (3, 3), 4);
        let clusters = detect(&mut buffer, &SkinClassifier, &skip()).unwrap();
        assert!(clusters.is_empty());
        assert_eq!(buffer.get_pixel(2, 2).unwrap(), GREEN);
        assert_eq!(buffer.get_pixel(4, 4).unwrap(), SKIN);
        assert!(buffer.pixels().all(|(_, _, color)| color != RED));
    }

    #[test]
    fn any_classifier_can_drive_the_engine() {
        let mut buffer = PixelBuffer::filled(8, 8, [0, 0, 0, 255]).unwrap();
        for y in 1..7 {
            for x in 1..7 {
                buffer.set_pixel(x, y, &[0, 0, 255, 255]).unwrap();
            }
        }
        let blue = |color: &Color| color[2] == 255;
        let scan = find_clusters(&buffer, &blue, &skip());
        assert_eq!(scan.mask.positive_count(), 36);
        assert_eq!(scan.clusters.len(), 1);
        assert!(scan.mask.is_positive(1, 1));
        assert!(!scan.mask.is_positive(0, 0));
        assert!(!scan.mask.is_positive(8, 0));
    }

    #[test]
    fn render_rejects_mismatched_buffers() {
        let buffer = buffer_with_square(10, (4, 4), 6);
        let scan = find_clusters(&buffer, &SkinClassifier, &skip());
        let mut other = PixelBuffer::filled(5, 5, BLACK).unwrap();
        assert!(render(&mut other, &scan).is_err());
    }
}
