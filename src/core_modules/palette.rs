// THEORY:
// The `palette` module names every reserved RGBA value the engine writes into a
// buffer. Annotation is the engine's visual output channel: a pixel painted with
// one of these markers tells a viewer which stage of the analysis touched it.
//
// Markers never carry meaning for the algorithms themselves, with one exception:
// the red channel of `Ink` (`INK_VALUE`) is how the boundary extractor recognizes
// a character pixel after binarization.

pub mod palette {
    use crate::core_modules::pixel_buffer::pixel_buffer::Color;

    /// Red channel value that identifies an ink pixel.
    pub const INK_VALUE: i32 = 0;

    pub const BLACK: Color = [0, 0, 0, 255];
    pub const WHITE: Color = [255, 255, 255, 255];
    pub const RED: Color = [255, 0, 0, 255];
    pub const GREEN: Color = [0, 255, 0, 255];

    /// The semantic role of a painted pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Marker {
        /// Dark side of a binarized buffer.
        Ink,
        /// Light side of a binarized buffer.
        Paper,
        /// A pixel the classifier rejected.
        Background,
        /// A rejected pixel that a flood fill inspected as a neighbor.
        ExploredNegative,
        /// The bounding-box stroke around a retained cluster.
        ClusterOutline,
        /// The stroke drawn around an extracted character boundary.
        Border,
    }

    impl Marker {
        pub const fn color(self) -> Color {
            match self {
                Marker::Ink => BLACK,
                Marker::Paper => WHITE,
                Marker::Background => BLACK,
                Marker::ExploredNegative => GREEN,
                Marker::ClusterOutline => RED,
                Marker::Border => RED,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::palette::*;

    #[test]
    fn ink_marker_carries_the_ink_value() {
        assert_eq!(Marker::Ink.color()[0], INK_VALUE);
        assert_ne!(Marker::Paper.color()[0], INK_VALUE);
    }

    #[test]
    fn annotation_markers_are_opaque() {
        for marker in [
            Marker::Background,
            Marker::ExploredNegative,
            Marker::ClusterOutline,
            Marker::Border,
        ] {
            assert_eq!(marker.color()[3], 255);
        }
    }
}
