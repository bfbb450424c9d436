// THEORY:
// Binarization reduces a buffer to two levels so that character-like shapes can
// be measured. Each pixel's average of R, G and B is compared with a byte
// threshold derived from a percentage: at or below the threshold it becomes ink,
// above it becomes paper. The map is point-wise, so the in-place traversal order
// is irrelevant, and applying it twice gives the same buffer as applying it once.

pub mod binarizer {
    use crate::core_modules::palette::palette::Marker;
    use crate::core_modules::pixel_buffer::pixel_buffer::PixelBuffer;
    use crate::error::{Result, VisionError};

    pub type Percentage = f64;
    pub type ByteThreshold = f64;

    /// Maps a 0..=100 percentage onto the 0..=255 channel scale.
    pub fn byte_threshold(percentage: Percentage) -> Result<ByteThreshold> {
        if !(0.0..=100.0).contains(&percentage) {
            return Err(VisionError::InvalidArgument(format!(
                "threshold must be within 0..=100 percent, got {percentage}"
            )));
        }
        Ok(percentage * 255.0 / 100.0)
    }

    /// Rewrites every pixel as solid ink or solid paper.
    pub fn threshold(buffer: &mut PixelBuffer, percentage: Percentage) -> Result<()> {
        let limit = byte_threshold(percentage)?;
        buffer.map_pixels(|[r, g, b, _]| {
            let average = (r + g + b) as f64 / 3.0;
            if average <= limit {
                Marker::Ink.color()
            } else {
                Marker::Paper.color()
            }
        });
        Ok(())
    }
}
