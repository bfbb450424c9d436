pub mod image_helper {
    use crate::core_modules::pixel_buffer::pixel_buffer::PixelBuffer;
    use crate::error::{Result, VisionError};
    use image::ImageEncoder;
    use std::path::Path;

    /// Decodes any format the `image` crate understands into an RGBA buffer.
    pub fn load(path: impl AsRef<Path>) -> Result<PixelBuffer> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| VisionError::Image(format!("{}: {e}", path.display())))?;
        PixelBuffer::from_rgba_image(image.into_rgba8())
    }

    /// Writes a buffer as an RGBA PNG.
    pub fn save(path: impl AsRef<Path>, buffer: &PixelBuffer) -> Result<()> {
        let path = path.as_ref();
        let to_image_error = |e: image::ImageError| VisionError::Image(format!("{}: {e}", path.display()));

        let output = std::fs::File::create(path).map_err(|e| to_image_error(e.into()))?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        encoder
            .write_image(
                buffer.data(),
                buffer.width(),
                buffer.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(to_image_error)?;

        Ok(())
    }
}
