// THEORY:
// The `PixelBuffer` is the one mutable resource in the engine. It owns a flat,
// row-major RGBA byte array together with its width and height, and it is the
// only place that knows how a coordinate maps to a byte offset.
//
// Key principles:
// 1) Strict bounds: every access is checked against the buffer extent. A bad
//    coordinate is a contract violation reported as `OutOfBounds`, never clamped
//    to the nearest edge.
// 2) Clamped storage: colors are modelled as plain integers, and the storage
//    layer saturates them into 0..=255 when they are written.
// 3) Partial writes: a color slice shorter than four channels updates only the
//    leading channels, so an RGB write leaves alpha untouched.
// 4) Shape transforms: a buffer can be unfolded into a 2D grid of colors and
//    folded back without loss.

pub mod pixel_buffer {
    use crate::error::{Result, VisionError};
    use image::RgbaImage;

    pub type Byte = u8;
    pub type Bytes = Vec<Byte>;
    pub type ChannelValue = i32;
    /// Four integer channels in fixed (R, G, B, A) order.
    pub type Color = [ChannelValue; CHANNELS];
    /// Row-major grid of colors, `grid[y][x]`.
    pub type Grid = Vec<Vec<Color>>;

    pub const CHANNELS: usize = 4;

    /// A row-major RGBA raster that owns its bytes.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PixelBuffer {
        width: u32,
        height: u32,
        data: Bytes,
    }

    impl PixelBuffer {
        /// Wraps an existing byte array. The array must hold exactly
        /// `width * height * 4` bytes and both dimensions must be non-zero.
        pub fn new(width: u32, height: u32, data: Bytes) -> Result<Self> {
            let expected = byte_len(width, height)?;
            if data.len() != expected {
                return Err(VisionError::InvalidArgument(format!(
                    "buffer holds {} bytes, expected {} for {}x{}",
                    data.len(),
                    expected,
                    width,
                    height
                )));
            }
            Ok(Self {
                width,
                height,
                data,
            })
        }

        /// Creates a buffer where every pixel is `color`.
        pub fn filled(width: u32, height: u32, color: Color) -> Result<Self> {
            let len = byte_len(width, height)?;
            let pixel = color.map(clamp_channel);
            let data = pixel.iter().copied().cycle().take(len).collect();
            Ok(Self {
                width,
                height,
                data,
            })
        }

        pub fn from_grid(grid: &[Vec<Color>]) -> Result<Self> {
            let (width, height) = grid_dimensions(grid)?;
            let data = grid_to_buffer(grid)?;
            Self::new(width, height, data)
        }

        pub fn to_grid(&self) -> Grid {
            self.data
                .chunks_exact(CHANNELS * self.width as usize)
                .map(|row| row.chunks_exact(CHANNELS).map(color_from_bytes).collect())
                .collect()
        }

        pub fn from_rgba_image(image: RgbaImage) -> Result<Self> {
            let (width, height) = image.dimensions();
            Self::new(width, height, image.into_raw())
        }

        pub fn into_rgba_image(self) -> Result<RgbaImage> {
            let (width, height) = (self.width, self.height);
            RgbaImage::from_raw(width, height, self.data).ok_or_else(|| {
                VisionError::InvalidArgument(format!(
                    "buffer does not fit a {width}x{height} RGBA image"
                ))
            })
        }

        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        pub fn pixel_count(&self) -> usize {
            self.width as usize * self.height as usize
        }

        pub fn data(&self) -> &[Byte] {
            &self.data
        }

        pub fn into_data(self) -> Bytes {
            self.data
        }

        /// Whether a signed coordinate lies inside the buffer.
        pub fn contains(&self, x: i64, y: i64) -> bool {
            x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
        }

        /// Dense index of an in-bounds coordinate, `y * width + x`.
        pub fn index_of(&self, x: u32, y: u32) -> usize {
            y as usize * self.width as usize + x as usize
        }

        pub fn out_of_bounds(&self, x: i64, y: i64) -> VisionError {
            VisionError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            }
        }

        fn offset(&self, x: u32, y: u32) -> Result<usize> {
            if x >= self.width || y >= self.height {
                return Err(self.out_of_bounds(x as i64, y as i64));
            }
            Ok(self.index_of(x, y) * CHANNELS)
        }

        pub fn get_pixel(&self, x: u32, y: u32) -> Result<Color> {
            let offset = self.offset(x, y)?;
            Ok(color_from_bytes(&self.data[offset..offset + CHANNELS]))
        }

        /// Writes the leading `color.len()` channels of the pixel at (x, y).
        pub fn set_pixel(&mut self, x: u32, y: u32, color: &[ChannelValue]) -> Result<()> {
            if color.len() > CHANNELS {
                return Err(VisionError::InvalidArgument(format!(
                    "a pixel has {} channels, got {}",
                    CHANNELS,
                    color.len()
                )));
            }
            let offset = self.offset(x, y)?;
            for (slot, &value) in self.data[offset..offset + color.len()]
                .iter_mut()
                .zip(color)
            {
                *slot = clamp_channel(value);
            }
            Ok(())
        }

        /// Replaces every pixel with `f(pixel)`. Each output depends only on the
        /// pixel's own previous value.
        pub fn map_pixels<F>(&mut self, mut f: F)
        where
            F: FnMut(Color) -> Color,
        {
            for pixel in self.data.chunks_exact_mut(CHANNELS) {
                let mapped = f(color_from_bytes(pixel));
                for (slot, value) in pixel.iter_mut().zip(mapped) {
                    *slot = clamp_channel(value);
                }
            }
        }

        /// Iterates `(x, y, color)` in scan order: rows top to bottom, columns left
        /// to right.
        pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Color)> + '_ {
            let width = self.width;
            self.data
                .chunks_exact(CHANNELS)
                .enumerate()
                .map(move |(i, bytes)| {
                    let x = (i % width as usize) as u32;
                    let y = (i / width as usize) as u32;
                    (x, y, color_from_bytes(bytes))
                })
        }
    }

    /// Unfolds a flat RGBA byte array into a row-major grid of colors.
    pub fn buffer_to_grid(data: &[Byte], width: u32, height: u32) -> Result<Grid> {
        let buffer = PixelBuffer::new(width, height, data.to_vec())?;
        Ok(buffer.to_grid())
    }

    /// Folds a rectangular, non-empty grid back into a flat RGBA byte array.
    /// Channel values are clamped into 0..=255.
    pub fn grid_to_buffer(grid: &[Vec<Color>]) -> Result<Bytes> {
        let (width, height) = grid_dimensions(grid)?;
        let mut data = Vec::with_capacity(byte_len(width, height)?);
        for row in grid {
            for color in row {
                data.extend(color.iter().map(|&value| clamp_channel(value)));
            }
        }
        Ok(data)
    }

    fn grid_dimensions(grid: &[Vec<Color>]) -> Result<(u32, u32)> {
        let first = grid
            .first()
            .ok_or_else(|| VisionError::InvalidArgument("grid has no rows".to_string()))?;
        if first.is_empty() {
            return Err(VisionError::InvalidArgument("grid has no columns".to_string()));
        }
        if let Some((y, row)) = grid.iter().enumerate().find(|(_, row)| row.len() != first.len()) {
            return Err(VisionError::InvalidArgument(format!(
                "grid is not rectangular: row {} has {} columns, expected {}",
                y,
                row.len(),
                first.len()
            )));
        }
        let width = u32::try_from(first.len())
            .map_err(|_| VisionError::InvalidArgument("grid is too wide".to_string()))?;
        let height = u32::try_from(grid.len())
            .map_err(|_| VisionError::InvalidArgument("grid is too tall".to_string()))?;
        Ok((width, height))
    }

    fn byte_len(width: u32, height: u32) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(VisionError::InvalidArgument(format!(
                "buffer dimensions must be non-zero, got {width}x{height}"
            )));
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(CHANNELS))
            .ok_or_else(|| {
                VisionError::InvalidArgument(format!("{width}x{height} buffer overflows"))
            })
    }

    fn color_from_bytes(bytes: &[Byte]) -> Color {
        [
            bytes[0] as ChannelValue,
            bytes[1] as ChannelValue,
            bytes[2] as ChannelValue,
            bytes[3] as ChannelValue,
        ]
    }

    fn clamp_channel(value: ChannelValue) -> Byte {
        value.clamp(0, 255) as Byte
    }
}
