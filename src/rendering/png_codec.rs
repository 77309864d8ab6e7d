//! PNG boundary for pixel grids.
//!
//! Encoding always writes 8-bit RGB. Decoding accepts whatever the `png`
//! crate reads and normalizes it to RGB, so an image that was re-saved by
//! another tool (palette reduction, added alpha) still decodes.

use std::io::Cursor;

use pixel_codec::{Grid, RasterImage, Rgb};

use crate::error::ImageError;

/// Encode a grid as an optimized 8-bit RGB PNG.
pub fn encode_png(grid: &Grid) -> Result<Vec<u8>, ImageError> {
    if grid.width() == 0 || grid.height() == 0 {
        return Err(ImageError::Empty);
    }
    let width = u32::try_from(grid.width())
        .map_err(|_| ImageError::PngEncode(format!("width {} out of range", grid.width())))?;
    let height = u32::try_from(grid.height())
        .map_err(|_| ImageError::PngEncode(format!("height {} out of range", grid.height())))?;

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        encoder.set_filter(png::FilterType::NoFilter);
        let mut writer = encoder
            .write_header()
            .map_err(|e| ImageError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(&grid.to_rgb_bytes())
            .map_err(|e| ImageError::PngEncode(e.to_string()))?;
    }
    let png_bytes = buf.into_inner();

    // Lossless re-compression; pixel values are untouched.
    let options = oxipng::Options {
        strip: oxipng::StripChunks::Safe,
        optimize_alpha: false,
        ..Default::default()
    };
    let optimized = oxipng::optimize_from_memory(&png_bytes, &options).unwrap_or(png_bytes);

    tracing::debug!(width, height, size_bytes = optimized.len(), "Encoded PNG");
    Ok(optimized)
}

/// Decode PNG bytes into an RGB grid.
///
/// Images with more than `max_pixels` pixels are rejected before the pixel
/// buffer is allocated.
pub fn decode_png(bytes: &[u8], max_pixels: u64) -> Result<Grid, ImageError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| ImageError::PngDecode(e.to_string()))?;

    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };
    if width == 0 || height == 0 {
        return Err(ImageError::Empty);
    }
    if u64::from(width) * u64::from(height) > max_pixels {
        return Err(ImageError::TooLarge {
            width,
            height,
            max: max_pixels,
        });
    }

    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader
        .next_frame(&mut buf)
        .map_err(|e| ImageError::PngDecode(e.to_string()))?;
    buf.truncate(frame.buffer_size());

    let frame = Frame::new(buf, frame.color_type, frame.line_size, width, height)?;
    Ok(Grid::from_raster(&frame))
}

/// An 8-bit frame buffer as the `png` crate hands it back, read as RGB.
struct Frame {
    buf: Vec<u8>,
    samples: usize,
    line_size: usize,
    width: u32,
    height: u32,
}

impl Frame {
    fn new(
        buf: Vec<u8>,
        color_type: png::ColorType,
        line_size: usize,
        width: u32,
        height: u32,
    ) -> Result<Self, ImageError> {
        let samples = match color_type {
            png::ColorType::Grayscale => 1,
            png::ColorType::GrayscaleAlpha => 2,
            png::ColorType::Rgb => 3,
            png::ColorType::Rgba => 4,
            png::ColorType::Indexed => {
                return Err(ImageError::PngDecode(
                    "palette was not expanded".to_string(),
                ))
            }
        };

        let row_bytes = width as usize * samples;
        let needed = (height as usize - 1) * line_size + row_bytes;
        if line_size < row_bytes || buf.len() < needed {
            return Err(ImageError::PngDecode("truncated image row".to_string()));
        }

        Ok(Self {
            buf,
            samples,
            line_size,
            width,
            height,
        })
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.line_size + x as usize * self.samples
    }
}

impl RasterImage for Frame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get_pixel(&self, x: u32, y: u32) -> Rgb {
        let px = &self.buf[self.offset(x, y)..][..self.samples];
        match self.samples {
            1 | 2 => Rgb::splat(px[0]),
            _ => Rgb::new(px[0], px[1], px[2]),
        }
    }

    /// Gray frames keep only the red sample.
    fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgb) {
        let offset = self.offset(x, y);
        let channels = self.samples.min(3);
        if channels == 3 {
            self.buf[offset..offset + 3].copy_from_slice(&pixel.0);
        } else {
            self.buf[offset] = pixel.0[0];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_grid() -> Grid {
        let pixels = (0..4 * 3)
            .map(|i| Rgb::new(i as u8, 255 - i as u8, (i * 20) as u8))
            .collect();
        Grid::from_pixels(pixels, 4, 3)
    }

    fn write_png(
        width: u32,
        height: u32,
        color: png::ColorType,
        depth: png::BitDepth,
        palette: Option<&[u8]>,
        data: &[u8],
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, width, height);
            encoder.set_color(color);
            encoder.set_depth(depth);
            if let Some(palette) = palette {
                encoder.set_palette(palette);
            }
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        buf
    }

    #[test]
    fn test_encode_produces_png_signature() {
        let bytes = encode_png(&sample_grid()).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_encode_decode_preserves_pixels() {
        let grid = sample_grid();
        let bytes = encode_png(&grid).unwrap();
        assert_eq!(decode_png(&bytes, 1_000).unwrap(), grid);
    }

    #[test]
    fn test_encode_empty_grid_rejected() {
        let grid = Grid::from_pixels(Vec::new(), 0, 0);
        assert!(matches!(encode_png(&grid), Err(ImageError::Empty)));
    }

    #[test]
    fn test_decode_rgba_drops_alpha() {
        let data = [10, 20, 30, 255, 40, 50, 60, 0];
        let bytes = write_png(2, 1, png::ColorType::Rgba, png::BitDepth::Eight, None, &data);
        let grid = decode_png(&bytes, 100).unwrap();
        assert_eq!(grid.pixels(), &[Rgb::new(10, 20, 30), Rgb::new(40, 50, 60)]);
    }

    #[test]
    fn test_decode_grayscale_splats() {
        let bytes = write_png(
            3,
            1,
            png::ColorType::Grayscale,
            png::BitDepth::Eight,
            None,
            &[0, 7, 200],
        );
        let grid = decode_png(&bytes, 100).unwrap();
        assert_eq!(
            grid.pixels(),
            &[Rgb::splat(0), Rgb::splat(7), Rgb::splat(200)]
        );
    }

    #[test]
    fn test_decode_palette_expands() {
        let palette = [1, 2, 3, 40, 41, 42];
        // 4-bit indices: 1, 0
        let bytes = write_png(
            2,
            1,
            png::ColorType::Indexed,
            png::BitDepth::Four,
            Some(&palette),
            &[0x10],
        );
        let grid = decode_png(&bytes, 100).unwrap();
        assert_eq!(grid.pixels(), &[Rgb::new(40, 41, 42), Rgb::new(1, 2, 3)]);
    }

    #[test]
    fn test_decode_sixteen_bit_strips() {
        let data = [0x12, 0x34, 0xAB, 0xCD, 0xFF, 0x00];
        let bytes = write_png(1, 1, png::ColorType::Rgb, png::BitDepth::Sixteen, None, &data);
        let grid = decode_png(&bytes, 100).unwrap();
        assert_eq!(grid.pixels(), &[Rgb::new(0x12, 0xAB, 0xFF)]);
    }

    #[test]
    fn test_decode_rejects_oversized() {
        let bytes = encode_png(&sample_grid()).unwrap();
        let err = decode_png(&bytes, 11).unwrap_err();
        assert!(matches!(
            err,
            ImageError::TooLarge {
                width: 4,
                height: 3,
                max: 11
            }
        ));
    }

    #[test]
    fn test_frame_reads_padded_lines() {
        // Two RGBA pixels per line, two spare bytes at the end of each line.
        let buf = vec![1, 2, 3, 9, 4, 5, 6, 9, 0, 0, 7, 8, 9, 9, 10, 11, 12, 9, 0, 0];
        let mut frame = Frame::new(buf, png::ColorType::Rgba, 10, 2, 2).unwrap();
        assert_eq!(frame.get_pixel(1, 1), Rgb::new(10, 11, 12));

        frame.set_pixel(0, 1, Rgb::new(70, 80, 90));
        let grid = Grid::from_raster(&frame);
        assert_eq!(
            grid.pixels(),
            &[
                Rgb::new(1, 2, 3),
                Rgb::new(4, 5, 6),
                Rgb::new(70, 80, 90),
                Rgb::new(10, 11, 12),
            ]
        );
    }

    #[test]
    fn test_frame_rejects_short_buffer() {
        let err = Frame::new(vec![0; 5], png::ColorType::Rgb, 6, 2, 1)
            .err()
            .unwrap();
        assert!(matches!(err, ImageError::PngDecode(_)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_png(b"definitely not a png", 100).unwrap_err();
        assert!(matches!(err, ImageError::PngDecode(_)));
    }
}
