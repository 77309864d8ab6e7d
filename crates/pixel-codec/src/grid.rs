//! Pixel and grid types, plus the raster boundary trait.
//!
//! [`Grid`] stores pixels row-major in one buffer. Row 0 is the decoy row;
//! the data area starts at row 1.

use rand::Rng;

/// One RGB sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// All three channels set to `v`.
    #[inline]
    pub const fn splat(v: u8) -> Self {
        Self([v, v, v])
    }

    /// Each channel uniform in `0..=max`.
    pub fn random_up_to<R: Rng + ?Sized>(rng: &mut R, max: u8) -> Self {
        Self([
            rng.gen_range(0..=max),
            rng.gen_range(0..=max),
            rng.gen_range(0..=max),
        ])
    }

    #[inline]
    pub fn channels(&self) -> [u8; 3] {
        self.0
    }

    /// Channels widened to `i64` for modular arithmetic.
    #[inline]
    pub(crate) fn to_i64(self) -> [i64; 3] {
        [self.0[0] as i64, self.0[1] as i64, self.0[2] as i64]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Self(c)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self([r, g, b])
    }
}

/// Minimal pixel access the pipeline needs from an image collaborator.
///
/// Coordinates are `(x, y)` with `x < width()` and `y < height()`.
pub trait RasterImage {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn get_pixel(&self, x: u32, y: u32) -> Rgb;
    fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgb);
}

/// A rectangular pixel grid whose first row is a decoy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pixels: Vec<Rgb>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Build a grid from row-major pixels.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != width * height`.
    pub fn from_pixels(pixels: Vec<Rgb>, width: usize, height: usize) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixel count ({}) must match {}x{}",
            pixels.len(),
            width,
            height
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    /// A grid filled with one value.
    pub fn filled(width: usize, height: usize, value: Rgb) -> Self {
        Self::from_pixels(vec![value; width * height], width, height)
    }

    /// Copy any raster image into a grid.
    pub fn from_raster<I: RasterImage + ?Sized>(image: &I) -> Self {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..image.height() {
            for x in 0..image.width() {
                pixels.push(image.get_pixel(x, y));
            }
        }
        Self::from_pixels(pixels, width, height)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total row count, decoy row included.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<Rgb> {
        self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// The decoy row (row 0). Empty if the grid has no rows.
    pub fn decoy_row(&self) -> &[Rgb] {
        let end = self.width.min(self.pixels.len());
        &self.pixels[..end]
    }

    /// Everything after the decoy row, row-major.
    pub fn data(&self) -> &[Rgb] {
        let start = self.width.min(self.pixels.len());
        &self.pixels[start..]
    }

    /// Split into the decoy row and the mutable data area.
    pub(crate) fn split_decoy_mut(&mut self) -> (&[Rgb], &mut [Rgb]) {
        let start = self.width.min(self.pixels.len());
        let (decoy, data) = self.pixels.split_at_mut(start);
        (&*decoy, data)
    }

    /// Flat RGB bytes, `[r, g, b, r, g, b, ...]`.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.0).collect()
    }
}

impl RasterImage for Grid {
    fn width(&self) -> u32 {
        self.width as u32
    }

    fn height(&self) -> u32 {
        self.height as u32
    }

    fn get_pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels[y as usize * self.width + x as usize]
    }

    fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgb) {
        self.pixels[y as usize * self.width + x as usize] = pixel;
    }
}
