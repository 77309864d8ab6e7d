//! Cascade transform: a chained additive shift across the data rows.
//!
//! A three-pixel window is seeded from the decoy row around a picked index.
//! Each data pixel is shifted by `(det(window) mod 4) * 64` on every channel,
//! then the window slides forward onto the pixel just produced. One seed
//! position therefore perturbs the whole data area.
//!
//! The inverse replays the same window trajectory: it slides onto the
//! transformed value it just undid, not the recovered original.

use crate::error::CodecError;
use crate::grid::{Grid, Rgb};
use crate::matrix::Matrix3;

#[derive(Debug, Clone, Copy)]
struct Window {
    left: Rgb,
    center: Rgb,
    right: Rgb,
}

impl Window {
    fn seed(decoy: &[Rgb], picked: usize) -> Result<Self, CodecError> {
        let width = decoy.len();
        if picked >= width {
            return Err(CodecError::DataDesynchronized(format!(
                "cascade index {picked} outside decoy row of width {width}"
            )));
        }
        Ok(Self {
            left: decoy[(picked + width - 1) % width],
            center: decoy[picked],
            right: decoy[(picked + 1) % width],
        })
    }

    /// Per-channel shift for the current window: 0, 64, 128 or 192.
    fn modification(&self) -> u8 {
        let det = Matrix3::from_pixels([self.left, self.center, self.right]).determinant();
        (det.rem_euclid(4) * 64) as u8
    }

    fn advance(&mut self, produced: Rgb) {
        self.left = self.center;
        self.center = self.right;
        self.right = produced;
    }
}

fn shift(pixel: Rgb, by: u8) -> Rgb {
    Rgb(pixel.0.map(|c| c.wrapping_add(by)))
}

fn unshift(pixel: Rgb, by: u8) -> Rgb {
    Rgb(pixel.0.map(|c| c.wrapping_sub(by)))
}

/// Apply the cascade seeded at `picked` in the decoy row.
///
/// The decoy row is read but never written.
pub fn apply(grid: &mut Grid, picked: usize) -> Result<(), CodecError> {
    let (decoy, data) = grid.split_decoy_mut();
    let mut window = Window::seed(decoy, picked)?;

    for pixel in data.iter_mut() {
        let produced = shift(*pixel, window.modification());
        *pixel = produced;
        window.advance(produced);
    }
    Ok(())
}

/// Undo [`apply`] with the same `picked` index.
pub fn invert(grid: &mut Grid, picked: usize) -> Result<(), CodecError> {
    let (decoy, data) = grid.split_decoy_mut();
    let mut window = Window::seed(decoy, picked)?;

    for pixel in data.iter_mut() {
        let produced = *pixel;
        *pixel = unshift(produced, window.modification());
        window.advance(produced);
    }
    Ok(())
}
