//! Grid assembly: near-square layout behind a random decoy row.

use rand::Rng;

use crate::alphabet::NULL_CODE;
use crate::grid::{Grid, Rgb};

/// Data-area dimensions for `count` pixels: `(width, rows)`.
///
/// Width is `floor(sqrt(count))`, never less than 1.
pub fn dimensions_for(count: usize) -> (usize, usize) {
    let width = integer_sqrt(count).max(1);
    let rows = count.div_ceil(width).max(1);
    (width, rows)
}

fn integer_sqrt(n: usize) -> usize {
    // Float estimate, then correct for rounding at large n.
    let mut r = (n as f64).sqrt() as usize;
    while r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    r
}

/// Lay `pixels` out row-major under one random decoy row.
///
/// The final data row is filled out with [`NULL_CODE`] pixels.
pub fn assemble<R: Rng + ?Sized>(pixels: &[Rgb], rng: &mut R) -> Grid {
    let (width, rows) = dimensions_for(pixels.len());

    let mut out = Vec::with_capacity(width * (rows + 1));
    out.extend((0..width).map(|_| Rgb(rng.gen())));
    out.extend_from_slice(pixels);
    out.resize(width * (rows + 1), Rgb::splat(NULL_CODE));

    tracing::debug!(width, height = rows + 1, "Assembled grid");
    Grid::from_pixels(out, width, rows + 1)
}

/// Drop the decoy row and flatten the rest.
///
/// Trailing padding pixels are kept; they decode to [`NULL_CODE`].
pub fn disassemble(grid: &Grid) -> Vec<Rgb> {
    grid.data().to_vec()
}
