//! Dummy pixel interleaving.
//!
//! Every genuine pixel is preceded by a fixed number of random decoys.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::alphabet::NULL_CODE;
use crate::grid::Rgb;

/// Default range the per-call multiplier is drawn from.
pub const DEFAULT_MULTIPLIER_RANGE: RangeInclusive<usize> = 2..=7;

/// Draw a multiplier uniformly from `range`.
pub fn choose_multiplier<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<usize>) -> usize {
    rng.gen_range(range)
}

/// Emit `multiplier` random pixels before each input pixel.
pub fn pad<R: Rng + ?Sized>(pixels: &[Rgb], multiplier: usize, rng: &mut R) -> Vec<Rgb> {
    let mut padded = Vec::with_capacity(pixels.len() * (multiplier + 1));
    for &pixel in pixels {
        for _ in 0..multiplier {
            padded.push(Rgb::random_up_to(rng, NULL_CODE));
        }
        padded.push(pixel);
    }
    padded
}

/// Skip `multiplier` pixels, take one, repeat.
///
/// A short final run of dummies is not an error; the walk just stops.
pub fn unpad(padded: &[Rgb], multiplier: usize) -> Vec<Rgb> {
    padded
        .iter()
        .skip(multiplier)
        .step_by(multiplier.saturating_add(1))
        .copied()
        .collect()
}
