//! Channel shuffle: packs codes into a random subset of the RGB channels.
//!
//! Channels outside the chosen subset carry random filler in
//! `0..=NULL_CODE`, so they look like data but are never read back.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::alphabet::NULL_CODE;
use crate::grid::Rgb;

/// Pick the channels that will carry data, in the order they are filled.
///
/// Starts from a random permutation of `[0, 1, 2]`. Every channel but the
/// last is dropped with probability 1/3, so at least one always remains.
pub fn choose_channels<R: Rng + ?Sized>(rng: &mut R) -> Vec<u8> {
    let mut order = [0u8, 1, 2];
    order.shuffle(rng);

    let mut used: Vec<u8> = order[..2]
        .iter()
        .copied()
        .filter(|_| rng.gen_range(0..3) != 0)
        .collect();
    used.push(order[2]);
    used
}

/// Pack `codes` into pixels using `channels` in order.
///
/// The last pixel is topped up with [`NULL_CODE`] when `codes` does not
/// divide evenly.
///
/// # Panics
///
/// Panics if `channels` is empty.
pub fn pack<R: Rng + ?Sized>(codes: &[u8], channels: &[u8], rng: &mut R) -> Vec<Rgb> {
    assert!(!channels.is_empty(), "at least one channel is required");

    let mut codes = codes.iter().copied();
    let pixel_count = codes.len().div_ceil(channels.len());
    let mut pixels = Vec::with_capacity(pixel_count);

    for _ in 0..pixel_count {
        let mut pixel = Rgb::random_up_to(rng, NULL_CODE);
        for &ch in channels {
            pixel.0[ch as usize] = codes.next().unwrap_or(NULL_CODE);
        }
        pixels.push(pixel);
    }

    tracing::trace!(
        channels = ?channels,
        pixels = pixels.len(),
        "Packed codes into pixels"
    );

    pixels
}

/// Read codes back out of `pixels`, visiting `channels` in order.
pub fn unpack(pixels: &[Rgb], channels: &[u8]) -> Vec<u8> {
    let mut codes = Vec::with_capacity(pixels.len() * channels.len());
    for pixel in pixels {
        for &ch in channels {
            codes.push(pixel.0[ch as usize]);
        }
    }
    codes
}
