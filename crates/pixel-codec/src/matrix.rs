//! Matrix transform: per-pixel 3x3 linear map modulo 256.
//!
//! A matrix is invertible modulo 256 exactly when its determinant is odd,
//! because 2 is the only prime factor of 256.

use rand::Rng;

use crate::error::CodecError;
use crate::grid::{Grid, Rgb};

const MODULUS: i64 = 256;

/// Default bound on generated entries: each is drawn from `-5..=5`.
pub const DEFAULT_ENTRY_BOUND: i64 = 5;

/// Default number of draws before falling back to the identity.
pub const DEFAULT_ATTEMPTS: usize = 100;

/// A 3x3 integer matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matrix3(pub [[i64; 3]; 3]);

impl Matrix3 {
    pub const IDENTITY: Self = Self([[1, 0, 0], [0, 1, 0], [0, 0, 1]]);

    /// Build from nine row-major entries.
    pub fn from_entries(e: [i64; 9]) -> Self {
        Self([[e[0], e[1], e[2]], [e[3], e[4], e[5]], [e[6], e[7], e[8]]])
    }

    /// One pixel per row.
    pub fn from_pixels(rows: [Rgb; 3]) -> Self {
        Self([rows[0].to_i64(), rows[1].to_i64(), rows[2].to_i64()])
    }

    /// The nine entries, row-major.
    pub fn entries(&self) -> [i64; 9] {
        let m = &self.0;
        [
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        ]
    }

    /// Exact for small entries; otherwise correct modulo 2^64, which is
    /// all the mod-256 callers need.
    pub fn determinant(&self) -> i64 {
        let m = &self.0;
        let minor = |a: usize, b: usize, c: usize, d: usize| {
            m[1][a]
                .wrapping_mul(m[2][b])
                .wrapping_sub(m[1][c].wrapping_mul(m[2][d]))
        };
        m[0][0]
            .wrapping_mul(minor(1, 2, 2, 1))
            .wrapping_sub(m[0][1].wrapping_mul(minor(0, 2, 2, 0)))
            .wrapping_add(m[0][2].wrapping_mul(minor(0, 1, 1, 0)))
    }

    /// Transpose of the cofactor matrix.
    pub fn adjugate(&self) -> Self {
        let m = &self.0;
        let cofactor = |r: usize, c: usize| -> i64 {
            let rows: Vec<usize> = (0..3).filter(|&i| i != r).collect();
            let cols: Vec<usize> = (0..3).filter(|&j| j != c).collect();
            let minor = m[rows[0]][cols[0]]
                .wrapping_mul(m[rows[1]][cols[1]])
                .wrapping_sub(m[rows[0]][cols[1]].wrapping_mul(m[rows[1]][cols[0]]));
            if (r + c) % 2 == 0 {
                minor
            } else {
                minor.wrapping_neg()
            }
        };

        let mut adj = [[0i64; 3]; 3];
        for (r, row) in adj.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = cofactor(c, r);
            }
        }
        Self(adj)
    }

    /// Whether the matrix has an inverse modulo 256.
    pub fn is_invertible_mod256(&self) -> bool {
        self.determinant().rem_euclid(MODULUS) % 2 == 1
    }

    /// Inverse modulo 256, with every entry in `0..256`.
    pub fn inverse_mod256(&self) -> Option<Self> {
        let det = self.determinant().rem_euclid(MODULUS);
        let det_inv = mod_inverse(det, MODULUS)?;
        let adj = self.adjugate();

        let mut inv = [[0i64; 3]; 3];
        for (r, row) in inv.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = det_inv.wrapping_mul(adj.0[r][c]).rem_euclid(MODULUS);
            }
        }
        Some(Self(inv))
    }

    /// `(M * p) mod 256`.
    pub fn mul_pixel(&self, pixel: Rgb) -> Rgb {
        let p = pixel.to_i64();
        let mut out = [0u8; 3];
        for (o, row) in out.iter_mut().zip(&self.0) {
            let dot = row
                .iter()
                .zip(p)
                .fold(0i64, |acc, (&m, v)| acc.wrapping_add(m.wrapping_mul(v)));
            *o = dot.rem_euclid(MODULUS) as u8;
        }
        Rgb(out)
    }

    /// Draw a random matrix with entries in `-bound..=bound`.
    ///
    /// Retries up to `attempts` times for an odd determinant, then settles
    /// for the identity.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, bound: i64, attempts: usize) -> Self {
        for _ in 0..attempts {
            let mut e = [0i64; 9];
            for v in e.iter_mut() {
                *v = rng.gen_range(-bound..=bound);
            }
            let candidate = Self::from_entries(e);
            if candidate.is_invertible_mod256() {
                return candidate;
            }
        }
        tracing::debug!(attempts, "No invertible matrix drawn, using identity");
        Self::IDENTITY
    }
}

/// Modular inverse of `a` modulo `m` by the extended Euclidean algorithm.
pub fn mod_inverse(a: i64, m: i64) -> Option<i64> {
    let (mut old_r, mut r) = (a.rem_euclid(m), m);
    let (mut old_s, mut s) = (1i64, 0i64);

    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }

    if old_r == 1 {
        Some(old_s.rem_euclid(m))
    } else {
        None
    }
}

/// Multiply every pixel of the grid, decoy row included, by `m`.
pub fn apply(grid: &mut Grid, m: &Matrix3) {
    for pixel in grid.pixels_mut() {
        *pixel = m.mul_pixel(*pixel);
    }
}

/// Undo [`apply`] with the same matrix.
pub fn invert(grid: &mut Grid, m: &Matrix3) -> Result<(), CodecError> {
    let inv = m
        .inverse_mod256()
        .ok_or(CodecError::NonInvertibleTransform)?;
    apply(grid, &inv);
    Ok(())
}
