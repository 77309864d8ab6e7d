//! pixel-codec: reversible, key-driven encoding of text into RGB pixels
//!
//! Text is mapped to small integer codes, packed into a random subset of
//! colour channels, interleaved with decoy pixels, laid out under a random
//! decoy row, and then scrambled by a random run of modular matrix and
//! cascade transforms. Every random choice is recorded in a compact key
//! string; decoding replays the inverses in key order.
//!
//! This is obfuscation, not encryption. It offers no confidentiality
//! guarantee against a determined attacker.
//!
//! # Quick Start
//!
//! ```
//! use pixel_codec::Pipeline;
//!
//! let pipeline = Pipeline::default();
//! let mut rng = rand::thread_rng();
//!
//! let encoded = pipeline.encode("hello, world!", &mut rng).unwrap();
//! let text = pipeline.decode(encoded.grid, &encoded.key).unwrap();
//! assert_eq!(text, "hello, world!");
//! ```
//!
//! # Pipeline
//!
//! ```text
//! text
//!   |  alphabet::encode_text        (codes 0..42, 42 = NULL_CODE)
//!   v
//! codes
//!   |  shuffle::pack                -> 's' command
//!   |  dummy::pad                   -> 'd' command
//!   |  layout::assemble             (decoy row + near-square grid)
//!   v
//! grid
//!   |  matrix::apply | cascade::apply, 2..=6 rounds
//!   |                               -> 'M' / 'm' commands, newest first
//!   v
//! grid + key
//! ```
//!
//! # Key Format
//!
//! A key is a concatenation of `<length><tag><data>` commands, where
//! `length` includes its own digits. `5s201` fills channels 2, 0, 1;
//! `3d3` puts three dummies before each real pixel; `5m171` undoes a
//! cascade seeded at decoy index 171; `25M-3,-5,-5,3,2,-2,2,1,-4` undoes a
//! matrix transform. See [`command`] for the parsing rules.
//!
//! # Raster Boundary
//!
//! The crate does no file I/O. [`Grid`] implements [`RasterImage`], and
//! [`Grid::from_raster`] copies from any other implementation.

pub mod alphabet;
pub mod cascade;
pub mod command;
pub mod dummy;
pub mod error;
pub mod grid;
pub mod layout;
pub mod matrix;
pub mod pipeline;
pub mod shuffle;


pub use alphabet::{ALPHABET, NULL_CODE};
pub use command::{parse_key, render_key, Command, KeyPlan};
pub use error::{CodecError, RequiredCommand};
pub use grid::{Grid, RasterImage, Rgb};
pub use matrix::Matrix3;
pub use pipeline::{decode, encode, EncodeOptions, Encoded, Pipeline};
