//! Encode and decode orchestration.
//!
//! Encoding runs codes → channel shuffle → dummy padding → grid assembly →
//! a random run of matrix/cascade transforms. The key lists the shuffle and
//! dummy commands first, then the transforms newest-first, so decoding can
//! undo them in key order.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::alphabet::{self, NULL_CODE};
use crate::command::{render_key, Command, KeyPlan};
use crate::error::CodecError;
use crate::grid::Grid;
use crate::{cascade, dummy, layout, matrix, shuffle};

/// Tunables for the randomized parts of encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Dummy pixels inserted before each real pixel.
    pub multiplier_range: RangeInclusive<usize>,
    /// How many matrix/cascade rounds to apply.
    pub transform_rounds: RangeInclusive<usize>,
    /// Matrix entries are drawn from `-bound..=bound`.
    pub matrix_entry_bound: i64,
    pub matrix_attempts: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            multiplier_range: dummy::DEFAULT_MULTIPLIER_RANGE,
            transform_rounds: 2..=6,
            matrix_entry_bound: matrix::DEFAULT_ENTRY_BOUND,
            matrix_attempts: matrix::DEFAULT_ATTEMPTS,
        }
    }
}

impl EncodeOptions {
    /// Check that every range can be sampled.
    pub fn validate(&self) -> Result<(), String> {
        if self.multiplier_range.is_empty() {
            return Err(format!(
                "dummy multiplier range {:?} is empty",
                self.multiplier_range
            ));
        }
        if self.transform_rounds.is_empty() {
            return Err(format!(
                "transform round range {:?} is empty",
                self.transform_rounds
            ));
        }
        if self.matrix_entry_bound < 1 {
            return Err("matrix entry bound must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Result of a successful encode.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub grid: Grid,
    pub key: String,
    /// Input characters outside the alphabet, lost in the round trip.
    pub dropped_chars: usize,
}

/// The encode/decode orchestrator.
///
/// Holds only configuration, so one value can serve concurrent calls; all
/// per-call state lives on the stack of `encode`/`decode`.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: EncodeOptions,
}

impl Pipeline {
    /// Fails if `options` does not pass [`EncodeOptions::validate`].
    pub fn new(options: EncodeOptions) -> Result<Self, CodecError> {
        options.validate().map_err(CodecError::InvalidOptions)?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Encode `text` with freshly drawn channels and multiplier.
    pub fn encode<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Result<Encoded, CodecError> {
        let channels = shuffle::choose_channels(rng);
        let multiplier = dummy::choose_multiplier(rng, self.options.multiplier_range.clone());
        self.encode_with(text, channels, multiplier, rng)
    }

    /// Encode with a fixed channel subset and multiplier.
    ///
    /// `channels` must list one to three distinct channels from `0..=2`.
    pub fn encode_with<R: Rng + ?Sized>(
        &self,
        text: &str,
        channels: Vec<u8>,
        multiplier: usize,
        rng: &mut R,
    ) -> Result<Encoded, CodecError> {
        if text.is_empty() {
            return Err(CodecError::EmptyInput);
        }
        check_channels(&channels)?;

        let codes = alphabet::encode_text(text);
        let dropped_chars = codes.iter().filter(|&&c| c == NULL_CODE).count();
        if dropped_chars > 0 {
            tracing::debug!(dropped_chars, "Input contains characters outside the alphabet");
        }

        let mut grid = self.prepare(&codes, &channels, multiplier, rng);
        let applied = self.manipulate(&mut grid, rng)?;

        let mut commands = Vec::with_capacity(applied.len() + 2);
        commands.push(Command::ChannelShuffle(channels));
        commands.push(Command::DummyPadding(multiplier));
        commands.extend(applied.into_iter().rev());

        tracing::debug!(
            width = grid.width(),
            height = grid.height(),
            commands = commands.len(),
            "Encoded text into grid"
        );

        Ok(Encoded {
            grid,
            key: render_key(&commands),
            dropped_chars,
        })
    }

    /// Pack, pad and lay out `codes`, before any pixel manipulation.
    pub fn prepare<R: Rng + ?Sized>(
        &self,
        codes: &[u8],
        channels: &[u8],
        multiplier: usize,
        rng: &mut R,
    ) -> Grid {
        let packed = shuffle::pack(codes, channels, rng);
        let padded = dummy::pad(&packed, multiplier, rng);
        tracing::debug!(
            channels = channels.len(),
            multiplier,
            pixels = padded.len(),
            "Prepared pixel stream"
        );
        layout::assemble(&padded, rng)
    }

    /// Apply a random run of transforms; returns them in application order.
    fn manipulate<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        rng: &mut R,
    ) -> Result<Vec<Command>, CodecError> {
        let rounds = rng.gen_range(self.options.transform_rounds.clone());
        let mut applied = Vec::with_capacity(rounds);

        for _ in 0..rounds {
            let command = if rng.gen_bool(0.5) {
                let m = matrix::Matrix3::generate(
                    rng,
                    self.options.matrix_entry_bound,
                    self.options.matrix_attempts,
                );
                matrix::apply(grid, &m);
                Command::Matrix(m)
            } else {
                let picked = rng.gen_range(0..grid.width());
                cascade::apply(grid, picked)?;
                Command::Cascade(picked)
            };
            tracing::trace!(tag = %command.tag(), "Applied transform");
            applied.push(command);
        }

        Ok(applied)
    }

    /// Recover text from `grid` using `key`.
    pub fn decode(&self, grid: Grid, key: &str) -> Result<String, CodecError> {
        let plan = KeyPlan::parse(key)?;
        self.decode_plan(grid, &plan)
    }

    /// Decode with an already validated key.
    pub fn decode_plan(&self, mut grid: Grid, plan: &KeyPlan) -> Result<String, CodecError> {
        check_plan_fits(&grid, plan)?;

        for command in &plan.manipulations {
            match command {
                Command::Matrix(m) => matrix::invert(&mut grid, m)?,
                Command::Cascade(picked) => cascade::invert(&mut grid, *picked)?,
                Command::ChannelShuffle(_) | Command::DummyPadding(_) => {}
            }
        }

        let pixels = layout::disassemble(&grid);
        let real = dummy::unpad(&pixels, plan.multiplier);
        let codes = shuffle::unpack(&real, &plan.channels);
        let text = alphabet::decode_codes(&codes);

        tracing::debug!(
            transforms = plan.manipulations.len(),
            chars = text.chars().count(),
            "Decoded grid"
        );
        Ok(text)
    }
}

fn check_channels(channels: &[u8]) -> Result<(), CodecError> {
    if channels.is_empty() {
        return Err(CodecError::InvalidOptions("no channels selected".to_string()));
    }
    for (i, &ch) in channels.iter().enumerate() {
        if ch > 2 {
            return Err(CodecError::InvalidOptions(format!(
                "channel {ch} does not exist"
            )));
        }
        if channels[..i].contains(&ch) {
            return Err(CodecError::InvalidOptions(format!(
                "channel {ch} selected twice"
            )));
        }
    }
    Ok(())
}

/// Reject a key whose transforms cannot be undone on this grid, before
/// any pixel is touched.
fn check_plan_fits(grid: &Grid, plan: &KeyPlan) -> Result<(), CodecError> {
    if grid.width() == 0 || grid.height() == 0 {
        return Err(CodecError::DataDesynchronized(
            "image has no decoy row".to_string(),
        ));
    }
    for command in &plan.manipulations {
        match command {
            Command::Matrix(m) if !m.is_invertible_mod256() => {
                return Err(CodecError::NonInvertibleTransform);
            }
            Command::Cascade(picked) if *picked >= grid.width() => {
                return Err(CodecError::DataDesynchronized(format!(
                    "cascade index {picked} outside image width {}",
                    grid.width()
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Encode with default options.
pub fn encode<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Result<Encoded, CodecError> {
    Pipeline::default().encode(text, rng)
}

/// Decode with default options.
pub fn decode(grid: Grid, key: &str) -> Result<String, CodecError> {
    Pipeline::default().decode(grid, key)
}
