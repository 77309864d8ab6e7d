//! Key format: the length-prefixed, type-tagged command stream.
//!
//! Each command renders as `<length><tag><data>`, where `length` counts the
//! tag, the data and its own digits. Parsing happens in two layers:
//! [`split_commands`] cuts the string into raw `(tag, data)` segments and
//! [`parse_key`] turns those into typed [`Command`]s.

use crate::error::{CodecError, RequiredCommand};
use crate::matrix::Matrix3;

pub const SHUFFLE_TAG: char = 's';
pub const DUMMY_TAG: char = 'd';
pub const MATRIX_TAG: char = 'M';
pub const CASCADE_TAG: char = 'm';

/// One recorded pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Channels that carry data, in fill order.
    ChannelShuffle(Vec<u8>),
    /// Dummy pixels before each real pixel.
    DummyPadding(usize),
    Matrix(Matrix3),
    /// Decoy-row index the cascade window is seeded from.
    Cascade(usize),
}

impl Command {
    pub fn tag(&self) -> char {
        match self {
            Command::ChannelShuffle(_) => SHUFFLE_TAG,
            Command::DummyPadding(_) => DUMMY_TAG,
            Command::Matrix(_) => MATRIX_TAG,
            Command::Cascade(_) => CASCADE_TAG,
        }
    }

    fn payload(&self) -> String {
        match self {
            Command::ChannelShuffle(channels) => {
                channels.iter().map(|c| char::from(b'0' + c)).collect()
            }
            Command::DummyPadding(multiplier) => multiplier.to_string(),
            Command::Matrix(m) => m
                .entries()
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(","),
            Command::Cascade(index) => index.to_string(),
        }
    }

    /// Render with its length prefix.
    pub fn render(&self) -> String {
        let payload = self.payload();
        let body_len = 1 + payload.chars().count();
        format!("{}{}{}", prefixed_len(body_len), self.tag(), payload)
    }

    /// Interpret one raw segment.
    pub fn from_raw(raw: &RawCommand) -> Result<Self, CodecError> {
        let data = raw.data.as_str();
        match raw.tag {
            SHUFFLE_TAG => parse_channels(data).map(Command::ChannelShuffle),
            DUMMY_TAG => data
                .parse()
                .map(Command::DummyPadding)
                .map_err(|_| invalid(format!("dummy multiplier {data:?} is not a number"))),
            MATRIX_TAG => parse_matrix(data).map(Command::Matrix),
            CASCADE_TAG => parse_cascade(data).map(Command::Cascade),
            other => Err(invalid(format!("unknown command type {other:?}"))),
        }
    }
}

/// An unparsed `(tag, data)` segment of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommand {
    pub tag: char,
    pub data: String,
}

fn invalid(reason: impl Into<String>) -> CodecError {
    CodecError::InvalidKeyFormat(reason.into())
}

fn digit_count(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// Smallest `total` with `total == body_len + digits(total)`.
fn prefixed_len(body_len: usize) -> usize {
    let mut total = body_len + 1;
    loop {
        let candidate = body_len + digit_count(total);
        if candidate == total {
            return total;
        }
        total = candidate;
    }
}

fn is_known_tag(c: char) -> bool {
    matches!(c, SHUFFLE_TAG | DUMMY_TAG | MATRIX_TAG | CASCADE_TAG)
}

fn parse_channels(data: &str) -> Result<Vec<u8>, CodecError> {
    if data.is_empty() {
        return Err(invalid("channel shuffle lists no channels"));
    }
    let mut channels = Vec::with_capacity(3);
    for c in data.chars() {
        let ch = match c.to_digit(10) {
            Some(d) if d < 3 => d as u8,
            _ => return Err(invalid(format!("invalid channel {c:?}"))),
        };
        if channels.contains(&ch) {
            return Err(invalid(format!("channel {ch} listed twice")));
        }
        channels.push(ch);
    }
    Ok(channels)
}

fn parse_matrix(data: &str) -> Result<Matrix3, CodecError> {
    let values = data
        .split(',')
        .map(|v| v.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid(format!("matrix entries {data:?} are not integers")))?;
    let entries: [i64; 9] = values
        .try_into()
        .map_err(|v: Vec<i64>| invalid(format!("matrix has {} entries, expected 9", v.len())))?;
    Ok(Matrix3::from_entries(entries))
}

/// Leading integer; a legacy `,`-separated suffix is ignored.
fn parse_cascade(data: &str) -> Result<usize, CodecError> {
    let head = data.split(',').next().unwrap_or_default();
    head.trim()
        .parse()
        .map_err(|_| invalid(format!("cascade index {data:?} is not a number")))
}

/// Cut a key into raw segments without interpreting their data.
///
/// Stray characters between commands are skipped. A bare `m` with no
/// length prefix swallows the rest of the key as its data.
pub fn split_commands(key: &str) -> Result<Vec<RawCommand>, CodecError> {
    let chars: Vec<char> = key.chars().collect();
    let mut commands = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_ascii_digit() {
            let start = pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            let digits: String = chars[start..pos].iter().collect();
            let declared: usize = digits
                .parse()
                .map_err(|_| invalid(format!("length {digits} is too large")))?;

            let tag = *chars
                .get(pos)
                .ok_or_else(|| invalid(format!("length {declared} has no command type")))?;
            if !is_known_tag(tag) {
                return Err(invalid(format!("unknown command type {tag:?}")));
            }

            let data_len = declared
                .checked_sub(digits.len() + 1)
                .ok_or_else(|| invalid(format!("length {declared} is too short")))?;
            let data_start = pos + 1;
            let data_end = data_start
                .checked_add(data_len)
                .filter(|&end| end <= chars.len())
                .ok_or_else(|| {
                    invalid(format!("'{tag}' command runs past the end of the key"))
                })?;

            commands.push(RawCommand {
                tag,
                data: chars[data_start..data_end].iter().collect(),
            });
            pos = data_end;
        } else if c == CASCADE_TAG {
            commands.push(RawCommand {
                tag: CASCADE_TAG,
                data: chars[pos + 1..].iter().collect(),
            });
            break;
        } else {
            pos += 1;
        }
    }

    Ok(commands)
}

/// Parse a key into typed commands, in key order.
pub fn parse_key(key: &str) -> Result<Vec<Command>, CodecError> {
    split_commands(key)?.iter().map(Command::from_raw).collect()
}

/// Concatenate rendered commands.
pub fn render_key(commands: &[Command]) -> String {
    commands.iter().map(Command::render).collect()
}

/// A key checked for the commands every decode needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPlan {
    pub channels: Vec<u8>,
    pub multiplier: usize,
    /// Matrix and cascade commands, already in undo order.
    pub manipulations: Vec<Command>,
}

impl KeyPlan {
    /// Exactly one shuffle and one dummy command are required.
    pub fn from_commands(commands: Vec<Command>) -> Result<Self, CodecError> {
        let mut channels = None;
        let mut multiplier = None;
        let mut manipulations = Vec::new();

        for command in commands {
            match command {
                Command::ChannelShuffle(c) => {
                    if channels.replace(c).is_some() {
                        return Err(invalid("key has more than one 's' command"));
                    }
                }
                Command::DummyPadding(m) => {
                    if multiplier.replace(m).is_some() {
                        return Err(invalid("key has more than one 'd' command"));
                    }
                }
                other => manipulations.push(other),
            }
        }

        let channels = channels
            .ok_or(CodecError::MissingRequiredCommand(RequiredCommand::ChannelShuffle))?;
        let multiplier = multiplier
            .ok_or(CodecError::MissingRequiredCommand(RequiredCommand::DummyPadding))?;

        Ok(Self {
            channels,
            multiplier,
            manipulations,
        })
    }

    /// Parse and validate in one step.
    pub fn parse(key: &str) -> Result<Self, CodecError> {
        Self::from_commands(parse_key(key)?)
    }
}
