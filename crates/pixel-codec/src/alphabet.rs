//! Character codec: maps text characters to small integer codes and back.
//!
//! A character's code is its position in [`ALPHABET`]. [`NULL_CODE`] sits one
//! past the end and marks padding and dummy data; it never decodes to text.

/// The fixed alphabet, in code order.
pub const ALPHABET: [char; 42] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', '.', ',',
    '!', '?', ' ', '\n',
];

/// Reserved code for padding and dummy values.
pub const NULL_CODE: u8 = ALPHABET.len() as u8;

/// Code for `c`, or [`NULL_CODE`] when `c` is outside the alphabet.
pub fn encode_char(c: char) -> u8 {
    ALPHABET
        .iter()
        .position(|&a| a == c)
        .map(|i| i as u8)
        .unwrap_or(NULL_CODE)
}

/// Character for `code`. `None` for [`NULL_CODE`] and anything out of range.
pub fn decode_code(code: u8) -> Option<char> {
    ALPHABET.get(code as usize).copied()
}

/// Whether `c` survives a round trip.
pub fn is_encodable(c: char) -> bool {
    encode_char(c) != NULL_CODE
}

/// Encode every character of `text`. Unknown characters become [`NULL_CODE`].
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

/// Decode a code sequence, silently dropping padding and out-of-range codes.
pub fn decode_codes(codes: &[u8]) -> String {
    codes.iter().filter_map(|&c| decode_code(c)).collect()
}
