//! Test fixtures and constants.

use base64::Engine;

/// Sample messages covering the whole alphabet
pub mod texts {
    /// Short lowercase message
    pub const SHORT: &str = "meet at the old mill.";

    /// Every supported character, newline included
    pub const FULL_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz1234567890.,!? \n";

    /// Mixed case; the capitals are outside the alphabet
    pub const MIXED_CASE: &str = "Hello World";
}

/// Hand-checked keys
pub mod keys {
    /// Well-formed, with a matrix, a dummy count and a legacy cascade tail
    pub const SAMPLE: &str = "5s20125M-3,-5,-5,3,2,-2,2,1,-43d3m171,1";

    /// Length prefix one short of the data it announces
    pub const BAD_LENGTH: &str = "5s20124M-3,-5,-5,3,2,-2,2,1,-43d3m171,1";

    /// No dummy command
    pub const NO_DUMMY: &str = "5s201";

    /// No shuffle command
    pub const NO_SHUFFLE: &str = "3d3";

    /// Singular matrix (determinant 2)
    pub const SINGULAR: &str = "3s03d220M2,0,0,0,1,0,0,0,1";

    /// Entries around 2^62; singular modulo 256
    pub const HUGE_SINGULAR: &str =
        "3s03d356M4611686018427387904,0,0,0,4611686018427387904,0,0,0,1";
}

pub fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn unb64(data: &str) -> Vec<u8> {
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .expect("Invalid base64 in test data")
}

/// JSON body for /api/encode with inline text
pub fn encode_body(text: &str) -> String {
    serde_json::json!({ "text": text }).to_string()
}

/// JSON body for /api/decode
pub fn decode_body(key: &str, png_bytes: &[u8]) -> String {
    serde_json::json!({ "key": key, "image": b64(png_bytes) }).to_string()
}
