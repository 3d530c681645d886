//! Base64 transport decoding.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use crate::error::{PlaybackError, Result};

/// Standard alphabet; trailing `=` padding is optional on decode.
const TRANSPORT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a standard-alphabet base64 string into raw bytes.
///
/// Padding may be present or omitted. Characters outside the alphabet and
/// malformed padding are rejected with [`PlaybackError::Decode`].
pub fn decode_base64(input: &str) -> Result<Vec<u8>> {
    TRANSPORT
        .decode(input)
        .map_err(|e| PlaybackError::decode(format!("Invalid base64 payload: {}", e)))
}
