/*!
    One's-complement additive check code.

    The drive tags decrypted descriptors and payloads with a single byte:
    the bitwise complement of the byte sum. It catches corruption after
    decryption; it is not a MAC.
*/

use crate::error::{FormatError, FormatResult};

/**
    Sum all bytes (16-bit accumulator, truncated) and complement the low byte.
*/
pub fn check_code(data: &[u8]) -> u8 {
    let sum = data
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
    !(sum as u8)
}

/**
    Write the check code of `block[1..]` into `block[0]`.
*/
pub fn seal(block: &mut [u8]) {
    if let Some((code, rest)) = block.split_first_mut() {
        *code = check_code(rest);
    }
}

/**
    Validate a block whose first byte is the check code of the remainder.
*/
pub fn validate(block: &[u8]) -> FormatResult<()> {
    let (&actual, rest) = block.split_first().ok_or(FormatError::Truncated {
        what: "check-coded block",
        expected: 1,
        actual: 0,
    })?;
    compare(check_code(rest), actual)
}

/**
    Validate a block whose last byte is the check code of everything before it.
*/
pub fn validate_trailing(block: &[u8]) -> FormatResult<()> {
    let (&actual, rest) = block.split_last().ok_or(FormatError::Truncated {
        what: "check-coded block",
        expected: 1,
        actual: 0,
    })?;
    compare(check_code(rest), actual)
}

fn compare(expected: u8, actual: u8) -> FormatResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(FormatError::CheckCodeMismatch { expected, actual })
    }
}
