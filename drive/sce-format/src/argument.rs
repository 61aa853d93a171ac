/*!
    Argument blocks sent after a secure descriptor.

    Layout (before encryption):
      [0]      check code over bytes 1..len
      [1]      random byte
      [2..4]   zero
      [4..]    payload, zero filled to the block length
*/

use crate::check_code::{seal, validate};
use crate::error::{FormatError, FormatResult};

/**
    Size of the user parameter argument block.
*/
pub const ARGUMENT_BLOCK_SIZE: usize = 0x50;

/**
    Offset of the payload inside an argument block.
*/
pub const PAYLOAD_OFFSET: usize = 4;

/**
    Build a plaintext argument block of `N` bytes around `payload`.
*/
pub fn seal_argument<const N: usize>(payload: &[u8], pad: u8) -> FormatResult<[u8; N]> {
    if PAYLOAD_OFFSET + payload.len() > N {
        return Err(FormatError::Oversized {
            data: payload.len(),
            payload: N as u32,
        });
    }
    let mut block = [0u8; N];
    block[1] = pad;
    block[PAYLOAD_OFFSET..PAYLOAD_OFFSET + payload.len()].copy_from_slice(payload);
    seal(&mut block);
    Ok(block)
}

/**
    Validate a decrypted argument block and return everything after the header.
*/
pub fn open_argument(block: &[u8]) -> FormatResult<&[u8]> {
    if block.len() < PAYLOAD_OFFSET {
        return Err(FormatError::Truncated {
            what: "argument block",
            expected: PAYLOAD_OFFSET,
            actual: block.len(),
        });
    }
    validate(block)?;
    Ok(&block[PAYLOAD_OFFSET..])
}
