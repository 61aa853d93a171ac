/*!
    Cipher primitives used by the exchange.

    Symmetric only:
    - AES-128-CBC without padding for nonces, argument blocks, responses and
      the fixed-key watermark/content/disc-ID transforms
    - two-key triple DES (EDE2) CBC without padding for secure descriptors
*/

pub mod aes;
pub mod des;

use rand::RngCore;

use drive_core::Key128;

/**
    Fresh 128-bit value from the thread-local CSPRNG.
*/
pub fn random_block() -> Key128 {
    let mut block = [0u8; 16];
    rand::rng().fill_bytes(&mut block);
    block
}

/**
    One random padding byte.
*/
pub fn random_byte() -> u8 {
    rand::random::<u8>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_blocks_differ() {
        assert_ne!(random_block(), random_block());
    }
}
