use aes::Aes128;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::NoPadding};

use drive_core::Key128;

use crate::error::{AuthError, AuthResult};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

pub const BLOCK_SIZE: usize = 16;

fn check_aligned(len: usize) -> AuthResult<()> {
    if len == 0 || len % BLOCK_SIZE != 0 {
        return Err(AuthError::Crypto(format!(
            "AES-CBC input of {len} bytes is not a whole number of blocks"
        )));
    }
    Ok(())
}

/**
    AES-128-CBC encryption in place, no padding.
*/
pub fn cbc_encrypt(key: &Key128, iv: &Key128, data: &mut [u8]) -> AuthResult<()> {
    check_aligned(data.len())?;
    let len = data.len();
    Aes128CbcEnc::new(key.into(), iv.into())
        .encrypt_padded_mut::<NoPadding>(data, len)
        .map_err(|_| AuthError::Crypto("AES-CBC encryption failed".into()))?;
    Ok(())
}

/**
    AES-128-CBC decryption in place, no padding.
*/
pub fn cbc_decrypt(key: &Key128, iv: &Key128, data: &mut [u8]) -> AuthResult<()> {
    check_aligned(data.len())?;
    Aes128CbcDec::new(key.into(), iv.into())
        .decrypt_padded_mut::<NoPadding>(data)
        .map_err(|_| AuthError::Crypto("AES-CBC decryption failed".into()))?;
    Ok(())
}

/**
    Encrypt a single block. CBC over one block with the given IV.
*/
pub fn encrypt_block(key: &Key128, iv: &Key128, block: &Key128) -> AuthResult<Key128> {
    let mut out = *block;
    cbc_encrypt(key, iv, &mut out)?;
    Ok(out)
}

pub fn decrypt_block(key: &Key128, iv: &Key128, block: &Key128) -> AuthResult<Key128> {
    let mut out = *block;
    cbc_decrypt(key, iv, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // FIPS-197 appendix C.1; a zero IV makes one CBC block equal to ECB.
    const KEY: Key128 = hex!("000102030405060708090a0b0c0d0e0f");
    const PLAIN: Key128 = hex!("00112233445566778899aabbccddeeff");
    const CIPHER: Key128 = hex!("69c4e0d86a7b0430d8cdb78070b4c55a");

    #[test]
    fn known_answer() {
        assert_eq!(encrypt_block(&KEY, &[0; 16], &PLAIN).unwrap(), CIPHER);
        assert_eq!(decrypt_block(&KEY, &[0; 16], &CIPHER).unwrap(), PLAIN);
    }

    #[test]
    fn iv_is_xored_into_first_block() {
        let iv = hex!("0f0e0d0c0b0a09080706050403020100");
        let mut mixed = PLAIN;
        for (b, v) in mixed.iter_mut().zip(iv) {
            *b ^= v;
        }
        assert_eq!(
            encrypt_block(&KEY, &iv, &PLAIN).unwrap(),
            encrypt_block(&KEY, &[0; 16], &mixed).unwrap()
        );
    }

    #[test]
    fn multi_block_round_trip() {
        let key = [0x42u8; 16];
        let iv = [0x13u8; 16];
        let original: Vec<u8> = (0u8..0x50).collect();
        let mut data = original.clone();
        cbc_encrypt(&key, &iv, &mut data).unwrap();
        assert_ne!(data, original);
        // chaining: identical plaintext blocks must not give identical output
        let mut same = vec![0u8; 32];
        cbc_encrypt(&key, &iv, &mut same).unwrap();
        assert_ne!(same[..16], same[16..]);
        cbc_decrypt(&key, &iv, &mut data).unwrap();
        assert_eq!(data, original);
    }

    #[test]
    fn unaligned_input() {
        let mut data = [0u8; 17];
        assert!(matches!(
            cbc_encrypt(&KEY, &[0; 16], &mut data),
            Err(AuthError::Crypto(_))
        ));
        assert!(matches!(
            cbc_decrypt(&KEY, &[0; 16], &mut []),
            Err(AuthError::Crypto(_))
        ));
    }
}
