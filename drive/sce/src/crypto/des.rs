use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
use des::TdesEde2;

use drive_core::Key128;

use crate::error::{AuthError, AuthResult};

type TdesCbcEnc = cbc::Encryptor<TdesEde2>;
type TdesCbcDec = cbc::Decryptor<TdesEde2>;

pub const BLOCK_SIZE: usize = 8;

fn check_aligned(len: usize) -> AuthResult<()> {
    if len == 0 || len % BLOCK_SIZE != 0 {
        return Err(AuthError::Crypto(format!(
            "3DES-CBC input of {len} bytes is not a whole number of blocks"
        )));
    }
    Ok(())
}

/**
    Two-key triple DES (K1 = key[..8], K2 = key[8..], EDE) CBC encryption in place.
*/
pub fn cbc_encrypt(key: &Key128, iv: &[u8; BLOCK_SIZE], data: &mut [u8]) -> AuthResult<()> {
    check_aligned(data.len())?;
    let len = data.len();
    TdesCbcEnc::new(key.into(), iv.into())
        .encrypt_padded_mut::<NoPadding>(data, len)
        .map_err(|_| AuthError::Crypto("3DES-CBC encryption failed".into()))?;
    Ok(())
}

pub fn cbc_decrypt(key: &Key128, iv: &[u8; BLOCK_SIZE], data: &mut [u8]) -> AuthResult<()> {
    check_aligned(data.len())?;
    TdesCbcDec::new(key.into(), iv.into())
        .decrypt_padded_mut::<NoPadding>(data)
        .map_err(|_| AuthError::Crypto("3DES-CBC decryption failed".into()))?;
    Ok(())
}
