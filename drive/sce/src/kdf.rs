use drive_core::{Key128, KeyStore};

use crate::crypto::aes;
use crate::error::AuthResult;
use crate::session::SessionKeys;

/**
    Derive the two session keys from the exchanged nonces.

    Each nonce is split into halves and the halves are crossed so both keys
    carry entropy from both sides:
      block A = host[0..8]  || drive[8..16]  -> AES-CBC(session_derivation_key_1)
      block B = host[8..16] || drive[0..8]   -> AES-CBC(session_derivation_key_2)
    Both use `nonce_iv`.
*/
pub fn derive_session_keys(
    keys: &KeyStore,
    host_nonce: &Key128,
    drive_nonce: &Key128,
) -> AuthResult<SessionKeys> {
    let mut block_a = [0u8; 16];
    block_a[..8].copy_from_slice(&host_nonce[..8]);
    block_a[8..].copy_from_slice(&drive_nonce[8..]);

    let mut block_b = [0u8; 16];
    block_b[..8].copy_from_slice(&host_nonce[8..]);
    block_b[8..].copy_from_slice(&drive_nonce[..8]);

    Ok(SessionKeys {
        key1: aes::encrypt_block(&keys.session_derivation_key_1, &keys.nonce_iv, &block_a)?,
        key2: aes::encrypt_block(&keys.session_derivation_key_2, &keys.nonce_iv, &block_b)?,
    })
}
