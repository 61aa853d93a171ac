use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KeyStoreError, KeyStoreResult};
use crate::types::{Key128, UserSlot};
use crate::utils::{hex_bytes, is_zeroed};

/**
    Size of a user parameter block.
*/
pub const USER_PARAMETER_SIZE: usize = 0x40;

/**
    Number of user-mode key slots.
*/
pub const USER_SLOT_COUNT: usize = 5;

/**
    The two fixed keys used only during the nonce exchange.

    `key1` encrypts what the host sends, `key2` decrypts what the drive reports.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChallengeKeyPair {
    #[serde(with = "hex_bytes")]
    pub key1: Key128,
    #[serde(with = "hex_bytes")]
    pub key2: Key128,
}

impl ChallengeKeyPair {
    pub const ZERO: Self = Self {
        key1: [0; 16],
        key2: [0; 16],
    };

    /**
        A pair with either key all-zero was never loaded and must not be used.
    */
    pub fn is_uninitialized(&self) -> bool {
        is_zeroed(&self.key1) || is_zeroed(&self.key2)
    }
}

/**
    Key material for one user-mode slot.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserModeKeys {
    pub challenge: ChallengeKeyPair,
    #[serde(with = "hex_bytes")]
    pub parameter: [u8; USER_PARAMETER_SIZE],
}

impl UserModeKeys {
    const ZERO: Self = Self {
        challenge: ChallengeKeyPair::ZERO,
        parameter: [0; USER_PARAMETER_SIZE],
    };
}

/**
    Selects a challenge-key pair from the key store.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeSlot {
    /// Drive-individual pair, tried first during super authentication.
    Primary,
    /// Fallback pair for older drive firmware.
    Secondary,
    /// Last-resort pair; failure with it is terminal.
    Tertiary,
    User(UserSlot),
}

/**
    Immutable table of the fixed keys and IVs the protocol needs.

    Loaded once from a JSON key file where every value is a hex string. Field
    lengths are enforced on load: a 16-byte role given 15 bytes is an error,
    never a silently padded key.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyStore {
    // ── Challenge-key pairs ───────────────────────────────────────────
    pub primary: ChallengeKeyPair,
    pub secondary: ChallengeKeyPair,
    pub tertiary: ChallengeKeyPair,
    pub user: [UserModeKeys; USER_SLOT_COUNT],

    // ── Nonce exchange and session-key derivation ─────────────────────
    #[serde(with = "hex_bytes")]
    pub nonce_iv: Key128,
    #[serde(with = "hex_bytes")]
    pub session_derivation_key_1: Key128,
    #[serde(with = "hex_bytes")]
    pub session_derivation_key_2: Key128,

    // ── Secure command framing ────────────────────────────────────────
    /// Triple-DES IV for encrypted command descriptors.
    #[serde(with = "hex_bytes")]
    pub command_iv: [u8; 8],
    /// AES IV for argument blocks and secure responses.
    #[serde(with = "hex_bytes")]
    pub argument_iv: Key128,

    // ── Disc watermark ────────────────────────────────────────────────
    #[serde(with = "hex_bytes")]
    pub debug_disc_marker: Key128,
    #[serde(with = "hex_bytes")]
    pub debug_contents_key: Key128,
    #[serde(with = "hex_bytes")]
    pub contents_key: Key128,
    #[serde(with = "hex_bytes")]
    pub contents_iv: Key128,
    #[serde(with = "hex_bytes")]
    pub watermark_key: Key128,
    #[serde(with = "hex_bytes")]
    pub disc_id_key: Key128,
    #[serde(with = "hex_bytes")]
    pub disc_id_iv: Key128,
}

impl KeyStore {
    /**
        A key store with every value zeroed, used as a key-file template.
    */
    pub fn zeroed() -> Self {
        Self {
            primary: ChallengeKeyPair::ZERO,
            secondary: ChallengeKeyPair::ZERO,
            tertiary: ChallengeKeyPair::ZERO,
            user: [UserModeKeys::ZERO; USER_SLOT_COUNT],
            nonce_iv: [0; 16],
            session_derivation_key_1: [0; 16],
            session_derivation_key_2: [0; 16],
            command_iv: [0; 8],
            argument_iv: [0; 16],
            debug_disc_marker: [0; 16],
            debug_contents_key: [0; 16],
            contents_key: [0; 16],
            contents_iv: [0; 16],
            watermark_key: [0; 16],
            disc_id_key: [0; 16],
            disc_id_iv: [0; 16],
        }
    }

    /**
        Parse a key store from JSON bytes.
    */
    pub fn from_json(data: impl AsRef<[u8]>) -> KeyStoreResult<Self> {
        Ok(serde_json::from_slice(data.as_ref())?)
    }

    /**
        Read and parse a JSON key file.
    */
    pub fn from_file(path: impl AsRef<Path>) -> KeyStoreResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| KeyStoreError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(data)
    }

    /**
        Serialize as pretty-printed JSON.
    */
    pub fn to_json(&self) -> KeyStoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn challenge_pair(&self, slot: ChallengeSlot) -> &ChallengeKeyPair {
        match slot {
            ChallengeSlot::Primary => &self.primary,
            ChallengeSlot::Secondary => &self.secondary,
            ChallengeSlot::Tertiary => &self.tertiary,
            ChallengeSlot::User(user) => &self.user[user.index()].challenge,
        }
    }

    pub fn user_parameter(&self, slot: UserSlot) -> &[u8; USER_PARAMETER_SIZE] {
        &self.user[slot.index()].parameter
    }

    /**
        Every key role by name, in key-file order.
    */
    pub fn roles(&self) -> Vec<(String, &[u8])> {
        let mut roles: Vec<(String, &[u8])> = Vec::new();
        for (name, pair) in [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("tertiary", &self.tertiary),
        ] {
            roles.push((format!("{name}.key1"), &pair.key1));
            roles.push((format!("{name}.key2"), &pair.key2));
        }
        for slot in UserSlot::ALL {
            let user = &self.user[slot.index()];
            roles.push((format!("user[{slot}].key1"), &user.challenge.key1));
            roles.push((format!("user[{slot}].key2"), &user.challenge.key2));
            roles.push((format!("user[{slot}].parameter"), &user.parameter));
        }
        roles.extend([
            ("nonce_iv".to_string(), &self.nonce_iv[..]),
            (
                "session_derivation_key_1".to_string(),
                &self.session_derivation_key_1[..],
            ),
            (
                "session_derivation_key_2".to_string(),
                &self.session_derivation_key_2[..],
            ),
            ("command_iv".to_string(), &self.command_iv[..]),
            ("argument_iv".to_string(), &self.argument_iv[..]),
            ("debug_disc_marker".to_string(), &self.debug_disc_marker[..]),
            ("debug_contents_key".to_string(), &self.debug_contents_key[..]),
            ("contents_key".to_string(), &self.contents_key[..]),
            ("contents_iv".to_string(), &self.contents_iv[..]),
            ("watermark_key".to_string(), &self.watermark_key[..]),
            ("disc_id_key".to_string(), &self.disc_id_key[..]),
            ("disc_id_iv".to_string(), &self.disc_id_iv[..]),
        ]);
        roles
    }
}
