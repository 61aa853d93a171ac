mod error;
mod keys;
mod types;

pub mod utils;

pub use self::error::{KeyStoreError, KeyStoreResult, ParseError};
pub use self::keys::{
    ChallengeKeyPair, ChallengeSlot, KeyStore, USER_PARAMETER_SIZE, USER_SLOT_COUNT, UserModeKeys,
};
pub use self::types::{AuthRole, DiscMode, Key128, RoleMode, UserSlot};
pub use self::utils::hex_dump;
