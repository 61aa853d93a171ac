/*!
    Host side of the drive's mutual challenge-response authentication.

    [`Engine::authenticate_as_super`] runs the nonce exchange over the
    fixed-key cascade, [`Engine::authenticate_as_user`] repeats it with the
    pair of the session's role mode, and the disc-data methods
    ([`Engine::get_wm3`], [`Engine::get_wm2`], ...) use the derived session
    keys to read watermark and version material.
*/

mod codec;
mod disc;
mod engine;
mod error;
mod kdf;
mod session;
mod transport;

pub mod crypto;

#[cfg(target_os = "linux")]
pub mod sg;

#[cfg(test)]
mod testing;

pub mod format {
    pub use drive_sce_format::*;
}

// Re-export shared types from drive-core
pub use drive_core::{
    AuthRole, ChallengeKeyPair, ChallengeSlot, DiscMode, Key128, KeyStore, RoleMode, UserSlot,
};

pub use drive_sce_format::cdb::DiscAddress;

pub use self::codec::ChallengeReport;
pub use self::disc::{
    PS2_AUTH_DATA_LEN, PS3_AUTH_DATA_LEN, VERSION_LEN, WM2_DATA_LEN, Watermark2, Watermark3,
    contents_key, disc_id, ps2_auth_data, ps3_auth_data,
};
pub use self::engine::{Engine, Tier};
pub use self::error::{AuthError, AuthResult, TransportError};
pub use self::kdf::derive_session_keys;
pub use self::session::{AuthSession, RetryPolicy, SessionKeys};
pub use self::transport::{Transport, submit};

#[cfg(target_os = "linux")]
pub use self::sg::SgTransport;
