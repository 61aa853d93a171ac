#[cfg(target_os = "linux")]
mod auth;
mod keys;
mod stage;

#[cfg(target_os = "linux")]
pub use self::auth::AuthCommand;
pub use self::keys::KeysCommand;
