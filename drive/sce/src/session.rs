use core::fmt;

use drive_core::{AuthRole, ChallengeKeyPair, Key128, RoleMode};

use crate::error::{AuthError, AuthResult};

/**
    Whether a nonce-echo mismatch may be answered with the next key pair.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RetryPolicy {
    #[default]
    AllowRetry,
    NoRetry,
}

impl RetryPolicy {
    pub const fn allows_retry(self) -> bool {
        matches!(self, Self::AllowRetry)
    }

    pub const fn to_name(self) -> &'static str {
        match self {
            Self::AllowRetry => "allow-retry",
            Self::NoRetry => "no-retry",
        }
    }
}

impl fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

/**
    The two keys derived from a completed nonce exchange.
*/
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SessionKeys {
    pub key1: Key128,
    pub key2: Key128,
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

/**
    State of one authentication with one drive.

    Created zeroed, filled in as each round completes. Disc-data operations
    read the session keys and fail until a full exchange has succeeded.
*/
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub role_mode: RoleMode,
    pub auth_role: AuthRole,
    /// Policy for the first tier of super authentication.
    pub retry_policy: RetryPolicy,
    pub(crate) challenge: ChallengeKeyPair,
    pub(crate) host_nonce: Key128,
    pub(crate) drive_nonce: Key128,
    pub(crate) keys: Option<SessionKeys>,
}

impl AuthSession {
    pub fn new(role_mode: RoleMode) -> Self {
        Self {
            role_mode,
            auth_role: AuthRole::Super,
            retry_policy: RetryPolicy::default(),
            challenge: ChallengeKeyPair::ZERO,
            host_nonce: [0; 16],
            drive_nonce: [0; 16],
            keys: None,
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /**
        Challenge-key pair of the most recent attempt.
    */
    pub fn challenge(&self) -> &ChallengeKeyPair {
        &self.challenge
    }

    pub fn host_nonce(&self) -> &Key128 {
        &self.host_nonce
    }

    pub fn drive_nonce(&self) -> &Key128 {
        &self.drive_nonce
    }

    pub fn is_established(&self) -> bool {
        self.keys.is_some()
    }

    /**
        Session keys of the last successful exchange.
    */
    pub fn session_keys(&self) -> AuthResult<&SessionKeys> {
        self.keys.as_ref().ok_or(AuthError::SessionNotEstablished)
    }

    /**
        Install the challenge-key pair for the next exchange.
    */
    pub fn set_challenge(&mut self, challenge: ChallengeKeyPair) {
        self.challenge = challenge;
    }

    /**
        Forget the previous attempt before starting a new one.
    */
    pub(crate) fn begin_attempt(&mut self, auth_role: AuthRole) {
        self.auth_role = auth_role;
        self.host_nonce = [0; 16];
        self.drive_nonce = [0; 16];
        self.keys = None;
    }
}
