use core::fmt;

use drive_core::{AuthRole, ChallengeSlot, KeyStore};

use crate::codec;
use crate::crypto;
use crate::error::{AuthError, AuthResult};
use crate::kdf::derive_session_keys;
use crate::session::{AuthSession, RetryPolicy};
use crate::transport::{Transport, submit};

/**
    One step of the super-authentication fallback.

    Drive firmware generations expect different fixed key pairs, so the pairs
    are tried in this order. Only a retryable nonce-echo mismatch moves to
    the next tier; the last tier never allows a retry.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Primary,
    Secondary,
    Tertiary,
}

impl Tier {
    pub const CASCADE: [Self; 3] = [Self::Primary, Self::Secondary, Self::Tertiary];

    pub const fn slot(self) -> ChallengeSlot {
        match self {
            Self::Primary => ChallengeSlot::Primary,
            Self::Secondary => ChallengeSlot::Secondary,
            Self::Tertiary => ChallengeSlot::Tertiary,
        }
    }

    /**
        Retry policy for this tier. The first tier follows the session's
        configured policy.
    */
    pub const fn retry_policy(self, configured: RetryPolicy) -> RetryPolicy {
        match self {
            Self::Primary => configured,
            Self::Secondary => RetryPolicy::AllowRetry,
            Self::Tertiary => RetryPolicy::NoRetry,
        }
    }

    pub const fn to_name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

/**
    Drives the authentication exchange and the disc-data commands over a
    transport, with keys from a loaded key store.

    Session state lives in the [`AuthSession`] passed to each call, so one
    engine can serve any number of sequential sessions.
*/
pub struct Engine<'k, T> {
    pub(crate) keys: &'k KeyStore,
    pub(crate) transport: T,
}

impl<'k, T: Transport> Engine<'k, T> {
    pub fn new(keys: &'k KeyStore, transport: T) -> Self {
        Self { keys, transport }
    }

    /**
        Three-round nonce exchange with the challenge pair already installed
        in `session`.

        On success the session holds fresh session keys. A nonce-echo
        mismatch is reported as retryable only under
        [`RetryPolicy::AllowRetry`].
    */
    pub fn run_challenge_response(
        &mut self,
        session: &mut AuthSession,
        auth_role: AuthRole,
        retry_policy: RetryPolicy,
    ) -> AuthResult<()> {
        session.begin_attempt(auth_role);
        if session.challenge.is_uninitialized() {
            return Err(AuthError::KeyMaterialUninitialized);
        }
        let pair = session.challenge;

        // Round 0: host challenge
        session.host_nonce = crypto::random_block();
        tracing::debug!(role = %auth_role, "send challenge");
        let frame = codec::send_challenge(self.keys, &pair, auth_role, &session.host_nonce)?;
        submit(&mut self.transport, &frame)?;

        // Round 1: echo and counter-challenge
        tracing::debug!(role = %auth_role, "report challenge");
        let frame = codec::report_challenge(auth_role)?;
        let data = submit(&mut self.transport, &frame)?;
        let report = codec::parse_report(self.keys, &pair, &data)?;

        if report.echo != session.host_nonce {
            tracing::warn!(role = %auth_role, %retry_policy, "drive did not echo the host nonce");
            return Err(AuthError::NonceEchoMismatch {
                retryable: retry_policy.allows_retry(),
            });
        }
        if report.drive_nonce == session.host_nonce {
            tracing::warn!(role = %auth_role, "drive nonce equals host nonce");
            return Err(AuthError::NonceCollision);
        }
        session.drive_nonce = report.drive_nonce;

        // Round 2: answer the drive's challenge
        tracing::debug!(role = %auth_role, "send confirm");
        let frame = codec::send_confirm(self.keys, &pair, auth_role, &session.drive_nonce)?;
        submit(&mut self.transport, &frame)?;

        let keys = derive_session_keys(self.keys, &session.host_nonce, &session.drive_nonce)?;
        tracing::trace!(
            key1 = %drive_core::hex_dump(&keys.key1),
            key2 = %drive_core::hex_dump(&keys.key2),
            "session keys"
        );
        session.keys = Some(keys);
        Ok(())
    }

    /**
        Super authentication over the fixed-key cascade.

        Returns the tier whose key pair the drive accepted. Any failure other
        than a retryable echo mismatch ends the cascade at once.
    */
    pub fn authenticate_as_super(&mut self, session: &mut AuthSession) -> AuthResult<Tier> {
        let [fallbacks @ .., last] = Tier::CASCADE;
        for tier in fallbacks {
            match self.attempt_super(session, tier) {
                Ok(()) => return Ok(tier),
                Err(e) if e.is_retryable() => {
                    tracing::warn!(%tier, error = %e, "falling back to next key pair");
                }
                Err(e) => return Err(e),
            }
        }
        self.attempt_super(session, last)?;
        Ok(last)
    }

    fn attempt_super(&mut self, session: &mut AuthSession, tier: Tier) -> AuthResult<()> {
        session.set_challenge(*self.keys.challenge_pair(tier.slot()));
        let policy = tier.retry_policy(session.retry_policy);

        self.run_challenge_response(session, AuthRole::Super, policy)?;
        tracing::info!(%tier, "super authentication succeeded");
        Ok(())
    }

    /**
        User authentication with the pair selected by the session's role mode.
        Runs once and never retries.
    */
    pub fn authenticate_as_user(&mut self, session: &mut AuthSession) -> AuthResult<()> {
        let slot = session
            .role_mode
            .user_slot()
            .ok_or(AuthError::InvalidRoleOrMode(session.role_mode.value()))?;
        session.set_challenge(*self.keys.challenge_pair(ChallengeSlot::User(slot)));

        self.run_challenge_response(session, AuthRole::User, RetryPolicy::NoRetry)?;
        tracing::info!(mode = %session.role_mode, %slot, "user authentication succeeded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_core::{ChallengeKeyPair, RoleMode};

    use crate::error::TransportError;
    use crate::testing::{FakeDrive, test_keys};

    fn unknown_pair() -> ChallengeKeyPair {
        ChallengeKeyPair {
            key1: [0xE1; 16],
            key2: [0xE2; 16],
        }
    }

    #[test]
    fn tier_table() {
        assert_eq!(
            Tier::CASCADE,
            [Tier::Primary, Tier::Secondary, Tier::Tertiary]
        );
        assert_eq!(
            Tier::Primary.retry_policy(RetryPolicy::NoRetry),
            RetryPolicy::NoRetry
        );
        assert_eq!(
            Tier::Secondary.retry_policy(RetryPolicy::NoRetry),
            RetryPolicy::AllowRetry
        );
        assert_eq!(
            Tier::Tertiary.retry_policy(RetryPolicy::AllowRetry),
            RetryPolicy::NoRetry
        );
    }

    #[test]
    fn exchange_derives_session_keys() {
        let keys = test_keys();
        let mut drive = FakeDrive::new(&keys, keys.primary);
        let mut session = AuthSession::new(RoleMode::PS3_DISC);

        let mut engine = Engine::new(&keys, &mut drive);
        assert_eq!(engine.authenticate_as_super(&mut session).unwrap(), Tier::Primary);

        let expected =
            derive_session_keys(&keys, session.host_nonce(), session.drive_nonce()).unwrap();
        assert_eq!(session.session_keys().unwrap(), &expected);
        assert_eq!(drive.session_keys(), Some(expected));
        assert_eq!(drive.challenges, 1);
    }

    #[test]
    fn cascade_reaches_tertiary() {
        let keys = test_keys();
        let mut drive = FakeDrive::new(&keys, keys.tertiary);
        let mut session = AuthSession::new(RoleMode::DRIVE_AUTH);

        let tier = Engine::new(&keys, &mut drive)
            .authenticate_as_super(&mut session)
            .unwrap();
        assert_eq!(tier, Tier::Tertiary);
        assert_eq!(session.challenge(), &keys.tertiary);
        assert!(session.is_established());
        assert_eq!(drive.challenges, 3);
    }

    #[test]
    fn cascade_stops_after_tertiary() {
        let keys = test_keys();
        let mut drive = FakeDrive::new(&keys, unknown_pair());
        let mut session = AuthSession::new(RoleMode::DRIVE_AUTH);

        let err = Engine::new(&keys, &mut drive)
            .authenticate_as_super(&mut session)
            .unwrap_err();
        assert_eq!(err, AuthError::NonceEchoMismatch { retryable: false });
        assert_eq!(drive.challenges, 3);
        assert_eq!(session.challenge(), &keys.tertiary);
        assert!(!session.is_established());
    }

    #[test]
    fn no_retry_stops_at_primary() {
        let keys = test_keys();
        let mut drive = FakeDrive::new(&keys, keys.secondary);
        let mut session =
            AuthSession::new(RoleMode::DRIVE_AUTH).with_retry_policy(RetryPolicy::NoRetry);

        let err = Engine::new(&keys, &mut drive)
            .authenticate_as_super(&mut session)
            .unwrap_err();
        assert_eq!(err, AuthError::NonceEchoMismatch { retryable: false });
        assert_eq!(drive.challenges, 1);
    }

    #[test]
    fn collision_is_terminal() {
        let keys = test_keys();
        let mut drive = FakeDrive::new(&keys, keys.primary);
        drive.collide = true;
        let mut session = AuthSession::new(RoleMode::DRIVE_AUTH);

        let err = Engine::new(&keys, &mut drive)
            .authenticate_as_super(&mut session)
            .unwrap_err();
        assert_eq!(err, AuthError::NonceCollision);
        assert_eq!(drive.challenges, 1);
    }

    #[test]
    fn transport_failure_ends_the_cascade() {
        let keys = test_keys();
        let mut drive = FakeDrive::new(&keys, keys.secondary);
        drive.fail_report = Some(TransportError::DeviceStatus {
            status: 0x02,
            host_status: 0,
            driver_status: 0x08,
        });
        let mut session = AuthSession::new(RoleMode::DRIVE_AUTH);

        let err = Engine::new(&keys, &mut drive)
            .authenticate_as_super(&mut session)
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::Transport(TransportError::DeviceStatus {
                status: 0x02,
                host_status: 0,
                driver_status: 0x08,
            })
        );
        assert_eq!(drive.challenges, 1);
        assert_eq!(session.challenge(), &keys.primary);
        assert!(session.keys.is_none());
    }

    #[test]
    fn zeroed_pair_is_rejected_before_sending() {
        let mut keys = test_keys();
        keys.primary.key2 = [0; 16];
        let mut drive = FakeDrive::new(&keys, keys.secondary);
        let mut session = AuthSession::new(RoleMode::DRIVE_AUTH);

        let err = Engine::new(&keys, &mut drive)
            .authenticate_as_super(&mut session)
            .unwrap_err();
        assert_eq!(err, AuthError::KeyMaterialUninitialized);
        assert_eq!(drive.challenges, 0);
    }

    #[test]
    fn user_authentication_uses_mode_pair() {
        let keys = test_keys();
        let mut drive = FakeDrive::new(&keys, keys.primary);
        drive.user_pair = keys.user[3].challenge;
        let mut session = AuthSession::new(RoleMode::PS3_DISC);

        let mut engine = Engine::new(&keys, &mut drive);
        engine.authenticate_as_super(&mut session).unwrap();
        let super_keys = *session.session_keys().unwrap();
        engine.authenticate_as_user(&mut session).unwrap();

        assert_eq!(session.auth_role, AuthRole::User);
        assert_eq!(session.challenge(), &keys.user[3].challenge);
        assert_ne!(session.session_keys().unwrap(), &super_keys);
    }

    #[test]
    fn user_authentication_never_retries() {
        let keys = test_keys();
        let mut drive = FakeDrive::new(&keys, keys.primary);
        drive.user_pair = keys.user[0].challenge;
        let mut session = AuthSession::new(RoleMode(1));

        let mut engine = Engine::new(&keys, &mut drive);
        engine.authenticate_as_super(&mut session).unwrap();
        assert_eq!(
            engine.authenticate_as_user(&mut session).unwrap_err(),
            AuthError::NonceEchoMismatch { retryable: false }
        );
    }

    #[test]
    fn unmapped_mode_is_rejected() {
        let keys = test_keys();
        let mut drive = FakeDrive::new(&keys, keys.primary);
        let mut session = AuthSession::new(RoleMode::DRIVE_AUTH);

        let err = Engine::new(&keys, &mut drive)
            .authenticate_as_user(&mut session)
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidRoleOrMode(0x46));
        assert_eq!(drive.challenges, 0);
    }
}
