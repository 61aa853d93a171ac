/*!
    Encrypting frame builders and decrypting response parsers.

    Wraps the plain layouts of `drive-sce-format` with the cipher layers:
    nonces under the challenge-key pair, secure descriptors under 3DES with
    session key 1, argument blocks and secure responses under AES with
    session key 1.
*/

use drive_core::{AuthRole, ChallengeKeyPair, Key128, KeyStore, USER_PARAMETER_SIZE};
use drive_sce_format::argument::{ARGUMENT_BLOCK_SIZE, seal_argument};
use drive_sce_format::cdb::{SecureCdb, SecureCommand};
use drive_sce_format::check_code;
use drive_sce_format::commands;
use drive_sce_format::frame::{CommandFrame, FrameKind};
use drive_sce_format::response::ResponseFrame;

use crate::crypto::{self, aes, des};
use crate::error::AuthResult;
use crate::session::SessionKeys;

/**
    Decrypted contents of the report round.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeReport {
    /// The drive's copy of the host nonce.
    pub echo: Key128,
    pub drive_nonce: Key128,
}

pub fn send_challenge(
    keys: &KeyStore,
    pair: &ChallengeKeyPair,
    role: AuthRole,
    host_nonce: &Key128,
) -> AuthResult<CommandFrame> {
    let encrypted = aes::encrypt_block(&pair.key1, &keys.nonce_iv, host_nonce)?;
    Ok(commands::send_challenge(role, &encrypted)?)
}

pub fn report_challenge(role: AuthRole) -> AuthResult<CommandFrame> {
    Ok(commands::report_challenge(role)?)
}

/**
    Decrypt the echoed host nonce (body 0x00) and the drive nonce (body 0x10).
*/
pub fn parse_report(
    keys: &KeyStore,
    pair: &ChallengeKeyPair,
    data: &[u8],
) -> AuthResult<ChallengeReport> {
    let response = ResponseFrame::parse(data)?;
    let echo = aes::decrypt_block(&pair.key2, &keys.nonce_iv, &response.block(0x00)?)?;
    let drive_nonce = aes::decrypt_block(&pair.key2, &keys.nonce_iv, &response.block(0x10)?)?;
    Ok(ChallengeReport { echo, drive_nonce })
}

pub fn send_confirm(
    keys: &KeyStore,
    pair: &ChallengeKeyPair,
    role: AuthRole,
    drive_nonce: &Key128,
) -> AuthResult<CommandFrame> {
    let encrypted = aes::encrypt_block(&pair.key1, &keys.nonce_iv, drive_nonce)?;
    Ok(commands::send_confirm(role, &encrypted)?)
}

/**
    Serialize a secure descriptor with a random pad and encrypt it.
*/
pub fn encrypt_descriptor(
    keys: &KeyStore,
    session: &SessionKeys,
    cdb: &SecureCdb,
) -> AuthResult<[u8; SecureCdb::SIZE]> {
    let mut bytes = cdb.encode(crypto::random_byte());
    des::cbc_encrypt(&session.key1, &keys.command_iv, &mut bytes)?;
    Ok(bytes)
}

pub fn user_data(
    keys: &KeyStore,
    session: &SessionKeys,
    parameter: &[u8; USER_PARAMETER_SIZE],
) -> AuthResult<CommandFrame> {
    let descriptor = encrypt_descriptor(keys, session, &SecureCdb::new(SecureCommand::UserData))?;

    let mut argument: [u8; ARGUMENT_BLOCK_SIZE] =
        seal_argument(parameter, crypto::random_byte())?;
    aes::cbc_encrypt(&session.key1, &keys.argument_iv, &mut argument)?;

    Ok(commands::user_data(&descriptor, &argument)?)
}

pub fn secure_report(
    keys: &KeyStore,
    session: &SessionKeys,
    kind: FrameKind,
    cdb: &SecureCdb,
    body_len: usize,
) -> AuthResult<CommandFrame> {
    let descriptor = encrypt_descriptor(keys, session, cdb)?;
    Ok(commands::secure_report(kind, &descriptor, body_len)?)
}

/**
    Strip the session-key-1 layer off a secure response body and check its
    leading check code.
*/
pub fn open_secure_response<const N: usize>(
    keys: &KeyStore,
    session: &SessionKeys,
    data: &[u8],
) -> AuthResult<[u8; N]> {
    let response = ResponseFrame::parse(data)?;
    let mut body: [u8; N] = response.block(0)?;
    aes::cbc_decrypt(&session.key1, &keys.argument_iv, &mut body)?;
    check_code::validate(&body)?;
    Ok(body)
}
