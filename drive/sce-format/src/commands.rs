/*!
    Frame builders for each command of the exchange.

    Callers supply already-encrypted fields; these functions only place them.
*/

use drive_core::{AuthRole, Key128};

use crate::argument::ARGUMENT_BLOCK_SIZE;
use crate::cdb::{KeyCdb, PlainCdb, SceFunction, SecureCdb, secure_region};
use crate::error::FormatResult;
use crate::frame::{CommandFrame, FrameKind};
use crate::opcodes::{SECURE_REPORT, SECURE_SEND};
use crate::response::{DATA_HEADER_SIZE, data_header};

/**
    Body length of the report round: echoed host nonce, then drive nonce.
*/
pub const REPORT_CHALLENGE_LEN: usize = 0x20;
pub const GET_VERSION_LEN: usize = 0x50;
pub const PS3_WATERMARK_LEN: usize = 0x30;
pub const PS2_WATERMARK_LEN: usize = 0x40;

/**
    SEND KEY carrying one encrypted 16-byte nonce.
*/
fn send_key(
    kind: FrameKind,
    function: SceFunction,
    encrypted_nonce: &Key128,
) -> FormatResult<CommandFrame> {
    let mut data = Vec::with_capacity(DATA_HEADER_SIZE + encrypted_nonce.len());
    data.extend_from_slice(&data_header(encrypted_nonce.len() as u16));
    data.extend_from_slice(encrypted_nonce);

    let cdb = KeyCdb::send_key(data.len() as u16, function);
    CommandFrame::new(kind, cdb.to_region(), data)
}

/**
    Round 0: the host's encrypted nonce.
*/
pub fn send_challenge(role: AuthRole, encrypted_nonce: &Key128) -> FormatResult<CommandFrame> {
    send_key(
        FrameKind::SEND_CHALLENGE,
        SceFunction::challenge(role),
        encrypted_nonce,
    )
}

/**
    Round 1: ask the drive for its echo and counter-challenge.
*/
pub fn report_challenge(role: AuthRole) -> FormatResult<CommandFrame> {
    let mut data = vec![0u8; DATA_HEADER_SIZE + REPORT_CHALLENGE_LEN];
    data[..DATA_HEADER_SIZE].copy_from_slice(&data_header(REPORT_CHALLENGE_LEN as u16));

    let cdb = KeyCdb::report_key(data.len() as u16, SceFunction::challenge(role));
    CommandFrame::new(FrameKind::REPORT_CHALLENGE, cdb.to_region(), data)
}

/**
    Round 2: the drive's nonce, encrypted back to it.
*/
pub fn send_confirm(role: AuthRole, encrypted_nonce: &Key128) -> FormatResult<CommandFrame> {
    send_key(
        FrameKind::SEND_CONFIRM,
        SceFunction::confirm(role),
        encrypted_nonce,
    )
}

/**
    SECURE SEND of the encrypted user parameter block.
*/
pub fn user_data(
    encrypted_cdb: &[u8; SecureCdb::SIZE],
    encrypted_argument: &[u8; ARGUMENT_BLOCK_SIZE],
) -> FormatResult<CommandFrame> {
    let mut data = Vec::with_capacity(DATA_HEADER_SIZE + ARGUMENT_BLOCK_SIZE);
    data.extend_from_slice(&data_header(ARGUMENT_BLOCK_SIZE as u16));
    data.extend_from_slice(encrypted_argument);

    let plain = PlainCdb {
        opcode: SECURE_SEND,
        arg_len: data.len() as u8,
    };
    CommandFrame::new(
        FrameKind::USER_DATA,
        secure_region(plain, encrypted_cdb),
        data,
    )
}

/**
    SECURE REPORT expecting `body_len` bytes back.
*/
pub fn secure_report(
    kind: FrameKind,
    encrypted_cdb: &[u8; SecureCdb::SIZE],
    body_len: usize,
) -> FormatResult<CommandFrame> {
    let data = vec![0u8; DATA_HEADER_SIZE + body_len];
    let plain = PlainCdb {
        opcode: SECURE_REPORT,
        arg_len: data.len() as u8,
    };
    CommandFrame::new(kind, secure_region(plain, encrypted_cdb), data)
}
