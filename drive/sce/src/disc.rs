/*!
    Disc-data commands, run after authentication with the session keys.
*/

use drive_core::{DiscMode, Key128, KeyStore};
use drive_sce_format::cdb::{DiscAddress, SecureCdb, SecureCommand};
use drive_sce_format::commands::{GET_VERSION_LEN, PS2_WATERMARK_LEN, PS3_WATERMARK_LEN};
use drive_sce_format::frame::FrameKind;

use crate::codec;
use crate::crypto::aes;
use crate::engine::Engine;
use crate::error::{AuthError, AuthResult};
use crate::session::{AuthSession, SessionKeys};
use crate::transport::{Transport, submit};

pub const VERSION_LEN: usize = 0x40;
pub const WM2_DATA_LEN: usize = 0x30;
pub const PS3_AUTH_DATA_LEN: usize = 0x30;
pub const PS2_AUTH_DATA_LEN: usize = 0x40;

const WM3_CONTENTS_OFFSET: usize = 0x03;
const WM3_MISC_OFFSET: usize = 0x13;
const WM2_MODE_OFFSET: usize = 0x02;
const WM2_FIELDS: [usize; 3] = [0x03, 0x13, 0x23];
const DISC_ID_OFFSET: usize = 0x0B;
const DISC_ID_LEN: usize = 5;

/**
    Result of the PS3 disc watermark query.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark3 {
    pub contents_key: Key128,
    pub misc_wm: Key128,
    pub disc_mode: DiscMode,
}

/**
    Result of the PS2 disc watermark query.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark2 {
    pub mode: u8,
    pub data: [u8; WM2_DATA_LEN],
}

impl<T: Transport> Engine<'_, T> {
    /**
        Send the user parameter block of the session's role mode.
    */
    pub fn set_user_parameter(&mut self, session: &AuthSession) -> AuthResult<()> {
        let slot = session
            .role_mode
            .user_slot()
            .ok_or(AuthError::InvalidRoleOrMode(session.role_mode.value()))?;
        let keys = session.session_keys()?;

        tracing::debug!(mode = %session.role_mode, %slot, "set user parameter");
        let frame = codec::user_data(self.keys, keys, self.keys.user_parameter(slot))?;
        submit(&mut self.transport, &frame)?;
        Ok(())
    }

    /**
        Drive version block, 0x40 bytes.
    */
    pub fn get_version(&mut self, session: &AuthSession) -> AuthResult<[u8; VERSION_LEN]> {
        let keys = session.session_keys()?;
        let body: [u8; GET_VERSION_LEN] = self.secure_report(
            keys,
            FrameKind::GET_VERSION,
            &SecureCdb::new(SecureCommand::GetVersion),
        )?;

        let mut version = [0u8; VERSION_LEN];
        version.copy_from_slice(&body[2..2 + VERSION_LEN]);
        Ok(version)
    }

    /**
        PS3 disc watermark: contents key, misc watermark and release/debug flag.
    */
    pub fn get_wm3(&mut self, session: &AuthSession) -> AuthResult<Watermark3> {
        let keys = session.session_keys()?;
        let mut body: [u8; PS3_WATERMARK_LEN] = self.secure_report(
            keys,
            FrameKind::PS3_WATERMARK,
            &SecureCdb::new(SecureCommand::Ps3Disc),
        )?;

        for offset in [WM3_CONTENTS_OFFSET, WM3_MISC_OFFSET] {
            aes::cbc_decrypt(&keys.key2, &self.keys.argument_iv, &mut body[offset..offset + 16])?;
        }

        let (contents_key, disc_mode) =
            contents_key(self.keys, &block_at(&body, WM3_CONTENTS_OFFSET))?;
        let misc_wm = aes::decrypt_block(
            &self.keys.watermark_key,
            &self.keys.nonce_iv,
            &block_at(&body, WM3_MISC_OFFSET),
        )?;

        tracing::info!(%disc_mode, "PS3 watermark read");
        Ok(Watermark3 {
            contents_key,
            misc_wm,
            disc_mode,
        })
    }

    /**
        Disc ID from a misc watermark.
    */
    pub fn get_disc_id(&self, misc_wm: &Key128) -> AuthResult<Key128> {
        disc_id(self.keys, misc_wm)
    }

    /**
        PS2 disc watermark for one sector. Each field carries two layers under
        the session-key-1 envelope: session key 2, then the fixed watermark key.
    */
    pub fn get_wm2(
        &mut self,
        session: &AuthSession,
        address: DiscAddress,
    ) -> AuthResult<Watermark2> {
        let keys = session.session_keys()?;
        tracing::debug!(
            layer = address.layer,
            area = address.area,
            lba = address.lba,
            "PS2 watermark"
        );
        let mut body: [u8; PS2_WATERMARK_LEN] =
            self.secure_report(keys, FrameKind::PS2_WATERMARK, &SecureCdb::ps2_disc(address))?;

        for offset in WM2_FIELDS {
            aes::cbc_decrypt(&keys.key2, &self.keys.argument_iv, &mut body[offset..offset + 16])?;
        }
        for offset in WM2_FIELDS {
            aes::cbc_decrypt(
                &self.keys.watermark_key,
                &self.keys.nonce_iv,
                &mut body[offset..offset + 16],
            )?;
        }

        let mut data = [0u8; WM2_DATA_LEN];
        data.copy_from_slice(&body[WM2_FIELDS[0]..WM2_FIELDS[0] + WM2_DATA_LEN]);
        Ok(Watermark2 {
            mode: body[WM2_MODE_OFFSET],
            data,
        })
    }

    fn secure_report<const N: usize>(
        &mut self,
        keys: &SessionKeys,
        kind: FrameKind,
        cdb: &SecureCdb,
    ) -> AuthResult<[u8; N]> {
        let frame = codec::secure_report(self.keys, keys, kind, cdb, N)?;
        let data = submit(&mut self.transport, &frame)?;
        codec::open_secure_response(self.keys, keys, &data).inspect_err(|e| {
            tracing::warn!(command = ?cdb.command, error = %e, "secure response rejected");
        })
    }
}

fn block_at(body: &[u8], offset: usize) -> Key128 {
    let mut block = [0u8; 16];
    block.copy_from_slice(&body[offset..offset + 16]);
    block
}

/**
    The debug marker maps to the fixed debug key; anything else is encrypted
    with the contents key.
*/
pub fn contents_key(keys: &KeyStore, field: &Key128) -> AuthResult<(Key128, DiscMode)> {
    if *field == keys.debug_disc_marker {
        return Ok((keys.debug_contents_key, DiscMode::Debug));
    }
    let key = aes::encrypt_block(&keys.contents_key, &keys.contents_iv, field)?;
    Ok((key, DiscMode::Release))
}

/**
    Five bytes at 0x0B of the misc watermark, in place in a zero block,
    encrypted with the disc-ID key.
*/
pub fn disc_id(keys: &KeyStore, misc_wm: &Key128) -> AuthResult<Key128> {
    let mut block = [0u8; 16];
    block[DISC_ID_OFFSET..DISC_ID_OFFSET + DISC_ID_LEN]
        .copy_from_slice(&misc_wm[DISC_ID_OFFSET..DISC_ID_OFFSET + DISC_ID_LEN]);
    aes::encrypt_block(&keys.disc_id_key, &keys.disc_id_iv, &block)
}

/**
    PS3 auth data block:
      [0x00..0x10]  disc ID
      [0x10..0x18]  disc mode (u64 little-endian)
      [0x18..0x20]  zero
      [0x20..0x30]  session key 1
*/
pub fn ps3_auth_data(
    disc_id: &Key128,
    disc_mode: DiscMode,
    session: &SessionKeys,
) -> [u8; PS3_AUTH_DATA_LEN] {
    let mut out = [0u8; PS3_AUTH_DATA_LEN];
    out[..0x10].copy_from_slice(disc_id);
    out[0x10..0x18].copy_from_slice(&disc_mode.to_u64().to_le_bytes());
    out[0x20..].copy_from_slice(&session.key1);
    out
}

/**
    PS2 auth data block: mode byte, seven zero bytes, the 0x30 data bytes, eight zero bytes.
*/
pub fn ps2_auth_data(wm: &Watermark2) -> [u8; PS2_AUTH_DATA_LEN] {
    let mut out = [0u8; PS2_AUTH_DATA_LEN];
    out[0] = wm.mode;
    out[0x08..0x08 + WM2_DATA_LEN].copy_from_slice(&wm.data);
    out
}
