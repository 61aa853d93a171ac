/*!
    Test doubles: a key store with distinct non-zero values and a fake drive
    that implements the drive side of the exchange.
*/

use drive_core::{ChallengeKeyPair, Key128, KeyStore, USER_PARAMETER_SIZE, UserModeKeys};
use drive_sce_format::argument::open_argument;
use drive_sce_format::cdb::{
    DiscAddress, KeyCdb, SceFunction, SecureCdb, SecureCommand, split_secure_region,
};
use drive_sce_format::check_code;
use drive_sce_format::opcodes::{Direction, REPORT_KEY, SECURE_REPORT, SECURE_SEND, SEND_KEY};
use drive_sce_format::response::data_header;

use crate::crypto::{aes, des, random_block};
use crate::disc::{VERSION_LEN, WM2_DATA_LEN};
use crate::error::TransportError;
use crate::kdf::derive_session_keys;
use crate::session::SessionKeys;
use crate::transport::Transport;

fn block(tag: u8) -> Key128 {
    core::array::from_fn(|i| tag.wrapping_add((i as u8).wrapping_mul(0x11)))
}

fn pair(tag: u8) -> ChallengeKeyPair {
    ChallengeKeyPair {
        key1: block(tag),
        key2: block(tag.wrapping_add(1)),
    }
}

/**
    Every role gets its own value so a mixed-up key shows up as a failure.
*/
pub(crate) fn test_keys() -> KeyStore {
    let user = core::array::from_fn(|i| {
        let tag = 0x40 + (i as u8) * 4;
        UserModeKeys {
            challenge: pair(tag),
            parameter: core::array::from_fn(|j| tag ^ (j as u8)),
        }
    });
    KeyStore {
        primary: pair(0x10),
        secondary: pair(0x20),
        tertiary: pair(0x30),
        user,
        nonce_iv: block(0x71),
        session_derivation_key_1: block(0x72),
        session_derivation_key_2: block(0x73),
        command_iv: [0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7A, 0x7B],
        argument_iv: block(0x7C),
        debug_disc_marker: block(0x81),
        debug_contents_key: block(0x82),
        contents_key: block(0x83),
        contents_iv: block(0x84),
        watermark_key: block(0x85),
        disc_id_key: block(0x86),
        disc_id_iv: [0; 16],
    }
}

/**
    Drive side of the protocol.

    Knows one super pair and one user pair; a host using any other pair gets
    an echo that does not decrypt to its nonce.
*/
pub(crate) struct FakeDrive {
    keys: KeyStore,
    pub super_pair: ChallengeKeyPair,
    pub user_pair: ChallengeKeyPair,
    /// Answer with the host's own nonce as the drive nonce.
    pub collide: bool,
    pub corrupt_check_code: bool,
    /// Fail every report round with this error.
    pub fail_report: Option<TransportError>,

    pub version: [u8; VERSION_LEN],
    pub wm3_contents: Key128,
    pub wm3_misc: Key128,
    pub wm2_mode: u8,
    pub wm2_data: [u8; WM2_DATA_LEN],

    /// Opcodes received, in order.
    pub commands: Vec<u8>,
    /// Number of challenge frames received.
    pub challenges: usize,
    pub user_parameter: Option<[u8; USER_PARAMETER_SIZE]>,
    pub last_address: Option<DiscAddress>,

    pair: ChallengeKeyPair,
    host_nonce: Key128,
    drive_nonce: Key128,
    session: Option<SessionKeys>,
}

impl FakeDrive {
    pub fn new(keys: &KeyStore, super_pair: ChallengeKeyPair) -> Self {
        Self {
            keys: keys.clone(),
            super_pair,
            user_pair: ChallengeKeyPair {
                key1: [0xD1; 16],
                key2: [0xD2; 16],
            },
            collide: false,
            corrupt_check_code: false,
            fail_report: None,
            version: [0; VERSION_LEN],
            wm3_contents: block(0xA0),
            wm3_misc: block(0xB0),
            wm2_mode: 0,
            wm2_data: [0; WM2_DATA_LEN],
            commands: Vec::new(),
            challenges: 0,
            user_parameter: None,
            last_address: None,
            pair: ChallengeKeyPair::ZERO,
            host_nonce: [0; 16],
            drive_nonce: [0; 16],
            session: None,
        }
    }

    pub fn session_keys(&self) -> Option<SessionKeys> {
        self.session
    }

    fn session(&self) -> SessionKeys {
        self.session.expect("secure command before authentication")
    }

    fn send_key(&mut self, cdb: &KeyCdb, payload: &[u8]) {
        let encrypted: Key128 = payload[4..20].try_into().unwrap();
        match cdb.function {
            SceFunction::AuthSuperMode | SceFunction::AuthUserMode => {
                self.challenges += 1;
                self.session = None;
                self.pair = if cdb.function == SceFunction::AuthSuperMode {
                    self.super_pair
                } else {
                    self.user_pair
                };
                self.host_nonce =
                    aes::decrypt_block(&self.pair.key1, &self.keys.nonce_iv, &encrypted).unwrap();
            }
            SceFunction::HostChallenge | SceFunction::DriveChallenge => {
                let answer =
                    aes::decrypt_block(&self.pair.key1, &self.keys.nonce_iv, &encrypted).unwrap();
                assert_eq!(answer, self.drive_nonce, "host answered the wrong nonce");
                self.session = Some(
                    derive_session_keys(&self.keys, &self.host_nonce, &self.drive_nonce).unwrap(),
                );
            }
        }
    }

    fn report_key(&mut self, len: usize) -> Vec<u8> {
        self.drive_nonce = if self.collide {
            self.host_nonce
        } else {
            random_block()
        };
        let mut out = data_header(0x20).to_vec();
        for value in [self.host_nonce, self.drive_nonce] {
            out.extend(aes::encrypt_block(&self.pair.key2, &self.keys.nonce_iv, &value).unwrap());
        }
        out.resize(len, 0);
        out
    }

    fn descriptor(&self, cdb: &[u8]) -> SecureCdb {
        let (_, mut encrypted) = split_secure_region(cdb).unwrap();
        des::cbc_decrypt(&self.session().key1, &self.keys.command_iv, &mut encrypted).unwrap();
        SecureCdb::decode(&encrypted).unwrap()
    }

    fn secure_send(&mut self, cdb: &[u8], payload: &[u8]) {
        assert_eq!(self.descriptor(cdb).command, SecureCommand::UserData);
        let mut argument = payload[4..].to_vec();
        aes::cbc_decrypt(&self.session().key1, &self.keys.argument_iv, &mut argument).unwrap();
        let parameter = open_argument(&argument).unwrap();
        self.user_parameter = Some(parameter[..USER_PARAMETER_SIZE].try_into().unwrap());
    }

    /**
        Wrap a plaintext body: fill the check code, then encrypt with session key 1.
    */
    fn seal_body(&self, mut body: Vec<u8>, len: usize) -> Vec<u8> {
        check_code::seal(&mut body);
        if self.corrupt_check_code {
            body[0] ^= 0xFF;
        }
        aes::cbc_encrypt(&self.session().key1, &self.keys.argument_iv, &mut body).unwrap();
        let mut out = data_header(body.len() as u16).to_vec();
        out.extend(body);
        out.resize(len, 0);
        out
    }

    /**
        Apply session key 2 (and optionally the watermark key first) to a field.
    */
    fn wrap_field(&self, field: &Key128, watermark: bool) -> Key128 {
        let inner = if watermark {
            aes::encrypt_block(&self.keys.watermark_key, &self.keys.nonce_iv, field).unwrap()
        } else {
            *field
        };
        aes::encrypt_block(&self.session().key2, &self.keys.argument_iv, &inner).unwrap()
    }

    fn secure_report(&mut self, cdb: &[u8], len: usize) -> Vec<u8> {
        let descriptor = self.descriptor(cdb);
        match descriptor.command {
            SecureCommand::GetVersion => {
                let mut body = vec![0u8; 0x50];
                body[1] = 0x5E;
                body[2..2 + VERSION_LEN].copy_from_slice(&self.version);
                self.seal_body(body, len)
            }
            SecureCommand::Ps3Disc => {
                let mut body = vec![0u8; 0x30];
                body[1] = 0x01;
                body[2] = 0x02;
                body[0x03..0x13].copy_from_slice(&self.wrap_field(&self.wm3_contents, false));
                body[0x13..0x23].copy_from_slice(&self.wrap_field(&self.wm3_misc, true));
                body[0x23..].fill(0xEE);
                self.seal_body(body, len)
            }
            SecureCommand::Ps2Disc => {
                self.last_address = Some(DiscAddress::from_params(descriptor.params));
                let mut body = vec![0u8; 0x40];
                body[2] = self.wm2_mode;
                for (i, offset) in [0x03, 0x13, 0x23].into_iter().enumerate() {
                    let field: Key128 = self.wm2_data[i * 16..(i + 1) * 16].try_into().unwrap();
                    body[offset..offset + 16].copy_from_slice(&self.wrap_field(&field, true));
                }
                self.seal_body(body, len)
            }
            SecureCommand::UserData => panic!("user data sent as a report"),
        }
    }
}

impl Transport for FakeDrive {
    fn exchange(
        &mut self,
        opcode: u8,
        cdb: &[u8],
        direction: Direction,
        payload: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        self.commands.push(opcode);
        match (opcode, direction) {
            (SEND_KEY, Direction::ToDevice) => {
                let cdb = KeyCdb::from_bytes(cdb).unwrap();
                self.send_key(&cdb, payload);
                Ok(Vec::new())
            }
            (REPORT_KEY, Direction::FromDevice) => match &self.fail_report {
                Some(err) => Err(err.clone()),
                None => Ok(self.report_key(payload.len())),
            },
            (SECURE_SEND, Direction::ToDevice) => {
                self.secure_send(cdb, payload);
                Ok(Vec::new())
            }
            (SECURE_REPORT, Direction::FromDevice) => Ok(self.secure_report(cdb, payload.len())),
            _ => Err(TransportError::UnknownOpcode(opcode)),
        }
    }
}
