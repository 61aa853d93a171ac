use drive_core::AuthRole;

use crate::check_code::{check_code, validate_trailing};
use crate::error::{FormatError, FormatResult};
use crate::opcodes::{REPORT_KEY, SEND_KEY};

/**
    Size of the CDB region inside a command frame.
*/
pub const CDB_REGION_SIZE: usize = 0x10;

/**
    Key class used by every SEND KEY / REPORT KEY in the exchange.
*/
pub const KEY_CLASS_SCE: u8 = 0xE0;

/**
    Function code carried in byte 10 of the key CDBs.
*/
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceFunction {
    AuthSuperMode = 0,
    AuthUserMode = 1,
    HostChallenge = 2,
    DriveChallenge = 3,
}

impl SceFunction {
    pub const fn from_u8(u: u8) -> Option<Self> {
        match u {
            0 => Some(Self::AuthSuperMode),
            1 => Some(Self::AuthUserMode),
            2 => Some(Self::HostChallenge),
            3 => Some(Self::DriveChallenge),
            _ => None,
        }
    }

    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /**
        Function for the challenge and report rounds.
    */
    pub const fn challenge(role: AuthRole) -> Self {
        match role {
            AuthRole::Super => Self::AuthSuperMode,
            AuthRole::User => Self::AuthUserMode,
        }
    }

    /**
        Function for the confirm round: in super mode the host answers as the
        challenger, in user mode the drive's challenge is being answered.
    */
    pub const fn confirm(role: AuthRole) -> Self {
        match role {
            AuthRole::Super => Self::HostChallenge,
            AuthRole::User => Self::DriveChallenge,
        }
    }
}

/**
    SEND KEY / REPORT KEY command descriptor.

    Layout (12 bytes, zero-extended to the 16-byte CDB region):
      [0]      operation code (0xA3 SEND KEY, 0xA4 REPORT KEY)
      [1..7]   reserved
      [7]      key class (0xE0)
      [8..10]  parameter list / allocation length (u16 big-endian)
      [10]     SCE function
      [11]     control
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCdb {
    pub opcode: u8,
    pub key_class: u8,
    pub length: u16,
    pub function: SceFunction,
}

impl KeyCdb {
    pub const SIZE: usize = 12;

    pub const fn send_key(length: u16, function: SceFunction) -> Self {
        Self {
            opcode: SEND_KEY,
            key_class: KEY_CLASS_SCE,
            length,
            function,
        }
    }

    pub const fn report_key(length: u16, function: SceFunction) -> Self {
        Self {
            opcode: REPORT_KEY,
            key_class: KEY_CLASS_SCE,
            length,
            function,
        }
    }

    pub fn to_region(&self) -> [u8; CDB_REGION_SIZE] {
        let mut region = [0u8; CDB_REGION_SIZE];
        region[0] = self.opcode;
        region[7] = self.key_class;
        region[8..10].copy_from_slice(&self.length.to_be_bytes());
        region[10] = self.function.to_u8();
        region
    }

    pub fn from_bytes(bytes: &[u8]) -> FormatResult<Self> {
        if bytes.len() < Self::SIZE {
            return Err(FormatError::Truncated {
                what: "key CDB",
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        let function =
            SceFunction::from_u8(bytes[10]).ok_or(FormatError::UnknownSceFunction(bytes[10]))?;
        Ok(Self {
            opcode: bytes[0],
            key_class: bytes[7],
            length: u16::from_be_bytes([bytes[8], bytes[9]]),
            function,
        })
    }
}

/**
    Four-byte plaintext descriptor preceding an encrypted one:
    opcode, reserved, argument length, reserved.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainCdb {
    pub opcode: u8,
    pub arg_len: u8,
}

impl PlainCdb {
    pub const SIZE: usize = 4;

    pub const fn to_bytes(self) -> [u8; Self::SIZE] {
        [self.opcode, 0, self.arg_len, 0]
    }

    pub fn from_bytes(bytes: &[u8]) -> FormatResult<Self> {
        match bytes {
            [opcode, _, arg_len, _, ..] => Ok(Self {
                opcode: *opcode,
                arg_len: *arg_len,
            }),
            _ => Err(FormatError::Truncated {
                what: "plain CDB",
                expected: Self::SIZE,
                actual: bytes.len(),
            }),
        }
    }
}

/**
    Command type byte of the encrypted descriptor.
*/
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecureCommand {
    UserData = 0,
    Ps2Disc = 2,
    Ps3Disc = 3,
    GetVersion = 4,
}

impl SecureCommand {
    pub const fn from_u8(u: u8) -> Option<Self> {
        match u {
            0 => Some(Self::UserData),
            2 => Some(Self::Ps2Disc),
            3 => Some(Self::Ps3Disc),
            4 => Some(Self::GetVersion),
            _ => None,
        }
    }

    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/**
    Sector address for a PS2 watermark request.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscAddress {
    pub layer: u8,
    pub area: u8,
    pub lba: u32,
}

impl DiscAddress {
    /**
        LBA big-endian, then layer in the high nibble and area in the low nibble.
    */
    pub fn to_params(self) -> [u8; 5] {
        let lba = self.lba.to_be_bytes();
        [
            lba[0],
            lba[1],
            lba[2],
            lba[3],
            (self.layer << 4) | (self.area & 0x0F),
        ]
    }

    pub fn from_params(params: [u8; 5]) -> Self {
        Self {
            layer: params[4] >> 4,
            area: params[4] & 0x0F,
            lba: u32::from_be_bytes([params[0], params[1], params[2], params[3]]),
        }
    }
}

/**
    Eight-byte secure descriptor, before encryption.

    Layout:
      [0]      command type
      [1..6]   command parameters (zero unless the command takes any)
      [6]      random padding
      [7]      check code over bytes 0..7
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecureCdb {
    pub command: SecureCommand,
    pub params: [u8; 5],
}

impl SecureCdb {
    pub const SIZE: usize = 8;

    pub const fn new(command: SecureCommand) -> Self {
        Self {
            command,
            params: [0; 5],
        }
    }

    pub fn ps2_disc(address: DiscAddress) -> Self {
        Self {
            command: SecureCommand::Ps2Disc,
            params: address.to_params(),
        }
    }

    /**
        Serialize with the given padding byte and a trailing check code.
    */
    pub fn encode(&self, pad: u8) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = self.command.to_u8();
        out[1..6].copy_from_slice(&self.params);
        out[6] = pad;
        out[7] = check_code(&out[..7]);
        out
    }

    /**
        Parse a decrypted descriptor, rejecting it if the check code is off.
    */
    pub fn decode(bytes: &[u8; Self::SIZE]) -> FormatResult<Self> {
        validate_trailing(bytes)?;
        let command =
            SecureCommand::from_u8(bytes[0]).ok_or(FormatError::UnknownSecureCommand(bytes[0]))?;
        let mut params = [0u8; 5];
        params.copy_from_slice(&bytes[1..6]);
        Ok(Self { command, params })
    }
}

/**
    Assemble the CDB region of a secure command: the plain descriptor, the
    encrypted descriptor, then zeros.
*/
pub fn secure_region(plain: PlainCdb, encrypted: &[u8; SecureCdb::SIZE]) -> [u8; CDB_REGION_SIZE] {
    let mut region = [0u8; CDB_REGION_SIZE];
    region[..PlainCdb::SIZE].copy_from_slice(&plain.to_bytes());
    region[PlainCdb::SIZE..PlainCdb::SIZE + SecureCdb::SIZE].copy_from_slice(encrypted);
    region
}

/**
    Split a secure CDB region back into its plain and encrypted parts.
*/
pub fn split_secure_region(region: &[u8]) -> FormatResult<(PlainCdb, [u8; SecureCdb::SIZE])> {
    let end = PlainCdb::SIZE + SecureCdb::SIZE;
    if region.len() < end {
        return Err(FormatError::Truncated {
            what: "secure CDB region",
            expected: end,
            actual: region.len(),
        });
    }
    let plain = PlainCdb::from_bytes(region)?;
    let mut encrypted = [0u8; SecureCdb::SIZE];
    encrypted.copy_from_slice(&region[PlainCdb::SIZE..end]);
    Ok((plain, encrypted))
}
