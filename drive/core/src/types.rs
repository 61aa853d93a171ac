use core::fmt;
use core::str::FromStr;

use crate::error::ParseError;

/**
    A 128-bit symmetric key, nonce or IV.
*/
pub type Key128 = [u8; 16];

/**
    Operating mode the host authenticates for.

    The mode selects the user challenge-key pair and the user parameter block.
    Only a handful of values carry a name; any other raw value is representable
    so that configuration errors surface where the mode is actually used.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoleMode(pub u32);

impl RoleMode {
    pub const PS2_DISC: Self = Self(0x0C);
    pub const PS3_DISC: Self = Self(0x0D);
    pub const BD_VOUCHER: Self = Self(0x0E);
    pub const NP_PASSPHRASE: Self = Self(0x0F);
    pub const GET_VERSION: Self = Self(0x14);
    pub const DRIVE_AUTH: Self = Self(0x46);

    pub const fn value(self) -> u32 {
        self.0
    }

    /**
        The user-mode key slot for this mode, or `None` if the mode has no
        user authentication keys.

        Several disc modes share a slot with one of the plain user modes:
          0       -> U0
          1       -> U1
          2, 12   -> U2
          3, 13, 14 -> U3
          4, 20   -> U4
    */
    pub const fn user_slot(self) -> Option<UserSlot> {
        match self.0 {
            0 => Some(UserSlot::U0),
            1 => Some(UserSlot::U1),
            2 | 12 => Some(UserSlot::U2),
            3 | 13 | 14 => Some(UserSlot::U3),
            4 | 20 => Some(UserSlot::U4),
            _ => None,
        }
    }

    pub fn from_name(name: &[u8]) -> Option<Self> {
        let name = name.trim_ascii();
        [
            Self::PS2_DISC,
            Self::PS3_DISC,
            Self::BD_VOUCHER,
            Self::NP_PASSPHRASE,
            Self::GET_VERSION,
            Self::DRIVE_AUTH,
        ]
        .into_iter()
        .find(|mode| {
            mode.to_name()
                .is_some_and(|known| known.as_bytes().eq_ignore_ascii_case(name))
        })
    }

    pub const fn to_name(self) -> Option<&'static str> {
        match self.0 {
            0x0C => Some("ps2-disc"),
            0x0D => Some("ps3-disc"),
            0x0E => Some("bd-voucher"),
            0x0F => Some("np-passphrase"),
            0x14 => Some("get-version"),
            0x46 => Some("drive-auth"),
            _ => None,
        }
    }
}

impl fmt::Display for RoleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_name() {
            Some(name) => write!(f, "{name} (0x{:02X})", self.0),
            None => write!(f, "0x{:02X}", self.0),
        }
    }
}

impl FromStr for RoleMode {
    type Err = ParseError;

    /**
        Accepts a mode name (`ps3-disc`), a decimal number (`13`) or a
        `0x`-prefixed hex number (`0x0D`).
    */
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(mode) = Self::from_name(s.as_bytes()) {
            return Ok(mode);
        }

        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => trimmed.parse(),
        };

        parsed.map(Self).map_err(|_| ParseError {
            kind: "role mode",
            value: s.to_owned(),
        })
    }
}

/**
    One of the five user-mode key slots in the key store.
*/
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserSlot {
    U0 = 0,
    U1 = 1,
    U2 = 2,
    U3 = 3,
    U4 = 4,
}

impl UserSlot {
    pub const ALL: [Self; 5] = [Self::U0, Self::U1, Self::U2, Self::U3, Self::U4];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn to_name(self) -> &'static str {
        match self {
            Self::U0 => "u0",
            Self::U1 => "u1",
            Self::U2 => "u2",
            Self::U3 => "u3",
            Self::U4 => "u4",
        }
    }
}

impl fmt::Display for UserSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

/**
    Which side of the two-phase authentication is running.
*/
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthRole {
    Super = 0,
    User = 1,
}

impl AuthRole {
    pub const fn to_name(self) -> &'static str {
        match self {
            Self::Super => "super",
            Self::User => "user",
        }
    }
}

impl fmt::Display for AuthRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

/**
    Release/debug flag derived from a PS3 disc watermark.
*/
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscMode {
    Release = 1,
    Debug = 2,
}

impl DiscMode {
    pub const fn from_u64(u: u64) -> Option<Self> {
        match u {
            1 => Some(Self::Release),
            2 => Some(Self::Debug),
            _ => None,
        }
    }

    pub const fn to_u64(self) -> u64 {
        self as u64
    }

    pub const fn to_name(self) -> &'static str {
        match self {
            Self::Release => "RELEASE",
            Self::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for DiscMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}
