#![cfg_attr(not(target_os = "linux"), allow(dead_code))]

use core::fmt;

use anyhow::Result;
use drive_sce::{AuthError, AuthResult, RoleMode};

/// Generic failure.
pub const STOPCODE_FAILED: u16 = 0x103;
/// Watermark response failed its check code.
pub const STOPCODE_CHECK_CODE: u16 = 0x104;
/// Super authentication failed in drive-auth mode.
pub const STOPCODE_DRIVE_AUTH: u16 = 0x10B;

/**
    A step of the `auth` command, used to report where a run stopped.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SuperAuth,
    SetUserParameter,
    UserAuth,
    GetVersion,
    GetWm3,
    GetDiscId,
    GetWm2,
}

impl Stage {
    pub const fn to_name(self) -> &'static str {
        match self {
            Self::SuperAuth => "super authentication",
            Self::SetUserParameter => "set user parameter",
            Self::UserAuth => "user authentication",
            Self::GetVersion => "get version",
            Self::GetWm3 => "get PS3 watermark",
            Self::GetDiscId => "get disc id",
            Self::GetWm2 => "get PS2 watermark",
        }
    }

    pub fn stopcode(self, mode: RoleMode, err: &AuthError) -> u16 {
        match (self, err) {
            (Self::GetWm3 | Self::GetWm2, AuthError::ChecksumMismatch { .. }) => {
                STOPCODE_CHECK_CODE
            }
            (Self::SuperAuth, _) if mode == RoleMode::DRIVE_AUTH => STOPCODE_DRIVE_AUTH,
            _ => STOPCODE_FAILED,
        }
    }

    /**
        Attach the stage name and stopcode to a failed step.
    */
    pub fn check<T>(self, mode: RoleMode, result: AuthResult<T>) -> Result<T> {
        result.map_err(|err| {
            let stopcode = self.stopcode(mode, &err);
            anyhow::Error::new(err).context(format!("{self} failed, stopcode 0x{stopcode:03X}"))
        })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}
