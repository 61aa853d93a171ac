/*!
    Wire layouts for the drive's secure authentication commands.

    Everything here is plain byte layout: frames, SCSI key CDBs, the 8-byte
    secure descriptor, argument blocks and the check code that guards them.
    Encryption of the descriptor and argument regions happens one layer up.
*/

pub mod argument;
pub mod cdb;
pub mod check_code;
pub mod commands;
pub mod frame;
pub mod opcodes;
pub mod response;

mod error;

pub use self::error::{FormatError, FormatResult};
