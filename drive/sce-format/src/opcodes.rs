/*!
    ATAPI transfer parameters by SCSI operation code.

    The transport needs to know, for each opcode it submits, how many CDB
    bytes to send and which way the data phase goes. Every entry uses the
    12-byte ATAPI packet length.
*/

use core::fmt;

pub const SEND_KEY: u8 = 0xA3;
pub const REPORT_KEY: u8 = 0xA4;
pub const SECURE_REPORT: u8 = 0xE0;
pub const SECURE_SEND: u8 = 0xE1;

/**
    ATAPI packet command length.
*/
pub const PACKET_LEN: usize = 0x0C;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtaProtocol {
    NonData = 0,
    PioIn = 1,
    PioOut = 2,
    Dma = 3,
}

/**
    Data phase direction.
*/
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    ToDevice = 0,
    FromDevice = 1,
}

impl Direction {
    pub const fn to_name(self) -> &'static str {
        match self {
            Self::ToDevice => "to-device",
            Self::FromDevice => "from-device",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtapiParams {
    pub cdb_len: usize,
    pub protocol: AtaProtocol,
    pub direction: Direction,
}

use AtaProtocol::{Dma, NonData, PioIn, PioOut};
use Direction::{FromDevice, ToDevice};

#[rustfmt::skip]
const TABLE: [(u8, AtaProtocol, Direction); 62] = [
    (0xA1, NonData, ToDevice),   // BLANK
    (0x5B, NonData, ToDevice),   // CLOSE TRACK/SESSION
    (0x35, NonData, ToDevice),   // SYNCHRONIZE CACHE
    (0x04, PioIn,   FromDevice), // FORMAT UNIT
    (0x46, PioIn,   FromDevice), // GET CONFIGURATION
    (0x4A, PioIn,   FromDevice), // GET EVENT STATUS NOTIFICATION
    (0xAC, PioIn,   FromDevice), // GET PERFORMANCE
    (0x12, PioIn,   FromDevice), // INQUIRY
    (0xA6, NonData, ToDevice),   // LOAD/UNLOAD MEDIUM
    (0xBD, PioIn,   FromDevice), // MECHANISM STATUS
    (0x55, PioOut,  ToDevice),   // MODE SELECT (10)
    (0x5A, PioIn,   FromDevice), // MODE SENSE (10)
    (0x4B, NonData, ToDevice),   // PAUSE/RESUME
    (0x45, NonData, ToDevice),   // PLAY AUDIO (10)
    (0x47, NonData, ToDevice),   // PLAY AUDIO MSF
    (0x48, NonData, ToDevice),
    (0xBC, NonData, ToDevice),
    (0x1E, NonData, ToDevice),   // PREVENT ALLOW MEDIUM REMOVAL
    (0x28, Dma,     FromDevice), // READ (10)
    (0xA8, Dma,     FromDevice), // READ (12)
    (0x25, PioIn,   FromDevice), // READ CAPACITY
    (0xBE, Dma,     FromDevice), // READ CD
    (0xB9, Dma,     FromDevice), // READ CD MSF
    (0x51, PioIn,   FromDevice), // READ DISC INFORMATION
    (0xAD, PioIn,   FromDevice), // READ DISC STRUCTURE
    (0x23, PioIn,   FromDevice), // READ FORMAT CAPACITIES
    (0x44, NonData, ToDevice),   // READ HEADER
    (0x52, PioIn,   FromDevice), // READ TRACK INFORMATION
    (0x42, PioIn,   FromDevice), // READ SUBCHANNEL
    (0x43, PioIn,   FromDevice), // READ TOC/PMA/ATIP
    (0x58, NonData, ToDevice),   // REPAIR TRACK
    (0xA4, PioIn,   FromDevice), // REPORT KEY
    (0x03, PioIn,   FromDevice), // REQUEST SENSE
    (0x53, NonData, ToDevice),   // RESERVE TRACK
    (0xBA, NonData, ToDevice),   // SCAN
    (0x2B, NonData, ToDevice),   // SEEK (10)
    (0xBF, PioOut,  ToDevice),   // SEND DISC STRUCTURE
    (0xA2, NonData, ToDevice),   // SECURITY PROTOCOL IN
    (0xA3, PioOut,  ToDevice),   // SEND KEY
    (0x54, PioOut,  ToDevice),   // SEND OPC INFORMATION
    (0xA7, NonData, ToDevice),   // SET READ AHEAD
    (0xB6, PioOut,  ToDevice),   // SET STREAMING
    (0x1B, NonData, ToDevice),   // START STOP UNIT
    (0x4E, NonData, ToDevice),   // STOP PLAY/SCAN
    (0x00, NonData, ToDevice),   // TEST UNIT READY
    (0x2F, NonData, ToDevice),   // VERIFY (10)
    (0x2A, PioOut,  ToDevice),   // WRITE (10)
    (0xAA, PioOut,  ToDevice),   // WRITE (12)
    (0x2E, PioOut,  ToDevice),   // WRITE AND VERIFY (10)
    (0xBB, NonData, ToDevice),   // SET CD SPEED
    (0x48, NonData, ToDevice),
    (0xDA, NonData, ToDevice),
    (0xF6, NonData, ToDevice),
    (0xF9, NonData, ToDevice),
    (0x3B, PioOut,  ToDevice),   // WRITE BUFFER
    (0x3C, PioIn,   FromDevice), // READ BUFFER
    (0xD7, PioIn,   FromDevice), // SACD
    (0xA5, NonData, ToDevice),
    (0x4C, PioOut,  ToDevice),   // LOG SELECT
    (0x4D, PioIn,   FromDevice), // LOG SENSE
    (0xE0, PioIn,   FromDevice), // SECURE REPORT
    (0xE1, PioOut,  ToDevice),   // SECURE SEND
];

/**
    Look up the transfer parameters for an opcode. First match wins.
*/
pub fn atapi_params(opcode: u8) -> Option<AtapiParams> {
    TABLE
        .iter()
        .find(|(op, _, _)| *op == opcode)
        .map(|&(_, protocol, direction)| AtapiParams {
            cdb_len: PACKET_LEN,
            protocol,
            direction,
        })
}
