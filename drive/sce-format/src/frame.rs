use crate::cdb::CDB_REGION_SIZE;
use crate::error::{FormatError, FormatResult};

/**
    Bytes in front of the sub-command: two size words and eight reserved bytes.
*/
pub const FRAME_HEADER_SIZE: usize = 0x10;

pub const COMMAND_ID_OFFSET: usize = 0x10;
pub const COMMAND_SIZE_OFFSET: usize = 0x12;
pub const CDB_OFFSET: usize = 0x14;
pub const DATA_OFFSET: usize = CDB_OFFSET + CDB_REGION_SIZE;

/**
    Payload size and sub-command id of one frame type.

    The payload sizes are fixed per command and are not derivable from the
    data length; the drive firmware expects exactly these values.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameKind {
    pub payload_size: u32,
    pub command_id: u16,
}

impl FrameKind {
    pub const SEND_CHALLENGE: Self = Self::new(0x30, 0x80);
    pub const SEND_CONFIRM: Self = Self::new(0x30, 0x82);
    pub const REPORT_CHALLENGE: Self = Self::new(0x40, 0x90);
    pub const USER_DATA: Self = Self::new(0x70, 0xA0);
    pub const PS3_WATERMARK: Self = Self::new(0x60, 0xB0);
    pub const PS2_WATERMARK: Self = Self::new(0x70, 0xB1);
    pub const GET_VERSION: Self = Self::new(0x80, 0xC0);

    const fn new(payload_size: u32, command_id: u16) -> Self {
        Self {
            payload_size,
            command_id,
        }
    }

    /**
        Total encoded length of a frame of this kind.
    */
    pub const fn frame_len(self) -> usize {
        self.payload_size as usize + FRAME_HEADER_SIZE
    }
}

/**
    A command frame as handed to the drive's secure command processor.

    Layout:
      [0x00..0x04]  payload size (u32 little-endian)
      [0x04..0x08]  payload size, repeated
      [0x08..0x10]  reserved
      [0x10..0x12]  sub-command id (u16 little-endian)
      [0x12..0x14]  sub-command size = 0x10 + data length (u16 little-endian)
      [0x14..0x24]  CDB region
      [0x24..]      data region, zero filled to the frame length
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    pub kind: FrameKind,
    pub cdb: [u8; CDB_REGION_SIZE],
    pub data: Vec<u8>,
}

impl CommandFrame {
    pub fn new(kind: FrameKind, cdb: [u8; CDB_REGION_SIZE], data: Vec<u8>) -> FormatResult<Self> {
        if DATA_OFFSET + data.len() > kind.frame_len() {
            return Err(FormatError::Oversized {
                data: data.len(),
                payload: kind.payload_size,
            });
        }
        Ok(Self { kind, cdb, data })
    }

    pub fn opcode(&self) -> u8 {
        self.cdb[0]
    }

    /**
        Sub-command size: the CDB region plus the data transfer length.
    */
    pub fn command_size(&self) -> u16 {
        (CDB_REGION_SIZE + self.data.len()) as u16
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.kind.frame_len()];
        let size = self.kind.payload_size.to_le_bytes();
        out[0..4].copy_from_slice(&size);
        out[4..8].copy_from_slice(&size);
        out[COMMAND_ID_OFFSET..COMMAND_ID_OFFSET + 2]
            .copy_from_slice(&self.kind.command_id.to_le_bytes());
        out[COMMAND_SIZE_OFFSET..COMMAND_SIZE_OFFSET + 2]
            .copy_from_slice(&self.command_size().to_le_bytes());
        out[CDB_OFFSET..DATA_OFFSET].copy_from_slice(&self.cdb);
        out[DATA_OFFSET..DATA_OFFSET + self.data.len()].copy_from_slice(&self.data);
        out
    }

    pub fn decode(bytes: &[u8]) -> FormatResult<Self> {
        if bytes.len() < DATA_OFFSET {
            return Err(FormatError::Truncated {
                what: "command frame",
                expected: DATA_OFFSET,
                actual: bytes.len(),
            });
        }

        let first = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let second = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if first != second {
            return Err(FormatError::SizeMismatch { first, second });
        }

        let kind = FrameKind {
            payload_size: first,
            command_id: u16::from_le_bytes([
                bytes[COMMAND_ID_OFFSET],
                bytes[COMMAND_ID_OFFSET + 1],
            ]),
        };
        if bytes.len() < kind.frame_len() {
            return Err(FormatError::Truncated {
                what: "command frame",
                expected: kind.frame_len(),
                actual: bytes.len(),
            });
        }

        let command_size = u16::from_le_bytes([
            bytes[COMMAND_SIZE_OFFSET],
            bytes[COMMAND_SIZE_OFFSET + 1],
        ]) as usize;
        let data_len = command_size.saturating_sub(CDB_REGION_SIZE);

        let mut cdb = [0u8; CDB_REGION_SIZE];
        cdb.copy_from_slice(&bytes[CDB_OFFSET..DATA_OFFSET]);

        let data = bytes
            .get(DATA_OFFSET..DATA_OFFSET + data_len)
            .ok_or(FormatError::Oversized {
                data: data_len,
                payload: kind.payload_size,
            })?
            .to_vec();

        Self::new(kind, cdb, data)
    }
}
