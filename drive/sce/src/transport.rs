use drive_sce_format::frame::CommandFrame;
use drive_sce_format::opcodes::{Direction, atapi_params};

use crate::error::TransportError;

/**
    Synchronous request/response exchange with the drive.

    `payload` is the data region of the command. For host-to-device commands
    it is sent as is and the returned vector is empty; for device-to-host
    commands its length is the transfer length and the returned vector is the
    filled buffer.
*/
pub trait Transport {
    fn exchange(
        &mut self,
        opcode: u8,
        cdb: &[u8],
        direction: Direction,
        payload: &[u8],
    ) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn exchange(
        &mut self,
        opcode: u8,
        cdb: &[u8],
        direction: Direction,
        payload: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        (**self).exchange(opcode, cdb, direction, payload)
    }
}

/**
    Submit a command frame, choosing CDB length and direction from the opcode table.
*/
pub fn submit<T: Transport + ?Sized>(
    transport: &mut T,
    frame: &CommandFrame,
) -> Result<Vec<u8>, TransportError> {
    let opcode = frame.opcode();
    let params = atapi_params(opcode).ok_or(TransportError::UnknownOpcode(opcode))?;

    tracing::trace!(
        opcode = format_args!("0x{opcode:02X}"),
        protocol = ?params.protocol,
        direction = %params.direction,
        len = frame.data.len(),
        "submitting command"
    );

    let response = transport.exchange(
        opcode,
        &frame.cdb[..params.cdb_len],
        params.direction,
        &frame.data,
    )?;

    if params.direction == Direction::FromDevice && response.len() < frame.data.len() {
        return Err(TransportError::ShortRead {
            expected: frame.data.len(),
            actual: response.len(),
        });
    }
    Ok(response)
}
