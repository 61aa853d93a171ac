use crate::error::{FormatError, FormatResult};

/**
    Size of the length header in front of every data transfer.
*/
pub const DATA_HEADER_SIZE: usize = 4;

/**
    Data transfer header: length (u16 big-endian) followed by two reserved bytes.
*/
pub fn data_header(len: u16) -> [u8; DATA_HEADER_SIZE] {
    let [hi, lo] = len.to_be_bytes();
    [hi, lo, 0, 0]
}

/**
    A data buffer returned by the drive for a read-direction command.

    The drive fills the transfer buffer with a length header followed by the
    body. The header is informational; callers index into the body.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFrame<'a> {
    pub declared_len: u16,
    pub body: &'a [u8],
}

impl<'a> ResponseFrame<'a> {
    pub fn parse(data: &'a [u8]) -> FormatResult<Self> {
        if data.len() < DATA_HEADER_SIZE {
            return Err(FormatError::Truncated {
                what: "response header",
                expected: DATA_HEADER_SIZE,
                actual: data.len(),
            });
        }
        Ok(Self {
            declared_len: u16::from_be_bytes([data[0], data[1]]),
            body: &data[DATA_HEADER_SIZE..],
        })
    }

    /**
        Borrow `len` body bytes starting at `offset`.
    */
    pub fn field(&self, offset: usize, len: usize) -> FormatResult<&'a [u8]> {
        self.body
            .get(offset..offset + len)
            .ok_or(FormatError::Truncated {
                what: "response body",
                expected: offset + len,
                actual: self.body.len(),
            })
    }

    /**
        Copy a fixed-size block out of the body.
    */
    pub fn block<const N: usize>(&self, offset: usize) -> FormatResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.field(offset, N)?);
        Ok(out)
    }
}
