/*!
    Linux SCSI generic transport.

    Each exchange opens the device node, issues one `SG_IO` ioctl and closes
    it again, so a transport value holds no file descriptor between commands.
*/

use std::fs::OpenOptions;
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use std::ptr;
use std::time::Duration;

use libc::{c_int, c_uchar, c_uint, c_ushort, c_void};

use drive_sce_format::opcodes::Direction;

use crate::error::TransportError;
use crate::transport::Transport;

pub const DEFAULT_DEVICE: &str = "/dev/sr0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(20_000);

const SG_IO: libc::c_ulong = 0x2285;
const SG_DXFER_TO_DEV: c_int = -2;
const SG_DXFER_FROM_DEV: c_int = -3;
const SENSE_LEN: usize = 32;

/**
    `struct sg_io_hdr` from `<scsi/sg.h>`.
*/
#[repr(C)]
struct SgIoHdr {
    interface_id: c_int,
    dxfer_direction: c_int,
    cmd_len: c_uchar,
    mx_sb_len: c_uchar,
    iovec_count: c_ushort,
    dxfer_len: c_uint,
    dxferp: *mut c_void,
    cmdp: *mut c_uchar,
    sbp: *mut c_uchar,
    timeout: c_uint,
    flags: c_uint,
    pack_id: c_int,
    usr_ptr: *mut c_void,
    status: c_uchar,
    masked_status: c_uchar,
    msg_status: c_uchar,
    sb_len_wr: c_uchar,
    host_status: c_ushort,
    driver_status: c_ushort,
    resid: c_int,
    duration: c_uint,
    info: c_uint,
}

/**
    Transport that talks to an optical drive through `/dev/sr*`.
*/
#[derive(Debug, Clone)]
pub struct SgTransport {
    device: PathBuf,
    timeout: Duration,
}

impl SgTransport {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn device(&self) -> &std::path::Path {
        &self.device
    }
}

impl Default for SgTransport {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE)
    }
}

impl Transport for SgTransport {
    fn exchange(
        &mut self,
        opcode: u8,
        cdb: &[u8],
        direction: Direction,
        payload: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.device)
            .map_err(|e| TransportError::Open {
                device: self.device.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut cdb = cdb.to_vec();
        let mut data = payload.to_vec();
        let mut sense = [0u8; SENSE_LEN];

        let mut hdr = SgIoHdr {
            interface_id: c_int::from(b'S'),
            dxfer_direction: match direction {
                Direction::ToDevice => SG_DXFER_TO_DEV,
                Direction::FromDevice => SG_DXFER_FROM_DEV,
            },
            cmd_len: cdb.len() as c_uchar,
            mx_sb_len: SENSE_LEN as c_uchar,
            iovec_count: 0,
            dxfer_len: data.len() as c_uint,
            dxferp: data.as_mut_ptr().cast(),
            cmdp: cdb.as_mut_ptr(),
            sbp: sense.as_mut_ptr(),
            timeout: self.timeout.as_millis().min(u128::from(c_uint::MAX)) as c_uint,
            flags: 0,
            pack_id: 0,
            usr_ptr: ptr::null_mut(),
            status: 0,
            masked_status: 0,
            msg_status: 0,
            sb_len_wr: 0,
            host_status: 0,
            driver_status: 0,
            resid: 0,
            duration: 0,
            info: 0,
        };

        // SAFETY: every pointer in `hdr` refers to a live buffer of the stated
        // length that outlives the call.
        let rv = unsafe { libc::ioctl(file.as_raw_fd(), SG_IO as _, &mut hdr as *mut SgIoHdr) };
        if rv != 0 {
            return Err(TransportError::Ioctl(io::Error::last_os_error().to_string()));
        }

        let completion = Completion::from(&hdr);
        if completion.status != 0 {
            tracing::warn!(
                opcode = format_args!("0x{opcode:02X}"),
                sense = ?&sense[..usize::from(hdr.sb_len_wr).min(SENSE_LEN)],
                "drive returned check condition"
            );
        }
        completion.finish(direction, data)
    }
}

/**
    Outcome fields of a finished `sg_io_hdr`.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Completion {
    status: u8,
    host_status: u16,
    driver_status: u16,
    /// Bytes of the data buffer the device did not transfer.
    resid: c_int,
}

impl From<&SgIoHdr> for Completion {
    fn from(hdr: &SgIoHdr) -> Self {
        Self {
            status: hdr.status,
            host_status: hdr.host_status,
            driver_status: hdr.driver_status,
            resid: hdr.resid,
        }
    }
}

impl Completion {
    /**
        Map any non-zero status to an error, otherwise cut a read buffer down
        to the bytes actually transferred.
    */
    fn finish(self, direction: Direction, mut data: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        if self.status != 0 || self.host_status != 0 || self.driver_status != 0 {
            return Err(TransportError::DeviceStatus {
                status: self.status,
                host_status: self.host_status,
                driver_status: self.driver_status,
            });
        }

        match direction {
            Direction::ToDevice => Ok(Vec::new()),
            Direction::FromDevice => {
                let resid = usize::try_from(self.resid).unwrap_or(0);
                let transferred = data.len().saturating_sub(resid);
                data.truncate(transferred);
                Ok(data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_matches_kernel_layout() {
        // 64-bit layout of struct sg_io_hdr
        #[cfg(target_pointer_width = "64")]
        assert_eq!(std::mem::size_of::<SgIoHdr>(), 88);
    }

    #[test]
    fn missing_device_fails_to_open() {
        let mut transport = SgTransport::new("/nonexistent/sr9");
        let err = transport
            .exchange(0xA3, &[0xA3; 12], Direction::ToDevice, &[0; 4])
            .unwrap_err();
        assert!(matches!(err, TransportError::Open { .. }));
    }

    fn ok(resid: c_int) -> Completion {
        Completion {
            status: 0,
            host_status: 0,
            driver_status: 0,
            resid,
        }
    }

    #[test]
    fn residual_shortens_read_buffer() {
        let data = vec![0xAB; 0x24];
        let out = ok(0x14).finish(Direction::FromDevice, data.clone()).unwrap();
        assert_eq!(out, vec![0xAB; 0x10]);

        assert_eq!(ok(0).finish(Direction::FromDevice, data.clone()).unwrap(), data);
        assert_eq!(ok(0x40).finish(Direction::FromDevice, data).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn write_returns_nothing() {
        assert!(ok(0).finish(Direction::ToDevice, vec![1, 2, 3]).unwrap().is_empty());
    }

    #[test]
    fn host_or_driver_status_is_a_device_error() {
        let host = Completion {
            host_status: 0x03,
            ..ok(0)
        };
        assert_eq!(
            host.finish(Direction::FromDevice, vec![0; 4]),
            Err(TransportError::DeviceStatus {
                status: 0,
                host_status: 0x03,
                driver_status: 0,
            })
        );

        let driver = Completion {
            driver_status: 0x08,
            ..ok(0)
        };
        assert!(matches!(
            driver.finish(Direction::ToDevice, Vec::new()),
            Err(TransportError::DeviceStatus {
                driver_status: 0x08,
                ..
            })
        ));
    }

    #[test]
    fn check_condition_is_a_device_error() {
        let completion = Completion {
            status: 0x02,
            ..ok(0)
        };
        assert!(matches!(
            completion.finish(Direction::FromDevice, vec![0; 4]),
            Err(TransportError::DeviceStatus { status: 0x02, .. })
        ));
    }

    #[test]
    fn defaults() {
        let transport = SgTransport::default();
        assert_eq!(transport.device(), std::path::Path::new("/dev/sr0"));
        assert_eq!(transport.timeout, Duration::from_secs(20));
    }
}
