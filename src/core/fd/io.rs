use crate::common::error::Result;
use std::io;
use std::os::unix::io::RawFd;

/// Read what is available. `Ok(None)` means the descriptor would block;
/// `Ok(Some(0))` is end of file.
pub fn read_non_blocking(fd: RawFd, buf: &mut [u8]) -> Result<Option<usize>> {
    let n = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
    if n >= 0 {
        return Ok(Some(n as usize));
    }

    let err = io::Error::last_os_error();
    match err.kind() {
        io::ErrorKind::WouldBlock => Ok(None),
        _ => Err(err.into()),
    }
}

pub fn write_non_blocking(fd: RawFd, buf: &[u8]) -> Result<Option<usize>> {
    let n = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
    if n >= 0 {
        return Ok(Some(n as usize));
    }

    let err = io::Error::last_os_error();
    match err.kind() {
        io::ErrorKind::WouldBlock => Ok(None),
        _ => Err(err.into()),
    }
}
