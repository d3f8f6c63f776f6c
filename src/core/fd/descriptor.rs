use crate::common::error::Result;
use std::io;
use std::mem;
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};

/// A descriptor the loop can watch.
///
/// Descriptors the process inherited (stdin) are borrowed and left open on
/// drop. Ones created here, such as pipe ends, are owned and closed.
pub struct Descriptor {
    fd: RawFd,
    owned: bool,
}

impl Descriptor {
    pub fn borrowed(fd: RawFd) -> Self {
        Self { fd, owned: false }
    }

    pub fn owned(fd: RawFd) -> Self {
        Self { fd, owned: true }
    }

    pub fn stdin() -> Self {
        Self::borrowed(libc::STDIN_FILENO)
    }

    pub fn as_raw_fd(&self) -> RawFd {
        self.fd
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub fn set_non_blocking(&self) -> Result<()> {
        let flags = check(unsafe { libc::fcntl(self.fd, libc::F_GETFL) })?;
        check(unsafe { libc::fcntl(self.fd, libc::F_SETFL, flags | libc::O_NONBLOCK) })?;
        Ok(())
    }

    pub fn is_non_blocking(&self) -> Result<bool> {
        let flags = check(unsafe { libc::fcntl(self.fd, libc::F_GETFL) })?;
        Ok(flags & libc::O_NONBLOCK != 0)
    }

    /// Keep the descriptor out of child processes.
    pub fn set_close_on_exec(&self) -> Result<()> {
        let flags = check(unsafe { libc::fcntl(self.fd, libc::F_GETFD) })?;
        check(unsafe { libc::fcntl(self.fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) })?;
        Ok(())
    }
}

fn check(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

impl AsRawFd for Descriptor {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl IntoRawFd for Descriptor {
    /// Give up ownership without closing.
    fn into_raw_fd(self) -> RawFd {
        let fd = self.fd;
        mem::forget(self);
        fd
    }
}

impl Drop for Descriptor {
    fn drop(&mut self) {
        if self.owned && self.fd >= 0 {
            unsafe {
                libc::close(self.fd);
            }
        }
    }
}

/// Both ends of a non-blocking, close-on-exec pipe. Writing to `writer`
/// makes `reader` readable for the loop; dropping `writer` delivers EOF.
pub struct Pipe {
    pub reader: Descriptor,
    pub writer: Descriptor,
}

impl Pipe {
    pub fn new() -> Result<Self> {
        let mut fds: [libc::c_int; 2] = [-1; 2];
        check(unsafe { libc::pipe(fds.as_mut_ptr()) })?;

        let pipe = Self {
            reader: Descriptor::owned(fds[0]),
            writer: Descriptor::owned(fds[1]),
        };
        for end in [&pipe.reader, &pipe.writer] {
            end.set_non_blocking()?;
            end.set_close_on_exec()?;
        }
        Ok(pipe)
    }

    pub fn into_parts(self) -> (Descriptor, Descriptor) {
        (self.reader, self.writer)
    }
}

/// Shorthand for `Pipe::new()` split into (read end, write end).
pub fn pipe() -> Result<(Descriptor, Descriptor)> {
    Pipe::new().map(Pipe::into_parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_open(fd: RawFd) -> bool {
        unsafe { libc::fcntl(fd, libc::F_GETFD) >= 0 }
    }

    #[test]
    fn test_pipe_ends_are_non_blocking_and_cloexec() {
        let pipe = Pipe::new().unwrap();
        assert_ne!(pipe.reader.as_raw_fd(), pipe.writer.as_raw_fd());

        for end in [&pipe.reader, &pipe.writer] {
            assert!(end.is_owned());
            assert!(end.is_non_blocking().unwrap());
            let flags = unsafe { libc::fcntl(end.as_raw_fd(), libc::F_GETFD) };
            assert_ne!(flags & libc::FD_CLOEXEC, 0);
        }
    }

    #[test]
    fn test_owned_end_is_closed_on_drop() {
        let (reader, writer) = pipe().unwrap();
        let fd = writer.as_raw_fd();
        drop(writer);
        assert!(!is_open(fd));
        assert!(is_open(reader.as_raw_fd()));
    }

    #[test]
    fn test_borrowed_descriptor_is_not_closed() {
        let (reader, _writer) = pipe().unwrap();
        let view = Descriptor::borrowed(reader.as_raw_fd());
        assert!(!view.is_owned());
        drop(view);
        assert!(is_open(reader.as_raw_fd()));
    }

    #[test]
    fn test_into_raw_fd_releases_ownership() {
        let (reader, _writer) = pipe().unwrap();
        let fd = reader.into_raw_fd();
        assert!(is_open(fd));
        drop(Descriptor::owned(fd));
        assert!(!is_open(fd));
    }

    #[test]
    fn test_stdin_is_borrowed() {
        let stdin = Descriptor::stdin();
        assert_eq!(stdin.as_raw_fd(), libc::STDIN_FILENO);
        assert!(!stdin.is_owned());
    }

    #[test]
    fn test_flag_errors_surface_as_io_errors() {
        let (reader, _writer) = pipe().unwrap();
        let fd = reader.into_raw_fd();
        unsafe { libc::close(fd) };

        let stale = Descriptor::borrowed(fd);
        assert!(matches!(
            stale.set_non_blocking(),
            Err(crate::common::error::LoopError::IoError(_))
        ));
    }
}
