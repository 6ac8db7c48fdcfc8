//! crates/platform/src/multiprocessing/pipe.rs

use std::fs::File;
use std::io;

/// Capacity assumed where the system does not report one.
const FALLBACK_CAPACITY: usize = 16 * 1024;

/// An anonymous unidirectional pipe.
///
/// Both ends survive a fork; the usual pattern is for each side to drop the
/// end it does not use.
#[derive(Debug)]
pub struct Pipe {
    reader: File,
    writer: File,
}

impl Pipe {
    /// Creates a pipe.
    ///
    /// # Errors
    ///
    /// Fails when the system is out of descriptors.
    pub fn new() -> io::Result<Self> {
        let (reader, writer) = nix::unistd::pipe().map_err(io::Error::from)?;
        Ok(Self {
            reader: File::from(reader),
            writer: File::from(writer),
        })
    }

    /// Read end.
    #[must_use]
    pub const fn reader(&self) -> &File {
        &self.reader
    }

    /// Write end.
    #[must_use]
    pub const fn writer(&self) -> &File {
        &self.writer
    }

    /// Asks the system to buffer up to `bytes`. The request may be trimmed
    /// or refused; [`capacity`](Self::capacity) reports the outcome.
    pub fn request_capacity(&self, bytes: usize) {
        set_capacity(&self.writer, bytes);
    }

    /// Bytes the pipe holds before a writer blocks.
    #[must_use]
    pub fn capacity(&self) -> usize {
        capacity(&self.writer).unwrap_or(FALLBACK_CAPACITY)
    }

    /// Splits the pipe into `(reader, writer)`.
    #[must_use]
    pub fn into_parts(self) -> (File, File) {
        (self.reader, self.writer)
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn set_capacity(end: &File, bytes: usize) {
    use nix::fcntl::{FcntlArg, fcntl};
    use std::os::fd::AsRawFd;

    let size = nix::libc::c_int::try_from(bytes).unwrap_or(nix::libc::c_int::MAX);
    let _ = fcntl(end.as_raw_fd(), FcntlArg::F_SETPIPE_SZ(size));
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn set_capacity(_end: &File, _bytes: usize) {}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn capacity(end: &File) -> Option<usize> {
    use nix::fcntl::{FcntlArg, fcntl};
    use std::os::fd::AsRawFd;

    fcntl(end.as_raw_fd(), FcntlArg::F_GETPIPE_SZ)
        .ok()
        .and_then(|size| usize::try_from(size).ok())
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn capacity(_end: &File) -> Option<usize> {
    None
}
