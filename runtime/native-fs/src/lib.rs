//! # Native Filesystem Layer
//!
//! The primitives the binding core calls into: `open`, `read`, `write`,
//! `close`, `stat`, `fstat`, `unlink`, plus the diagnostic dump/listing
//! helpers. The core trusts their semantics and never looks past them.
//!
//! ## Backends
//! - **POSIX** (default): `libc` calls against the host filesystem, with
//!   caller paths resolved beneath a mount root
//! - **Mock**: in-memory files that record every native call, for tests
//!
//! ## Build Modes
//!
//! ```bash
//! # POSIX (default)
//! cargo build
//!
//! # POSIX + mock (testing)
//! cargo test --features mock
//! ```
//!
//! Buffers cross this boundary as slices, never as raw pointer/length pairs,
//! so a window that slipped past the caller-side clamping still cannot reach
//! memory outside the buffer.

use core::fmt;

use bitflags::bitflags;
use static_assertions::const_assert_eq;

#[cfg(feature = "posix")]
mod posix;

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "posix")]
pub use posix::PosixFs;

#[cfg(feature = "mock")]
pub use mock::{MockFs, NativeCall};

/// OS descriptor returned by `open`
pub type RawFd = i32;

/// Result of a native call: the value, or the `errno` it reported
pub type NativeResult<T> = core::result::Result<T, Errno>;

/// `errno`-style diagnostic code reported by a failed native call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Errno(pub i32);

impl Errno {
    pub const NOENT: Errno = Errno(libc::ENOENT);
    pub const BADF: Errno = Errno(libc::EBADF);
    pub const INVAL: Errno = Errno(libc::EINVAL);
    pub const ISDIR: Errno = Errno(libc::EISDIR);
    pub const IO: Errno = Errno(libc::EIO);

    /// Capture the calling thread's current `errno`
    pub fn last() -> Self {
        Errno(
            std::io::Error::last_os_error()
                .raw_os_error()
                .unwrap_or(libc::EIO),
        )
    }

    /// Raw numeric code
    pub fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "errno={} [{}]",
            self.0,
            std::io::Error::from_raw_os_error(self.0)
        )
    }
}

impl std::error::Error for Errno {}

// Read-only is the absence of an access bit; the translator relies on it.
const_assert_eq!(libc::O_RDONLY, 0);

bitflags! {
    /// Native `open(2)` flags
    ///
    /// Bits are the platform's own `O_*` values so the set can be handed to
    /// `open` unchanged. Read-only is the empty set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: i32 {
        const WRONLY = libc::O_WRONLY;
        const RDWR = libc::O_RDWR;
        const CREAT = libc::O_CREAT;
        const TRUNC = libc::O_TRUNC;
        const APPEND = libc::O_APPEND;
    }
}

impl OpenFlags {
    /// `O_RDONLY`
    pub const RDONLY: Self = Self::empty();

    /// Descriptor may be read from
    pub fn readable(self) -> bool {
        !self.contains(Self::WRONLY)
    }

    /// Descriptor may be written to
    pub fn writable(self) -> bool {
        self.intersects(Self::WRONLY | Self::RDWR)
    }
}

/// File metadata projection; only `size` is guaranteed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Size in bytes
    pub size: u64,
}

/// Native file primitives
///
/// Every method maps one-to-one onto a POSIX call. Implementations must not
/// panic on bad descriptors or missing paths; they report the `errno`.
pub trait NativeFs {
    /// `open(path, flags)`
    fn open(&self, path: &str, flags: OpenFlags) -> NativeResult<RawFd>;

    /// `close(fd)`
    fn close(&self, fd: RawFd) -> NativeResult<()>;

    /// `read(fd, buf, buf.len())` at the descriptor's file pointer
    fn read(&self, fd: RawFd, buf: &mut [u8]) -> NativeResult<usize>;

    /// `pread(fd, buf, buf.len(), position)`; the file pointer is not moved
    fn pread(&self, fd: RawFd, buf: &mut [u8], position: u64) -> NativeResult<usize>;

    /// `write(fd, buf, buf.len())`
    fn write(&self, fd: RawFd, buf: &[u8]) -> NativeResult<usize>;

    /// `stat(path)`
    fn stat(&self, path: &str) -> NativeResult<FileStat>;

    /// `fstat(fd)`
    fn fstat(&self, fd: RawFd) -> NativeResult<FileStat>;

    /// `unlink(path)`
    fn unlink(&self, path: &str) -> NativeResult<()>;
}

/// Diagnostic helpers over the mounted filesystem
///
/// Opaque to the binding core: `dump` only logs, `list` only names files.
pub trait Diagnostics {
    /// Log every file and its size
    fn dump(&self);

    /// Names of the files on the mount
    fn list(&self) -> NativeResult<Vec<String>>;
}

impl<T: NativeFs + ?Sized> NativeFs for &T {
    fn open(&self, path: &str, flags: OpenFlags) -> NativeResult<RawFd> {
        (**self).open(path, flags)
    }

    fn close(&self, fd: RawFd) -> NativeResult<()> {
        (**self).close(fd)
    }

    fn read(&self, fd: RawFd, buf: &mut [u8]) -> NativeResult<usize> {
        (**self).read(fd, buf)
    }

    fn pread(&self, fd: RawFd, buf: &mut [u8], position: u64) -> NativeResult<usize> {
        (**self).pread(fd, buf, position)
    }

    fn write(&self, fd: RawFd, buf: &[u8]) -> NativeResult<usize> {
        (**self).write(fd, buf)
    }

    fn stat(&self, path: &str) -> NativeResult<FileStat> {
        (**self).stat(path)
    }

    fn fstat(&self, fd: RawFd) -> NativeResult<FileStat> {
        (**self).fstat(fd)
    }

    fn unlink(&self, path: &str) -> NativeResult<()> {
        (**self).unlink(path)
    }
}

impl<T: Diagnostics + ?Sized> Diagnostics for &T {
    fn dump(&self) {
        (**self).dump()
    }

    fn list(&self) -> NativeResult<Vec<String>> {
        (**self).list()
    }
}

/// Backend configuration and detection
pub mod config {
    /// Name of the default backend compiled in
    pub fn platform_mode() -> &'static str {
        #[cfg(feature = "posix")]
        return "posix";

        #[cfg(all(feature = "mock", not(feature = "posix")))]
        return "mock";

        #[cfg(not(any(feature = "posix", feature = "mock")))]
        compile_error!("No native backend selected. Enable the 'posix' or 'mock' feature.");
    }

    /// Mock backend compiled in
    pub const fn has_mock() -> bool {
        cfg!(feature = "mock")
    }

    /// POSIX backend compiled in
    pub const fn has_posix() -> bool {
        cfg!(feature = "posix")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        let mode = config::platform_mode();
        assert!(mode == "posix" || mode == "mock");
    }

    #[test]
    fn test_open_flags_access_mode() {
        assert!(OpenFlags::RDONLY.readable());
        assert!(!OpenFlags::RDONLY.writable());

        assert!(!OpenFlags::WRONLY.readable());
        assert!(OpenFlags::WRONLY.writable());

        let rw = OpenFlags::RDWR | OpenFlags::CREAT | OpenFlags::TRUNC;
        assert!(rw.readable());
        assert!(rw.writable());
    }

    #[test]
    fn test_open_flags_native_bits() {
        let flags = OpenFlags::WRONLY | OpenFlags::CREAT | OpenFlags::APPEND;
        assert_eq!(
            flags.bits(),
            libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND
        );
        assert_eq!(OpenFlags::RDONLY.bits(), libc::O_RDONLY);
    }

    #[test]
    fn test_errno_display() {
        let text = Errno::NOENT.to_string();
        assert!(text.starts_with(&format!("errno={}", libc::ENOENT)));
    }
}
