//! POSIX backend
//!
//! Straight `libc` calls. Caller paths are taken relative to a mount root,
//! the way the device mounts its SPIFFS partition under one prefix.

use std::ffi::CString;
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::path::{Component, Path, PathBuf};

use crate::{Diagnostics, Errno, FileStat, NativeFs, NativeResult, OpenFlags, RawFd};

/// Permission bits for files created through `O_CREAT` (before umask)
const CREATE_MODE: libc::c_uint = 0o666;

/// Host filesystem mounted at `root`
#[derive(Debug, Clone)]
pub struct PosixFs {
    root: PathBuf,
}

impl PosixFs {
    /// Mount the host directory `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Mount root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a caller path beneath the mount root
    ///
    /// `..` components are refused with `EACCES` and interior NUL bytes with
    /// `EINVAL`; neither reaches a native call.
    fn native_path(&self, path: &str) -> NativeResult<CString> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(Errno(libc::EACCES));
        }
        let full = self.root.join(relative);
        CString::new(full.as_os_str().as_bytes()).map_err(|_| Errno::INVAL)
    }
}

fn stat_from_libc(st: &libc::stat) -> FileStat {
    FileStat {
        size: st.st_size.max(0) as u64,
    }
}

/// Turn a `ssize_t` return into a byte count or the current `errno`
fn check_len(rc: isize) -> NativeResult<usize> {
    if rc < 0 {
        Err(Errno::last())
    } else {
        Ok(rc as usize)
    }
}

fn check_rc(rc: libc::c_int) -> NativeResult<()> {
    if rc < 0 {
        Err(Errno::last())
    } else {
        Ok(())
    }
}

impl NativeFs for PosixFs {
    fn open(&self, path: &str, flags: OpenFlags) -> NativeResult<RawFd> {
        let cpath = self.native_path(path)?;
        let fd = unsafe { libc::open(cpath.as_ptr(), flags.bits(), CREATE_MODE) };
        if fd < 0 {
            return Err(Errno::last());
        }
        Ok(fd)
    }

    fn close(&self, fd: RawFd) -> NativeResult<()> {
        check_rc(unsafe { libc::close(fd) })
    }

    fn read(&self, fd: RawFd, buf: &mut [u8]) -> NativeResult<usize> {
        let rc = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        check_len(rc)
    }

    fn pread(&self, fd: RawFd, buf: &mut [u8], position: u64) -> NativeResult<usize> {
        let offset = libc::off_t::try_from(position).map_err(|_| Errno::INVAL)?;
        let rc = unsafe {
            libc::pread(
                fd,
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
                offset,
            )
        };
        check_len(rc)
    }

    fn write(&self, fd: RawFd, buf: &[u8]) -> NativeResult<usize> {
        let rc = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
        check_len(rc)
    }

    fn stat(&self, path: &str) -> NativeResult<FileStat> {
        let cpath = self.native_path(path)?;
        let mut st = unsafe { mem::zeroed::<libc::stat>() };
        check_rc(unsafe { libc::stat(cpath.as_ptr(), &mut st) })?;
        Ok(stat_from_libc(&st))
    }

    fn fstat(&self, fd: RawFd) -> NativeResult<FileStat> {
        let mut st = unsafe { mem::zeroed::<libc::stat>() };
        check_rc(unsafe { libc::fstat(fd, &mut st) })?;
        Ok(stat_from_libc(&st))
    }

    fn unlink(&self, path: &str) -> NativeResult<()> {
        let cpath = self.native_path(path)?;
        check_rc(unsafe { libc::unlink(cpath.as_ptr()) })
    }
}

impl Diagnostics for PosixFs {
    fn dump(&self) {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("dump: cannot read {}: {}", self.root.display(), e);
                return;
            }
        };

        log::info!("Files under {}:", self.root.display());
        let mut total = 0u64;
        for entry in entries.flatten() {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            total += size;
            log::info!("  {:>10}  {}", size, entry.file_name().to_string_lossy());
        }
        log::info!("  {:>10}  total", total);
    }

    fn list(&self) -> NativeResult<Vec<String>> {
        let entries = std::fs::read_dir(&self.root)
            .map_err(|e| Errno(e.raw_os_error().unwrap_or(libc::EIO)))?;

        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }
}
