//! Descriptor and metadata operations
//!
//! Typed wrappers over the native primitives. Each converts the native
//! return into what the caller observes:
//! - `open` failures become `OpenFailed`
//! - `stat`/`fstat` failures become an absent result
//! - `close`/`unlink` failures are logged and dropped
//!
//! No descriptor table is kept here; handles belong to the OS.

use fsbind_native::{Diagnostics, FileStat, NativeFs, OpenFlags, RawFd};

use crate::config::FsConfig;
use crate::error::{FsError, Result};
use crate::flags::OpenMode;
use crate::resolve::DataSource;
use crate::transfer;

/// File operations over a native backend
pub struct FsBinding<F> {
    native: F,
    config: FsConfig,
}

impl<F: NativeFs> FsBinding<F> {
    pub fn new(native: F, config: FsConfig) -> Self {
        Self { native, config }
    }

    pub fn native(&self) -> &F {
        &self.native
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// Open `path` with a symbolic mode
    ///
    /// An unrecognized mode still reaches the native `open`, with flags 0,
    /// unless `strict_modes` is set.
    ///
    /// # Errors
    /// - `UnknownMode` for an unrecognized mode under `strict_modes`
    /// - `OpenFailed` carrying the native `errno`
    pub fn open_sync(&self, path: &str, mode: &str) -> Result<RawFd> {
        log::debug!(">> open_sync: path \"{}\", flags \"{}\"", path, mode);

        let open_mode = OpenMode::parse(mode);
        if !open_mode.is_recognized() {
            if self.config.strict_modes {
                return Err(FsError::UnknownMode {
                    mode: mode.to_string(),
                });
            }
            log::debug!("open_sync: unrecognized mode \"{}\", using flags 0", mode);
        }
        let flags = open_mode.flags();

        let fd = self.native.open(path, flags).map_err(|code| {
            log::debug!(
                "<< open_sync: open({}, {:#x}) failed: {}",
                path,
                flags.bits(),
                code
            );
            FsError::OpenFailed {
                path: path.to_string(),
                code,
            }
        })?;

        log::debug!("<< open_sync: fd {}", fd);
        Ok(fd)
    }

    /// Close a descriptor; failures are not reported
    pub fn close_sync(&self, fd: RawFd) {
        if let Err(code) = self.native.close(fd) {
            log::debug!("close_sync: close({}) failed: {}", fd, code);
        }
    }

    /// Read into `destination[write_offset..]`, at most `max_to_read` bytes
    ///
    /// See [`transfer::read_sync`] for the clamping rules.
    pub fn read_sync(
        &self,
        fd: RawFd,
        destination: &mut [u8],
        write_offset: usize,
        max_to_read: usize,
        position: Option<u64>,
    ) -> Result<usize> {
        log::debug!(
            ">> read_sync: fd {}, buffer {} bytes, writeOffset {}, maxToRead {}",
            fd,
            destination.len(),
            write_offset,
            max_to_read
        );
        let n = transfer::read_sync(
            &self.native,
            fd,
            destination,
            write_offset,
            max_to_read,
            position,
            self.config.read_position,
        )?;
        log::debug!("<< read_sync: sizeRead {}", n);
        Ok(n)
    }

    /// Write a window of `source`
    ///
    /// See [`transfer::write_sync`] for the clamping rules.
    pub fn write_sync(
        &self,
        fd: RawFd,
        source: &DataSource<'_>,
        offset: Option<usize>,
        length: Option<usize>,
    ) -> Result<usize> {
        transfer::write_sync(&self.native, fd, source, offset, length)
    }

    /// Metadata for `path`, or `None` if it cannot be stat'ed
    pub fn stat_sync(&self, path: &str) -> Option<FileStat> {
        self.native
            .stat(path)
            .map_err(|code| log::debug!("Error from stat of file {}: {}", path, code))
            .ok()
    }

    /// Metadata for `fd`, or `None` if it cannot be stat'ed
    pub fn fstat_sync(&self, fd: RawFd) -> Option<FileStat> {
        self.native
            .fstat(fd)
            .map_err(|code| log::debug!("Error from stat of fd {}: {}", fd, code))
            .ok()
    }

    /// Remove `path`; failures are not reported
    pub fn unlink(&self, path: &str) {
        if let Err(code) = self.native.unlink(path) {
            log::debug!("unlink({}) failed: {}", path, code);
        }
    }

    /// Whole contents of `path`, read in `load_chunk_size` units
    ///
    /// `None` if the file cannot be stat'ed, opened, or fully read.
    pub fn load_file(&self, path: &str) -> Option<Vec<u8>> {
        log::debug!(">> load_file: {}", path);
        let size = self.stat_sync(path)?.size;

        let fd = match self.native.open(path, OpenFlags::RDONLY) {
            Ok(fd) => fd,
            Err(code) => {
                log::debug!("load_file: open() {}", code);
                return None;
            }
        };

        let mut data = Vec::new();
        let mut unit = vec![0u8; self.config.load_chunk_size.max(1)];
        while (data.len() as u64) < size {
            match self.native.read(fd, &mut unit) {
                Ok(0) => {
                    log::debug!("load_file: early end of file after {} bytes", data.len());
                    self.close_sync(fd);
                    return None;
                }
                Ok(n) => data.extend_from_slice(&unit[..n]),
                Err(code) => {
                    log::debug!("load_file: read() {}", code);
                    self.close_sync(fd);
                    return None;
                }
            }
        }

        self.close_sync(fd);
        log::debug!("<< load_file: read file {} of length {}", path, data.len());
        Some(data)
    }
}

impl<F: NativeFs + Diagnostics> FsBinding<F> {
    /// Log every file on the mount
    pub fn dump(&self) {
        self.native.dump();
    }

    /// File names on the mount; empty if the listing fails
    pub fn list(&self) -> Vec<String> {
        self.native.list().unwrap_or_else(|code| {
            log::debug!("list: {}", code);
            Vec::new()
        })
    }
}
