//! Bounds-safe transfer engine
//!
//! Caller-supplied offsets and lengths are never trusted. Each request is
//! reduced to a [`TransferWindow`] that satisfies
//! `offset + length <= capacity` before any native call sees the buffer.
//!
//! # Write clamping
//! 1. offset defaults to 0 and is clamped to the capacity
//! 2. length defaults to the capacity and is clamped to it
//! 3. length is clamped again to the room left after the offset
//!
//! A write whose offset lands at or past the end still reaches the native
//! `write`, with length 0.
//!
//! # Read clamping
//! A destination offset outside the buffer is rejected before the native
//! `read`. Otherwise the read width is clamped to the capacity, then to the
//! room left after the offset.

use core::ops::Range;

use fsbind_native::{NativeFs, RawFd};

use crate::config::ReadPosition;
use crate::error::{FsError, Result};
use crate::resolve::DataSource;

/// Clamped sub-range of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferWindow {
    pub offset: usize,
    pub length: usize,
}

impl TransferWindow {
    /// Window over a write source of `capacity` bytes
    pub fn for_write(capacity: usize, offset: Option<usize>, length: Option<usize>) -> Self {
        let mut offset = offset.unwrap_or(0);
        if offset > capacity {
            log::warn!("Specified offset {} is > buffer size {}", offset, capacity);
            offset = capacity;
        }

        let mut length = length.unwrap_or(capacity);
        if length > capacity {
            log::warn!("Specified length is > buffer size");
            length = capacity;
        }

        let room = capacity - offset;
        if length > room {
            log::warn!("Specified length + offset is > buffer size");
            length = room;
        }

        Self { offset, length }
    }

    /// Window over a read destination of `capacity` bytes
    ///
    /// # Errors
    /// `OffsetOutOfRange` if `write_offset` is not inside the buffer
    pub fn for_read(capacity: usize, write_offset: usize, max_to_read: usize) -> Result<Self> {
        if write_offset >= capacity {
            log::debug!("Invalid writeOffset {} (buffer size {})", write_offset, capacity);
            return Err(FsError::OffsetOutOfRange {
                offset: write_offset,
                capacity,
            });
        }

        let length = max_to_read.min(capacity).min(capacity - write_offset);
        Ok(Self {
            offset: write_offset,
            length,
        })
    }

    /// One past the last byte
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Write a clamped window of `source` to `fd`
///
/// Returns the native byte count, which may be short on a partial write.
///
/// # Errors
/// `TransferFailed` if the native `write` fails. The error is never folded
/// into the byte count.
pub fn write_sync<F: NativeFs + ?Sized>(
    native: &F,
    fd: RawFd,
    source: &DataSource<'_>,
    offset: Option<usize>,
    length: Option<usize>,
) -> Result<usize> {
    let bytes = source.bytes();
    let window = TransferWindow::for_write(bytes.len(), offset, length);

    native.write(fd, &bytes[window.range()]).map_err(|code| {
        log::debug!("writeSync: write() error: {}", code);
        FsError::TransferFailed { code }
    })
}

/// Read from `fd` into a clamped window of `destination`
///
/// `position` is only applied under [`ReadPosition::Honor`]; otherwise the
/// read happens at the descriptor's file pointer. Returns the bytes read,
/// 0 at end of file.
///
/// # Errors
/// - `OffsetOutOfRange` if `write_offset` is outside `destination`; the
///   native `read` is never invoked
/// - `TransferFailed` if the native read fails
pub fn read_sync<F: NativeFs + ?Sized>(
    native: &F,
    fd: RawFd,
    destination: &mut [u8],
    write_offset: usize,
    max_to_read: usize,
    position: Option<u64>,
    policy: ReadPosition,
) -> Result<usize> {
    let window = TransferWindow::for_read(destination.len(), write_offset, max_to_read)?;
    let target = &mut destination[window.range()];

    let result = match (policy, position) {
        (ReadPosition::Honor, Some(position)) => native.pread(fd, target, position),
        _ => native.read(fd, target),
    };

    result.map_err(|code| {
        log::debug!("readSync: read() error: {}", code);
        FsError::TransferFailed { code }
    })
}
