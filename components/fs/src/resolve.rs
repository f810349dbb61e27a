//! Data argument resolution
//!
//! `writeSync` accepts either a binary buffer or a text string. Both are
//! resolved once, here, into a borrowed byte view; the transfer engine never
//! sees the dynamic value.

use crate::error::{FsError, Result};
use crate::value::Value;

/// Borrowed bytes of a data argument
///
/// Valid for the duration of one call only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource<'a> {
    /// A binary buffer, at its declared length
    Binary(&'a [u8]),
    /// A text string; its length is the UTF-8 byte length, not a character count
    Text(&'a str),
}

impl<'a> DataSource<'a> {
    /// Resolve argument `index`; anything but a buffer or string fails with `ArgumentKind`
    pub fn resolve(value: &'a Value, index: usize) -> Result<Self> {
        match value {
            Value::Buffer(buf) => Ok(DataSource::Binary(buf)),
            Value::String(text) => Ok(DataSource::Text(text)),
            _ => Err(FsError::ArgumentKind {
                index,
                expected: "buffer or string",
            }),
        }
    }

    pub fn bytes(&self) -> &'a [u8] {
        match *self {
            DataSource::Binary(buf) => buf,
            DataSource::Text(text) => text.as_bytes(),
        }
    }

    /// Capacity in bytes
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DataSource::Text(_))
    }
}
