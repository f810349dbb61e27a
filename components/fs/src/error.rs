//! Binding error types

use fsbind_native::Errno;
use thiserror::Error;

/// Errors surfaced to the caller as a failed call
///
/// "Does not exist" is not an error here: `statSync`/`fstatSync` report it
/// as an absent result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    /// Wrong argument type, or a required argument is missing
    #[error("argument {index}: expected {expected}")]
    ArgumentKind {
        index: usize,
        expected: &'static str,
    },

    /// A path or mode argument could not be read as a string
    #[error("unable to get {what}")]
    InvalidArgument { what: &'static str },

    /// Unrecognized open mode, only raised when strict modes are enabled
    #[error("unrecognized open mode \"{mode}\"")]
    UnknownMode { mode: String },

    #[error("open({path}) failed: {code}")]
    OpenFailed { path: String, code: Errno },

    /// Native read/write reported an error
    #[error("transfer failed: {code}")]
    TransferFailed { code: Errno },

    /// Read destination offset is not inside the destination buffer
    #[error("invalid writeOffset {offset} for a buffer of {capacity} bytes")]
    OffsetOutOfRange { offset: usize, capacity: usize },

    #[error("no function named \"{name}\"")]
    UnknownFunction { name: String },
}

pub type Result<T> = core::result::Result<T, FsError>;
