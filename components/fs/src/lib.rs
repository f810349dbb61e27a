//! File-Operations Binding - synchronous file I/O for an embedded script host
//!
//! # Purpose
//! Exposes `openSync`, `closeSync`, `readSync`, `writeSync`, `statSync`,
//! `fstatSync` and `unlink` to scripts, translating each call into native
//! POSIX-style primitives. Descriptors are the OS's own; this layer keeps no
//! file table.
//!
//! # Integration Points
//! - Depends on: `fsbind-native` (open/read/write/close/stat/unlink)
//! - Provides to: a script host, through [`FsModule::invoke`]
//! - Registered under: the configured namespace (`FS` by default)
//!
//! # Architecture
//! - [`flags`]: symbolic open modes to native flag bits
//! - [`value`] / [`resolve`]: host values, argument access, byte sources
//! - [`transfer`]: clamped read/write windows
//! - [`ops`]: typed operations over a [`NativeFs`] backend
//! - [`module`]: the name/arity function table
//!
//! # Testing Strategy
//! - Unit tests: against `MockFs`, which records every native call
//! - Integration tests: `PosixFs` rooted in a temporary directory
//! - Benchmarks: transfer window clamping and windowed writes
//!
//! # Example
//!
//! ```
//! use fsbind::{FsConfig, FsModule, PosixFs, Value};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let fs = FsModule::new(PosixFs::new(dir.path()), FsConfig::default());
//!
//! let fd = fs
//!     .invoke("openSync", &mut [Value::from("/hello.txt"), Value::from("w")])
//!     .unwrap();
//! let n = fs.invoke("writeSync", &mut [fd.clone(), Value::from("hello")]).unwrap();
//! assert_eq!(n, Value::Number(5.0));
//! fs.invoke("closeSync", &mut [fd]).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod flags;
pub mod logging;
pub mod module;
pub mod ops;
pub mod resolve;
pub mod transfer;
pub mod value;

pub use config::{ConfigError, FsConfig, ReadPosition};
pub use error::{FsError, Result};
pub use flags::{translate, OpenMode};
pub use module::{FsModule, FunctionEntry};
pub use ops::FsBinding;
pub use resolve::DataSource;
pub use transfer::TransferWindow;
pub use value::{CallArgs, Value};

pub use fsbind_native::{Diagnostics, Errno, FileStat, NativeFs, OpenFlags, RawFd};

#[cfg(feature = "posix")]
pub use fsbind_native::PosixFs;

#[cfg(feature = "mock")]
pub use fsbind_native::{MockFs, NativeCall};
