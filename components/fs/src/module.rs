//! Module surface
//!
//! The function table a host installs under its namespace (`FS` by
//! default). Each entry has a stable name and arity; the handler reads its
//! arguments through [`CallArgs`] and hands typed values to [`FsBinding`].
//!
//! | name | arity | result |
//! |---|---|---|
//! | `openSync(path, flags)` | 2 | fd |
//! | `closeSync(fd)` | 1 | undefined |
//! | `readSync(fd, buffer, writeOffset, maxToRead, position)` | 5 | bytes read |
//! | `writeSync(fd, data, offset, length)` | 4 | bytes written |
//! | `statSync(path)` | 1 | `{size}` or undefined |
//! | `fstatSync(fd)` | 1 | `{size}` or undefined |
//! | `unlink(path)` | 1 | undefined |
//! | `dump()` | 0 | undefined |
//! | `spiffsDir()` | 0 | array of names |
//! | `loadFile(path)` | 1 | string or null |

use fsbind_native::{Diagnostics, NativeFs};

use crate::config::FsConfig;
use crate::error::{FsError, Result};
use crate::ops::FsBinding;
use crate::value::{CallArgs, Value};

type Handler<F> = fn(&FsBinding<F>, &mut CallArgs<'_>) -> Result<Value>;

/// One registered function
pub struct FunctionEntry<F> {
    pub name: &'static str,
    pub arity: usize,
    handler: Handler<F>,
}

impl<F> Clone for FunctionEntry<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for FunctionEntry<F> {}

/// The file module: bindings plus their function table
pub struct FsModule<F> {
    binding: FsBinding<F>,
    functions: Vec<FunctionEntry<F>>,
}

impl<F: NativeFs + Diagnostics> FsModule<F> {
    pub fn new(native: F, config: FsConfig) -> Self {
        Self {
            binding: FsBinding::new(native, config),
            functions: function_table(),
        }
    }

    /// Namespace the host should register the table under
    pub fn namespace(&self) -> &str {
        &self.binding.config().namespace
    }

    /// `(name, arity)` of every function, in registration order
    pub fn functions(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.functions.iter().map(|f| (f.name, f.arity))
    }

    pub fn binding(&self) -> &FsBinding<F> {
        &self.binding
    }

    /// Call a function by name
    ///
    /// The handler sees exactly `arity` arguments: missing ones read as
    /// `Undefined` and extras are dropped. Buffer arguments are updated in
    /// place.
    pub fn invoke(&self, name: &str, args: &mut [Value]) -> Result<Value> {
        let entry = self
            .functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FsError::UnknownFunction {
                name: name.to_string(),
            })?;

        let supplied = args.len().min(entry.arity);
        let mut call = CallArgs::new(&mut args[..supplied]);
        (entry.handler)(&self.binding, &mut call)
    }
}

fn function_table<F: NativeFs + Diagnostics>() -> Vec<FunctionEntry<F>> {
    vec![
        FunctionEntry {
            name: "openSync",
            arity: 2,
            handler: js_open_sync,
        },
        FunctionEntry {
            name: "closeSync",
            arity: 1,
            handler: js_close_sync,
        },
        FunctionEntry {
            name: "readSync",
            arity: 5,
            handler: js_read_sync,
        },
        FunctionEntry {
            name: "writeSync",
            arity: 4,
            handler: js_write_sync,
        },
        FunctionEntry {
            name: "statSync",
            arity: 1,
            handler: js_stat_sync,
        },
        FunctionEntry {
            name: "fstatSync",
            arity: 1,
            handler: js_fstat_sync,
        },
        FunctionEntry {
            name: "unlink",
            arity: 1,
            handler: js_unlink,
        },
        FunctionEntry {
            name: "dump",
            arity: 0,
            handler: js_dump,
        },
        FunctionEntry {
            name: "spiffsDir",
            arity: 0,
            handler: js_spiffs_dir,
        },
        FunctionEntry {
            name: "loadFile",
            arity: 1,
            handler: js_load_file,
        },
    ]
}

// [0] path, [1] flags
fn js_open_sync<F: NativeFs>(fs: &FsBinding<F>, args: &mut CallArgs<'_>) -> Result<Value> {
    let path = args
        .get_string(0)
        .ok_or(FsError::InvalidArgument { what: "path" })?;
    let flags = args
        .get_string(1)
        .ok_or(FsError::InvalidArgument { what: "flags" })?;

    fs.open_sync(path, flags).map(Value::from)
}

// [0] fd
fn js_close_sync<F: NativeFs>(fs: &FsBinding<F>, args: &mut CallArgs<'_>) -> Result<Value> {
    let fd = args.require_int(0)?;
    fs.close_sync(fd);
    Ok(Value::Undefined)
}

// [0] fd, [1] buffer, [2] writeOffset, [3] maxToRead, [4] position (optional)
fn js_read_sync<F: NativeFs>(fs: &FsBinding<F>, args: &mut CallArgs<'_>) -> Result<Value> {
    let fd = args.require_int(0)?;
    let write_offset = args.require_index(2)?;
    let max_to_read = args.require_index(3)?;
    let position = args.get_index(4).map(|p| p as u64);
    let buffer = args.require_buffer_mut(1)?;

    match fs.read_sync(fd, buffer, write_offset, max_to_read, position) {
        Ok(n) => Ok(Value::from(n)),
        Err(FsError::TransferFailed { code }) => {
            log::debug!("readSync: fd {}: {}; reporting 0 bytes", fd, code);
            Ok(Value::from(0))
        }
        Err(e) => Err(e),
    }
}

// [0] fd, [1] buffer or string, [2] offset (optional), [3] length (optional)
fn js_write_sync<F: NativeFs>(fs: &FsBinding<F>, args: &mut CallArgs<'_>) -> Result<Value> {
    let fd = args.require_int(0)?;
    let offset = args.get_index(2);
    let length = args.get_index(3);
    let source = args.require_data(1)?;

    fs.write_sync(fd, &source, offset, length).map(Value::from)
}

// [0] path
fn js_stat_sync<F: NativeFs>(fs: &FsBinding<F>, args: &mut CallArgs<'_>) -> Result<Value> {
    let path = args.require_string(0)?;
    Ok(fs
        .stat_sync(path)
        .map_or(Value::Undefined, |st| Value::size_object(st.size)))
}

// [0] fd
fn js_fstat_sync<F: NativeFs>(fs: &FsBinding<F>, args: &mut CallArgs<'_>) -> Result<Value> {
    let fd = args.require_int(0)?;
    Ok(fs
        .fstat_sync(fd)
        .map_or(Value::Undefined, |st| Value::size_object(st.size)))
}

// [0] path
fn js_unlink<F: NativeFs>(fs: &FsBinding<F>, args: &mut CallArgs<'_>) -> Result<Value> {
    let path = args.require_string(0)?;
    fs.unlink(path);
    Ok(Value::Undefined)
}

fn js_dump<F: NativeFs + Diagnostics>(
    fs: &FsBinding<F>,
    _args: &mut CallArgs<'_>,
) -> Result<Value> {
    fs.dump();
    Ok(Value::Undefined)
}

fn js_spiffs_dir<F: NativeFs + Diagnostics>(
    fs: &FsBinding<F>,
    _args: &mut CallArgs<'_>,
) -> Result<Value> {
    Ok(Value::Array(
        fs.list().into_iter().map(Value::String).collect(),
    ))
}

// [0] path
fn js_load_file<F: NativeFs>(fs: &FsBinding<F>, args: &mut CallArgs<'_>) -> Result<Value> {
    let Some(path) = args.get_string(0) else {
        log::debug!("loadFile: no path supplied");
        return Ok(Value::Null);
    };
    Ok(fs.load_file(path).map_or(Value::Null, |data| {
        Value::String(String::from_utf8_lossy(&data).into_owned())
    }))
}
