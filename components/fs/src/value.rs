//! Caller values and argument access
//!
//! The script runtime hands every call a list of loosely-typed values. This
//! module holds that value model and the handful of accessors the bindings
//! need: read argument N as an integer, a string, a buffer, or a data source.
//! Everything downstream of these accessors works on plain Rust types.

use std::collections::BTreeMap;

use crate::error::{FsError, Result};
use crate::resolve::DataSource;

/// A loosely-typed caller value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Raw byte buffer, mutable in place by `readSync`
    Buffer(Vec<u8>),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Runtime type name, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Buffer(_) => "buffer",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_buffer(&self) -> Option<&[u8]> {
        match self {
            Value::Buffer(b) => Some(b),
            _ => None,
        }
    }

    /// Property lookup on an object value
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Object with a single numeric `size` property
    pub(crate) fn size_object(size: u64) -> Value {
        let mut map = BTreeMap::new();
        map.insert("size".to_string(), Value::Number(size as f64));
        Value::Object(map)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Buffer(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Buffer(b.to_vec())
    }
}

static UNDEFINED: Value = Value::Undefined;

/// Numeric coercion used for every integer argument
///
/// Truncates toward zero and saturates to the `i32` range; NaN reads as 0.
fn to_int(n: f64) -> i32 {
    n as i32
}

/// Arguments of one call
///
/// Indices past the supplied arguments read as `Undefined`.
pub struct CallArgs<'a> {
    args: &'a mut [Value],
}

impl<'a> CallArgs<'a> {
    pub fn new(args: &'a mut [Value]) -> Self {
        Self { args }
    }

    /// Number of supplied arguments
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn get(&self, index: usize) -> &Value {
        self.args.get(index).unwrap_or(&UNDEFINED)
    }

    pub fn is_number(&self, index: usize) -> bool {
        matches!(self.get(index), Value::Number(_))
    }

    pub fn is_string(&self, index: usize) -> bool {
        matches!(self.get(index), Value::String(_))
    }

    pub fn is_buffer(&self, index: usize) -> bool {
        matches!(self.get(index), Value::Buffer(_))
    }

    /// Integer, or 0 for anything that is not a number
    pub fn get_int(&self, index: usize) -> i32 {
        self.get(index).as_number().map_or(0, to_int)
    }

    /// Integer; non-numbers fail with `ArgumentKind`
    pub fn require_int(&self, index: usize) -> Result<i32> {
        self.get(index)
            .as_number()
            .map(to_int)
            .ok_or(FsError::ArgumentKind {
                index,
                expected: "integer",
            })
    }

    /// Unsigned size or offset; negative values clamp to 0
    pub fn require_index(&self, index: usize) -> Result<usize> {
        self.require_int(index).map(clamp_unsigned)
    }

    /// Optional unsigned size or offset; absent unless a number was passed
    pub fn get_index(&self, index: usize) -> Option<usize> {
        if self.is_number(index) {
            Some(clamp_unsigned(self.get_int(index)))
        } else {
            None
        }
    }

    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).as_str()
    }

    pub fn require_string(&self, index: usize) -> Result<&str> {
        self.get_string(index).ok_or(FsError::ArgumentKind {
            index,
            expected: "string",
        })
    }

    /// Borrow a buffer argument for writing in place
    pub fn require_buffer_mut(&mut self, index: usize) -> Result<&mut [u8]> {
        match self.args.get_mut(index) {
            Some(Value::Buffer(buf)) => Ok(buf.as_mut_slice()),
            _ => Err(FsError::ArgumentKind {
                index,
                expected: "buffer",
            }),
        }
    }

    /// Buffer or string argument as a byte source
    pub fn require_data(&self, index: usize) -> Result<DataSource<'_>> {
        DataSource::resolve(self.get(index), index)
    }
}

fn clamp_unsigned(n: i32) -> usize {
    usize::try_from(n).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_arguments_read_as_undefined() {
        let mut raw = vec![Value::from(1)];
        let args = CallArgs::new(&mut raw);
        assert_eq!(args.len(), 1);
        assert!(args.get(5).is_undefined());
        assert_eq!(args.get_int(5), 0);
        assert_eq!(args.get_string(5), None);
    }

    #[test]
    fn test_integer_coercion() {
        let mut raw = vec![
            Value::Number(3.9),
            Value::Number(-3.9),
            Value::Number(f64::NAN),
            Value::Number(1e12),
            Value::Number(-1e12),
            Value::from("7"),
        ];
        let args = CallArgs::new(&mut raw);
        assert_eq!(args.get_int(0), 3);
        assert_eq!(args.get_int(1), -3);
        assert_eq!(args.get_int(2), 0);
        assert_eq!(args.get_int(3), i32::MAX);
        assert_eq!(args.get_int(4), i32::MIN);
        // Strings are not numbers
        assert_eq!(args.get_int(5), 0);
        assert_eq!(
            args.require_int(5),
            Err(FsError::ArgumentKind {
                index: 5,
                expected: "integer"
            })
        );
    }

    #[test]
    fn test_negative_indices_clamp_to_zero() {
        let mut raw = vec![Value::from(-10), Value::Null, Value::from(12)];
        let args = CallArgs::new(&mut raw);
        assert_eq!(args.require_index(0).unwrap(), 0);
        assert_eq!(args.get_index(0), Some(0));
        assert_eq!(args.get_index(1), None);
        assert_eq!(args.get_index(2), Some(12));
        assert!(args.require_index(1).is_err());
    }

    #[test]
    fn test_strings() {
        let mut raw = vec![Value::from("/a.txt"), Value::from(vec![1u8, 2])];
        let args = CallArgs::new(&mut raw);
        assert_eq!(args.require_string(0).unwrap(), "/a.txt");
        assert!(args.is_string(0));
        assert!(args.require_string(1).is_err());
    }

    #[test]
    fn test_buffer_is_mutated_in_place() {
        let mut raw = vec![Value::from(vec![0u8; 4])];
        {
            let mut args = CallArgs::new(&mut raw);
            assert!(args.is_buffer(0));
            let buf = args.require_buffer_mut(0).unwrap();
            buf[1] = 9;
        }
        assert_eq!(raw[0], Value::Buffer(vec![0, 9, 0, 0]));
    }

    #[test]
    fn test_buffer_required() {
        let mut raw = vec![Value::from("text")];
        let mut args = CallArgs::new(&mut raw);
        assert_eq!(
            args.require_buffer_mut(0),
            Err(FsError::ArgumentKind {
                index: 0,
                expected: "buffer"
            })
        );
        assert!(args.require_buffer_mut(3).is_err());
    }

    #[test]
    fn test_size_object() {
        let value = Value::size_object(42);
        assert_eq!(value.type_name(), "object");
        assert_eq!(value.get("size"), Some(&Value::Number(42.0)));
    }
}
