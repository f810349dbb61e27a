//! Open-mode translation
//!
//! Maps the caller's symbolic mode strings onto native `open(2)` flags.
//! Matching is exact and case-sensitive. Anything else becomes
//! [`OpenMode::Unrecognized`], which translates to the empty flag set and is
//! still handed to the native `open`.

use fsbind_native::OpenFlags;

/// Symbolic open mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// `"r"`
    Read,
    /// `"r+"`
    ReadWrite,
    /// `"w"`
    WriteTruncate,
    /// `"w+"`
    ReadWriteTruncate,
    /// `"a"`
    Append,
    /// `"a+"`
    AppendReadWrite,
    /// Any other token; flags are 0
    Unrecognized,
}

impl OpenMode {
    /// Every recognized mode, in table order
    pub const ALL: [OpenMode; 6] = [
        OpenMode::Read,
        OpenMode::ReadWrite,
        OpenMode::WriteTruncate,
        OpenMode::ReadWriteTruncate,
        OpenMode::Append,
        OpenMode::AppendReadWrite,
    ];

    pub fn parse(token: &str) -> Self {
        match token {
            "r" => OpenMode::Read,
            "r+" => OpenMode::ReadWrite,
            "w" => OpenMode::WriteTruncate,
            "w+" => OpenMode::ReadWriteTruncate,
            "a" => OpenMode::Append,
            "a+" => OpenMode::AppendReadWrite,
            _ => OpenMode::Unrecognized,
        }
    }

    /// Native flags for this mode
    pub fn flags(self) -> OpenFlags {
        match self {
            OpenMode::Read => OpenFlags::RDONLY,
            OpenMode::ReadWrite => OpenFlags::RDWR,
            OpenMode::WriteTruncate => OpenFlags::WRONLY | OpenFlags::CREAT | OpenFlags::TRUNC,
            OpenMode::ReadWriteTruncate => OpenFlags::RDWR | OpenFlags::CREAT | OpenFlags::TRUNC,
            OpenMode::Append => OpenFlags::WRONLY | OpenFlags::CREAT | OpenFlags::APPEND,
            OpenMode::AppendReadWrite => OpenFlags::RDWR | OpenFlags::CREAT | OpenFlags::APPEND,
            OpenMode::Unrecognized => OpenFlags::empty(),
        }
    }

    /// The token this mode was parsed from, if recognized
    pub fn token(self) -> Option<&'static str> {
        match self {
            OpenMode::Read => Some("r"),
            OpenMode::ReadWrite => Some("r+"),
            OpenMode::WriteTruncate => Some("w"),
            OpenMode::ReadWriteTruncate => Some("w+"),
            OpenMode::Append => Some("a"),
            OpenMode::AppendReadWrite => Some("a+"),
            OpenMode::Unrecognized => None,
        }
    }

    pub fn is_recognized(self) -> bool {
        self != OpenMode::Unrecognized
    }
}

/// Mode string to native flags
pub fn translate(mode: &str) -> OpenFlags {
    OpenMode::parse(mode).flags()
}
