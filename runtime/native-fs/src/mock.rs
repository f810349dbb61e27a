//! MOCK native backend for tests
//!
//! In-memory files with POSIX-like descriptor semantics. Every native call is
//! recorded so tests can assert which primitives actually ran, and read,
//! write and close failures can be injected.
//!
//! Descriptors start at 3 and the lowest free number is reused, as on a
//! real descriptor table. Unlinking a name leaves open descriptors on the
//! underlying file usable until they are closed.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::{Diagnostics, Errno, FileStat, NativeFs, NativeResult, OpenFlags, RawFd};

/// First descriptor handed out (0-2 are the standard streams)
const FIRST_FD: RawFd = 3;

/// One recorded native call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    Open { path: String, flags: OpenFlags },
    Close { fd: RawFd },
    Read { fd: RawFd, len: usize },
    Pread { fd: RawFd, len: usize, position: u64 },
    Write { fd: RawFd, data: Vec<u8> },
    Stat { path: String },
    Fstat { fd: RawFd },
    Unlink { path: String },
}

#[derive(Debug)]
struct OpenFile {
    inode: usize,
    flags: OpenFlags,
    pos: usize,
}

#[derive(Debug, Default)]
struct MockState {
    /// name -> inode
    names: BTreeMap<String, usize>,
    /// inode -> contents
    inodes: Vec<Vec<u8>>,
    descriptors: BTreeMap<RawFd, OpenFile>,
    calls: Vec<NativeCall>,
    read_error: Option<Errno>,
    write_error: Option<Errno>,
    close_error: Option<Errno>,
    write_limit: Option<usize>,
}

impl MockState {
    fn next_fd(&self) -> RawFd {
        let mut fd = FIRST_FD;
        while self.descriptors.contains_key(&fd) {
            fd += 1;
        }
        fd
    }

    fn create(&mut self, name: String) -> usize {
        self.inodes.push(Vec::new());
        let inode = self.inodes.len() - 1;
        self.names.insert(name, inode);
        inode
    }
}

fn key(path: &str) -> NativeResult<String> {
    let name = path.trim_start_matches('/');
    if name.is_empty() {
        return Err(Errno::ISDIR);
    }
    if name.contains('\0') {
        return Err(Errno::INVAL);
    }
    Ok(name.to_string())
}

/// In-memory recording filesystem
#[derive(Debug, Default)]
pub struct MockFs {
    state: RefCell<MockState>,
}

impl MockFs {
    /// Empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: seed a file
    pub fn with_file(self, path: &str, contents: &[u8]) -> Self {
        self.put_file(path, contents);
        self
    }

    /// Create or replace a file
    pub fn put_file(&self, path: &str, contents: &[u8]) {
        let name = path.trim_start_matches('/').to_string();
        let mut state = self.state.borrow_mut();
        let existing = state.names.get(&name).copied();
        let inode = match existing {
            Some(inode) => inode,
            None => state.create(name),
        };
        state.inodes[inode] = contents.to_vec();
    }

    /// Current contents of a file, if the name exists
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        let state = self.state.borrow();
        let name = path.trim_start_matches('/');
        state
            .names
            .get(name)
            .map(|&inode| state.inodes[inode].clone())
    }

    /// Every native call made so far, oldest first
    pub fn calls(&self) -> Vec<NativeCall> {
        self.state.borrow().calls.clone()
    }

    /// Forget the recorded calls
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Number of descriptors currently open
    pub fn open_descriptors(&self) -> usize {
        self.state.borrow().descriptors.len()
    }

    /// Make every subsequent `read`/`pread` fail with `errno` (None to stop)
    pub fn inject_read_error(&self, errno: Option<Errno>) {
        self.state.borrow_mut().read_error = errno;
    }

    /// Make every subsequent `write` fail with `errno` (None to stop)
    pub fn inject_write_error(&self, errno: Option<Errno>) {
        self.state.borrow_mut().write_error = errno;
    }

    /// Make every subsequent `close` report `errno` after releasing the descriptor
    pub fn inject_close_error(&self, errno: Option<Errno>) {
        self.state.borrow_mut().close_error = errno;
    }

    /// Cap each `write` at `limit` bytes to simulate partial writes
    pub fn limit_writes(&self, limit: Option<usize>) {
        self.state.borrow_mut().write_limit = limit;
    }

    fn record(&self, call: NativeCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl NativeFs for MockFs {
    fn open(&self, path: &str, flags: OpenFlags) -> NativeResult<RawFd> {
        self.record(NativeCall::Open {
            path: path.to_string(),
            flags,
        });
        let name = key(path)?;

        let mut state = self.state.borrow_mut();
        let existing = state.names.get(&name).copied();
        let inode = match existing {
            Some(inode) => inode,
            None if flags.contains(OpenFlags::CREAT) => state.create(name),
            None => return Err(Errno::NOENT),
        };
        if flags.contains(OpenFlags::TRUNC) && flags.writable() {
            state.inodes[inode].clear();
        }

        let fd = state.next_fd();
        state.descriptors.insert(
            fd,
            OpenFile {
                inode,
                flags,
                pos: 0,
            },
        );
        Ok(fd)
    }

    fn close(&self, fd: RawFd) -> NativeResult<()> {
        self.record(NativeCall::Close { fd });
        let mut state = self.state.borrow_mut();
        state.descriptors.remove(&fd).ok_or(Errno::BADF)?;
        match state.close_error {
            Some(errno) => Err(errno),
            None => Ok(()),
        }
    }

    fn read(&self, fd: RawFd, buf: &mut [u8]) -> NativeResult<usize> {
        self.record(NativeCall::Read { fd, len: buf.len() });
        let mut state = self.state.borrow_mut();
        if let Some(errno) = state.read_error {
            return Err(errno);
        }

        let (inode, pos) = match state.descriptors.get(&fd) {
            Some(file) if file.flags.readable() => (file.inode, file.pos),
            _ => return Err(Errno::BADF),
        };
        let data = &state.inodes[inode];
        let start = pos.min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);

        if let Some(file) = state.descriptors.get_mut(&fd) {
            file.pos = start + n;
        }
        Ok(n)
    }

    fn pread(&self, fd: RawFd, buf: &mut [u8], position: u64) -> NativeResult<usize> {
        self.record(NativeCall::Pread {
            fd,
            len: buf.len(),
            position,
        });
        let state = self.state.borrow();
        if let Some(errno) = state.read_error {
            return Err(errno);
        }

        let inode = match state.descriptors.get(&fd) {
            Some(file) if file.flags.readable() => file.inode,
            _ => return Err(Errno::BADF),
        };
        let data = &state.inodes[inode];
        let start = usize::try_from(position)
            .unwrap_or(usize::MAX)
            .min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn write(&self, fd: RawFd, buf: &[u8]) -> NativeResult<usize> {
        self.record(NativeCall::Write {
            fd,
            data: buf.to_vec(),
        });
        let mut state = self.state.borrow_mut();
        if let Some(errno) = state.write_error {
            return Err(errno);
        }
        let n = state.write_limit.map_or(buf.len(), |limit| buf.len().min(limit));

        let (inode, flags, pos) = match state.descriptors.get(&fd) {
            Some(file) if file.flags.writable() => (file.inode, file.flags, file.pos),
            _ => return Err(Errno::BADF),
        };
        let data = &mut state.inodes[inode];
        let start = if flags.contains(OpenFlags::APPEND) {
            data.len()
        } else {
            pos
        };
        if data.len() < start + n {
            data.resize(start + n, 0);
        }
        data[start..start + n].copy_from_slice(&buf[..n]);

        if let Some(file) = state.descriptors.get_mut(&fd) {
            file.pos = start + n;
        }
        Ok(n)
    }

    fn stat(&self, path: &str) -> NativeResult<FileStat> {
        self.record(NativeCall::Stat {
            path: path.to_string(),
        });
        let name = key(path)?;
        let state = self.state.borrow();
        let inode = *state.names.get(&name).ok_or(Errno::NOENT)?;
        Ok(FileStat {
            size: state.inodes[inode].len() as u64,
        })
    }

    fn fstat(&self, fd: RawFd) -> NativeResult<FileStat> {
        self.record(NativeCall::Fstat { fd });
        let state = self.state.borrow();
        let file = state.descriptors.get(&fd).ok_or(Errno::BADF)?;
        Ok(FileStat {
            size: state.inodes[file.inode].len() as u64,
        })
    }

    fn unlink(&self, path: &str) -> NativeResult<()> {
        self.record(NativeCall::Unlink {
            path: path.to_string(),
        });
        let name = key(path)?;
        self.state
            .borrow_mut()
            .names
            .remove(&name)
            .map(|_| ())
            .ok_or(Errno::NOENT)
    }
}

impl Diagnostics for MockFs {
    fn dump(&self) {
        let state = self.state.borrow();
        log::info!("Mock files:");
        for (name, &inode) in &state.names {
            log::info!("  {:>10}  {}", state.inodes[inode].len(), name);
        }
    }

    fn list(&self) -> NativeResult<Vec<String>> {
        Ok(self.state.borrow().names.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_numbers_are_reused() {
        let fs = MockFs::new().with_file("/a", b"");
        let fd = fs.open("/a", OpenFlags::RDONLY).unwrap();
        assert_eq!(fd, 3);
        let fd2 = fs.open("/a", OpenFlags::RDONLY).unwrap();
        assert_eq!(fd2, 4);
        fs.close(fd).unwrap();
        assert_eq!(fs.open("/a", OpenFlags::RDONLY).unwrap(), 3);
    }

    #[test]
    fn test_access_mode_is_enforced() {
        let fs = MockFs::new().with_file("/a", b"abc");
        let ro = fs.open("/a", OpenFlags::RDONLY).unwrap();
        assert_eq!(fs.write(ro, b"x").unwrap_err(), Errno::BADF);

        let wo = fs.open("/a", OpenFlags::WRONLY).unwrap();
        let mut buf = [0u8; 3];
        assert_eq!(fs.read(wo, &mut buf).unwrap_err(), Errno::BADF);
    }

    #[test]
    fn test_truncate_and_append() {
        let fs = MockFs::new().with_file("/log", b"old");
        let fd = fs
            .open("/log", OpenFlags::WRONLY | OpenFlags::CREAT | OpenFlags::APPEND)
            .unwrap();
        fs.write(fd, b"+new").unwrap();
        assert_eq!(fs.contents("/log").unwrap(), b"old+new");

        let fd = fs
            .open("/log", OpenFlags::WRONLY | OpenFlags::CREAT | OpenFlags::TRUNC)
            .unwrap();
        assert_eq!(fs.contents("/log").unwrap(), b"");
        fs.write(fd, b"x").unwrap();
        assert_eq!(fs.contents("/log").unwrap(), b"x");
    }

    #[test]
    fn test_open_missing_without_create() {
        let fs = MockFs::new();
        assert_eq!(
            fs.open("/missing", OpenFlags::RDWR).unwrap_err(),
            Errno::NOENT
        );
        assert!(fs.contents("/missing").is_none());
    }

    #[test]
    fn test_unlinked_file_stays_readable_through_open_descriptor() {
        let fs = MockFs::new().with_file("/a", b"data");
        let fd = fs.open("/a", OpenFlags::RDONLY).unwrap();
        fs.unlink("/a").unwrap();
        assert_eq!(fs.stat("/a").unwrap_err(), Errno::NOENT);
        assert_eq!(fs.fstat(fd).unwrap().size, 4);
    }

    #[test]
    fn test_calls_are_recorded() {
        let fs = MockFs::new();
        let _ = fs.stat("/x");
        let _ = fs.close(9);
        assert_eq!(
            fs.calls(),
            vec![
                NativeCall::Stat { path: "/x".into() },
                NativeCall::Close { fd: 9 },
            ]
        );
        fs.clear_calls();
        assert!(fs.calls().is_empty());
    }

    #[test]
    fn test_partial_writes() {
        let fs = MockFs::new();
        fs.limit_writes(Some(2));
        let fd = fs
            .open("/p", OpenFlags::WRONLY | OpenFlags::CREAT)
            .unwrap();
        assert_eq!(fs.write(fd, b"hello").unwrap(), 2);
        assert_eq!(fs.contents("/p").unwrap(), b"he");
    }
}
