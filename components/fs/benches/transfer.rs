use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use fsbind::{
    transfer, DataSource, Diagnostics, FileStat, FsConfig, FsModule, NativeFs, OpenFlags, RawFd,
    TransferWindow, Value,
};
use fsbind_native::{Errno, NativeResult};

/// Backend that accepts every write and reads zeros
struct NullFs;

impl NativeFs for NullFs {
    fn open(&self, _path: &str, _flags: OpenFlags) -> NativeResult<RawFd> {
        Ok(3)
    }

    fn close(&self, _fd: RawFd) -> NativeResult<()> {
        Ok(())
    }

    fn read(&self, _fd: RawFd, buf: &mut [u8]) -> NativeResult<usize> {
        buf.fill(0);
        Ok(buf.len())
    }

    fn pread(&self, fd: RawFd, buf: &mut [u8], _position: u64) -> NativeResult<usize> {
        self.read(fd, buf)
    }

    fn write(&self, _fd: RawFd, buf: &[u8]) -> NativeResult<usize> {
        Ok(buf.len())
    }

    fn stat(&self, _path: &str) -> NativeResult<FileStat> {
        Err(Errno::NOENT)
    }

    fn fstat(&self, _fd: RawFd) -> NativeResult<FileStat> {
        Err(Errno::BADF)
    }

    fn unlink(&self, _path: &str) -> NativeResult<()> {
        Ok(())
    }
}

impl Diagnostics for NullFs {
    fn dump(&self) {}

    fn list(&self) -> NativeResult<Vec<String>> {
        Ok(Vec::new())
    }
}

fn bench_window(c: &mut Criterion) {
    c.bench_function("window for_write in range", |b| {
        b.iter(|| {
            TransferWindow::for_write(black_box(4096), black_box(Some(128)), black_box(Some(512)))
        })
    });
    c.bench_function("window for_read in range", |b| {
        b.iter(|| TransferWindow::for_read(black_box(4096), black_box(128), black_box(512)))
    });
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_sync");
    for size in [64usize, 1024, 16 * 1024] {
        let data = vec![0xA5u8; size];
        let text = "x".repeat(size);

        group.bench_with_input(BenchmarkId::new("buffer", size), &data, |b, data| {
            let source = DataSource::Binary(data);
            b.iter(|| transfer::write_sync(&NullFs, 3, black_box(&source), None, None))
        });
        group.bench_with_input(BenchmarkId::new("text", size), &text, |b, text| {
            let source = DataSource::Text(text);
            b.iter(|| transfer::write_sync(&NullFs, 3, black_box(&source), Some(1), None))
        });
    }
    group.finish();
}

fn bench_surface(c: &mut Criterion) {
    let module = FsModule::new(NullFs, FsConfig::default());
    let fd = module
        .invoke("openSync", &mut [Value::from("/data.bin"), Value::from("r")])
        .expect("open");

    c.bench_function("invoke readSync 4KiB", |b| {
        let mut args = [
            fd.clone(),
            Value::Buffer(vec![0; 4096]),
            Value::from(0),
            Value::from(4096),
            Value::from(0),
        ];
        b.iter(|| module.invoke("readSync", black_box(&mut args)))
    });
}

criterion_group!(benches, bench_window, bench_write, bench_surface);
criterion_main!(benches);
