//! Byte-stream abstraction consumed by loaders and exporters.
//!
//! The core never interprets paths itself; everything flows through
//! [`ByteStream`] so hosts can substitute archives, network blobs or
//! in-memory buffers for plain files.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{Result, VoxelError};

/// Where a seek starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekOrigin {
    Start,
    Current,
    End,
}

/// Random-access byte stream.
pub trait ByteStream {
    /// Read up to `buf.len()` bytes; returns the count actually read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write all of `buf` at the cursor.
    fn write(&mut self, buf: &[u8]) -> Result<()>;

    /// Move the cursor; returns the new absolute position.
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64>;

    /// Current cursor position.
    fn tell(&self) -> u64;

    /// Total stream size in bytes.
    fn size(&self) -> u64;

    fn eof(&self) -> bool {
        self.tell() >= self.size()
    }

    /// Read exactly `count` bytes or fail with a corrupt-format error.
    fn read_exact(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; count];
        let got = self.read(&mut buf)?;
        if got != count {
            return Err(VoxelError::CorruptFormat(format!(
                "unexpected end of stream: wanted {count} bytes, got {got}"
            )));
        }
        Ok(buf)
    }
}

/// Opens streams by path on behalf of an exporter.
pub trait StreamFactory {
    fn open(&mut self, path: &str) -> Result<Box<dyn ByteStream>>;
}

/// Growable in-memory stream.
#[derive(Default)]
pub struct MemoryStream {
    data: Vec<u8>,
    cursor: usize,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, cursor: 0 }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl ByteStream for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let available = self.data.len().saturating_sub(self.cursor);
        let count = buf.len().min(available);
        buf[..count].copy_from_slice(&self.data[self.cursor..self.cursor + count]);
        self.cursor += count;
        Ok(count)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        let end = self.cursor + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.cursor..end].copy_from_slice(buf);
        self.cursor = end;
        Ok(())
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        let base = match origin {
            SeekOrigin::Start => 0i64,
            SeekOrigin::Current => self.cursor as i64,
            SeekOrigin::End => self.data.len() as i64,
        };
        let target = base + offset;
        if target < 0 {
            return Err(VoxelError::InvalidArgument(format!(
                "seek before start of stream: {target}"
            )));
        }
        self.cursor = target as usize;
        Ok(self.cursor as u64)
    }

    fn tell(&self) -> u64 {
        self.cursor as u64
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// File-backed stream over `std::fs`.
pub struct FileStream {
    file: File,
    size: u64,
    position: u64,
}

impl FileStream {
    /// Open for reading.
    pub fn open(path: &str) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| VoxelError::InvalidArgument(format!("open {path}: {e}")))?;
        let size = file
            .metadata()
            .map_err(|e| VoxelError::InvalidArgument(format!("stat {path}: {e}")))?
            .len();
        Ok(Self {
            file,
            size,
            position: 0,
        })
    }

    /// Create or truncate for writing.
    pub fn create(path: &str) -> Result<Self> {
        let file = File::create(path)
            .map_err(|e| VoxelError::InvalidArgument(format!("create {path}: {e}")))?;
        Ok(Self {
            file,
            size: 0,
            position: 0,
        })
    }
}

impl ByteStream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let count = self
            .file
            .read(buf)
            .map_err(|e| VoxelError::CorruptFormat(format!("read failed: {e}")))?;
        self.position += count as u64;
        Ok(count)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.file
            .write_all(buf)
            .map_err(|e| VoxelError::InvalidArgument(format!("write failed: {e}")))?;
        self.position += buf.len() as u64;
        self.size = self.size.max(self.position);
        Ok(())
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        let from = match origin {
            SeekOrigin::Start => SeekFrom::Start(offset.max(0) as u64),
            SeekOrigin::Current => SeekFrom::Current(offset),
            SeekOrigin::End => SeekFrom::End(offset),
        };
        self.position = self
            .file
            .seek(from)
            .map_err(|e| VoxelError::InvalidArgument(format!("seek failed: {e}")))?;
        Ok(self.position)
    }

    fn tell(&self) -> u64 {
        self.position
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Stream factory producing plain files.
#[derive(Default)]
pub struct FileStreamFactory;

impl StreamFactory for FileStreamFactory {
    fn open(&mut self, path: &str) -> Result<Box<dyn ByteStream>> {
        Ok(Box::new(FileStream::create(path)?))
    }
}
