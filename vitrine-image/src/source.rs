//! Image sources
//!
//! An [`ImageSource`] is an open, positioned cursor over the encoded
//! bytes of one image. It owns its backing handle and closes it when
//! dropped.
//!
//! Seekable backends (memory, files, [`Seekable`] streams) move freely.
//! Forward-only streams keep a copy of their first [`HEAD_BYTES`] bytes:
//! format sniffing can rewind into that window, but once reading has
//! gone past it the stream can only move forward. A backward seek that
//! cannot be honored fails with [`ImageError::SourceUnavailable`].

use alloc::boxed::Box;

use embedded_io::{Read, Seek, SeekFrom};
use heapless::Vec;

use crate::error::ImageError;

/// Bytes of a forward-only stream kept for rewinding
pub const HEAD_BYTES: usize = 16;

/// Generic byte supplier behind [`ImageSource::from_stream`]
pub trait ByteStream {
    /// Read up to `buf.len()` bytes; `Ok(0)` marks the end of the data
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ImageError>;

    /// Move to an absolute offset
    fn seek(&mut self, offset: u64) -> Result<(), ImageError> {
        let _ = offset;
        Err(ImageError::SourceUnavailable)
    }

    /// Total length, if known
    fn length(&self) -> Option<u64> {
        None
    }

    /// Whether [`ByteStream::seek`] is implemented
    fn is_seekable(&self) -> bool {
        false
    }
}

impl<T: ByteStream + ?Sized> ByteStream for &mut T {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ImageError> {
        (**self).read(buf)
    }

    fn seek(&mut self, offset: u64) -> Result<(), ImageError> {
        (**self).seek(offset)
    }

    fn length(&self) -> Option<u64> {
        (**self).length()
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }
}

/// Forward-only stream over an [`embedded_io::Read`]
pub struct Reader<R>(pub R);

impl<R: Read> ByteStream for Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ImageError> {
        self.0.read(buf).map_err(|_| ImageError::SourceUnavailable)
    }
}

/// Seekable stream over an [`embedded_io::Read`] + [`embedded_io::Seek`]
pub struct Seekable<S> {
    inner: S,
    length: u64,
}

impl<S: Read + Seek> Seekable<S> {
    /// Wrap a stream, measuring its length and rewinding it to the start
    pub fn new(mut inner: S) -> Result<Self, ImageError> {
        let length = inner
            .seek(SeekFrom::End(0))
            .map_err(|_| ImageError::SourceUnavailable)?;
        inner
            .seek(SeekFrom::Start(0))
            .map_err(|_| ImageError::SourceUnavailable)?;
        Ok(Self { inner, length })
    }

    /// Unwrap the stream
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Read + Seek> ByteStream for Seekable<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ImageError> {
        self.inner.read(buf).map_err(|_| ImageError::SourceUnavailable)
    }

    fn seek(&mut self, offset: u64) -> Result<(), ImageError> {
        self.inner
            .seek(SeekFrom::Start(offset))
            .map(|_| ())
            .map_err(|_| ImageError::SourceUnavailable)
    }

    fn length(&self) -> Option<u64> {
        Some(self.length)
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// Which kind of backend a source reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceKind {
    Memory,
    File,
    Stream,
}

enum Backend<'a> {
    Memory(&'a [u8]),
    #[cfg(feature = "std")]
    File(std::fs::File),
    Stream(Box<dyn ByteStream + 'a>),
}

/// Open, positioned cursor over encoded image bytes
pub struct ImageSource<'a> {
    backend: Backend<'a>,
    /// Logical read position
    pos: u64,
    length: Option<u64>,
    /// Forward-only streams: bytes pulled from the backend so far
    consumed: u64,
    /// Forward-only streams: copy of the first bytes pulled
    head: Vec<u8, HEAD_BYTES>,
    forward_only: bool,
}

impl<'a> ImageSource<'a> {
    fn with_backend(backend: Backend<'a>, length: Option<u64>, forward_only: bool) -> Self {
        Self {
            backend,
            pos: 0,
            length,
            consumed: 0,
            head: Vec::new(),
            forward_only,
        }
    }

    /// Read from a memory buffer
    pub fn from_memory(data: &'a [u8]) -> Self {
        Self::with_backend(Backend::Memory(data), Some(data.len() as u64), false)
    }

    /// Open a file for reading
    #[cfg(feature = "std")]
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ImageError> {
        let file = std::fs::File::open(path).map_err(|_| {
            warn!("image file cannot be opened");
            ImageError::SourceUnavailable
        })?;
        let length = file.metadata().ok().map(|m| m.len());
        Ok(Self::with_backend(Backend::File(file), length, false))
    }

    /// Read from a generic byte stream
    pub fn from_stream<S: ByteStream + 'a>(stream: S) -> Self {
        let length = stream.length();
        let forward_only = !stream.is_seekable();
        Self::with_backend(Backend::Stream(Box::new(stream)), length, forward_only)
    }

    /// Read from a forward-only [`embedded_io::Read`]
    pub fn from_reader<R: Read + 'a>(reader: R) -> Self {
        Self::from_stream(Reader(reader))
    }

    /// Read from a seekable [`embedded_io::Read`] + [`embedded_io::Seek`]
    pub fn from_seekable<S: Read + Seek + 'a>(stream: S) -> Result<Self, ImageError> {
        Ok(Self::from_stream(Seekable::new(stream)?))
    }

    /// Backend kind
    pub fn kind(&self) -> SourceKind {
        match self.backend {
            Backend::Memory(_) => SourceKind::Memory,
            #[cfg(feature = "std")]
            Backend::File(_) => SourceKind::File,
            Backend::Stream(_) => SourceKind::Stream,
        }
    }

    /// Total length in bytes, if known
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// Current read position
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Whether the source can seek backwards past its head window
    pub fn is_seekable(&self) -> bool {
        !self.forward_only
    }

    /// Read up to `buf.len()` bytes, returning how many were read
    ///
    /// Fewer bytes than requested means the end of the data was reached.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, ImageError> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.forward_only {
            return self.read_forward(buf);
        }

        let mut total = 0;
        while total < buf.len() {
            let n = match &mut self.backend {
                Backend::Memory(data) => {
                    let start = (self.pos as usize).min(data.len());
                    let n = (buf.len() - total).min(data.len() - start);
                    buf[total..total + n].copy_from_slice(&data[start..start + n]);
                    n
                }
                #[cfg(feature = "std")]
                Backend::File(file) => read_file(file, &mut buf[total..])?,
                Backend::Stream(stream) => stream.read(&mut buf[total..])?,
            };
            if n == 0 {
                break;
            }
            total += n;
            self.pos += n as u64;
        }
        Ok(total)
    }

    /// Fill `buf` completely; running out of data is [`ImageError::Corrupted`]
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ImageError> {
        if self.read(buf)? < buf.len() {
            return Err(ImageError::Corrupted);
        }
        Ok(())
    }

    /// Read a fixed number of bytes
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ImageError> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Move to an absolute offset
    ///
    /// Offsets past a known end are [`ImageError::Corrupted`]: decoders
    /// only seek to offsets taken from the data itself.
    pub fn seek(&mut self, offset: u64) -> Result<(), ImageError> {
        if let Some(length) = self.length {
            if offset > length {
                return Err(ImageError::Corrupted);
            }
        }
        if self.forward_only {
            return self.seek_forward(offset);
        }

        match &mut self.backend {
            Backend::Memory(_) => {}
            #[cfg(feature = "std")]
            Backend::File(file) => {
                std::io::Seek::seek(file, std::io::SeekFrom::Start(offset))
                    .map_err(|_| ImageError::SourceUnavailable)?;
            }
            Backend::Stream(stream) => stream.seek(offset)?,
        }
        self.pos = offset;
        Ok(())
    }

    /// Move forward by `count` bytes
    pub fn skip(&mut self, count: u64) -> Result<(), ImageError> {
        self.seek(self.pos + count)
    }

    fn read_forward(&mut self, buf: &mut [u8]) -> Result<usize, ImageError> {
        let mut total = 0;

        // Replay bytes captured before a rewind
        if self.pos < self.consumed {
            let start = self.pos as usize;
            let end = self.consumed as usize;
            let replay = self
                .head
                .get(start..end)
                .ok_or(ImageError::SourceUnavailable)?;
            let n = buf.len().min(replay.len());
            buf[..n].copy_from_slice(&replay[..n]);
            self.pos += n as u64;
            total = n;
        }

        let Backend::Stream(stream) = &mut self.backend else {
            return Err(ImageError::SourceUnavailable);
        };
        while total < buf.len() {
            let n = stream.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            if self.head.len() as u64 == self.consumed {
                let room = HEAD_BYTES - self.head.len();
                let keep = &buf[total..total + n.min(room)];
                self.head
                    .extend_from_slice(keep)
                    .map_err(|_| ImageError::OutOfMemory)?;
            }
            total += n;
            self.consumed += n as u64;
            self.pos += n as u64;
        }
        Ok(total)
    }

    fn seek_forward(&mut self, offset: u64) -> Result<(), ImageError> {
        if offset <= self.consumed && self.consumed <= self.head.len() as u64 {
            self.pos = offset;
            return Ok(());
        }
        if offset < self.consumed {
            debug!("backward seek to {} past stream head", offset);
            return Err(ImageError::SourceUnavailable);
        }

        self.pos = self.consumed;
        let mut scratch = [0u8; 32];
        while self.pos < offset {
            let want = ((offset - self.pos) as usize).min(scratch.len());
            if self.read_forward(&mut scratch[..want])? == 0 {
                return Err(ImageError::Corrupted);
            }
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
fn read_file(file: &mut std::fs::File, buf: &mut [u8]) -> Result<usize, ImageError> {
    loop {
        match std::io::Read::read(file, buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => return Err(ImageError::SourceUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Forward-only stream handing out at most `chunk` bytes per read
    struct Trickle<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl ByteStream for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, ImageError> {
            let n = buf.len().min(self.chunk).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn bytes() -> [u8; 40] {
        core::array::from_fn(|i| i as u8)
    }

    #[test]
    fn test_memory_read_seek() {
        let data = bytes();
        let mut source = ImageSource::from_memory(&data);
        assert_eq!(source.kind(), SourceKind::Memory);
        assert_eq!(source.length(), Some(40));

        let mut buf = [0u8; 4];
        source.seek(36).unwrap();
        assert_eq!(source.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, [36, 37, 38, 39]);
        assert_eq!(source.read(&mut buf).unwrap(), 0);

        source.seek(2).unwrap();
        assert_eq!(source.read_array::<2>().unwrap(), [2, 3]);
        assert_eq!(source.seek(41), Err(ImageError::Corrupted));
    }

    #[test]
    fn test_short_read_exact_is_corrupted() {
        let data = [1u8, 2, 3];
        let mut source = ImageSource::from_memory(&data);
        let mut buf = [0u8; 4];
        assert_eq!(source.read_exact(&mut buf), Err(ImageError::Corrupted));
    }

    #[test]
    fn test_stream_rewinds_within_head() {
        let data = bytes();
        let mut source = ImageSource::from_stream(Trickle { data: &data, chunk: 3 });
        assert!(!source.is_seekable());
        assert_eq!(source.length(), None);

        assert_eq!(source.read_array::<2>().unwrap(), [0, 1]);
        source.seek(0).unwrap();
        assert_eq!(source.read_array::<4>().unwrap(), [0, 1, 2, 3]);
        source.seek(1).unwrap();
        assert_eq!(source.read_array::<3>().unwrap(), [1, 2, 3]);
    }

    #[test]
    fn test_stream_forward_seek_skips() {
        let data = bytes();
        let mut source = ImageSource::from_stream(Trickle { data: &data, chunk: 5 });
        source.seek(30).unwrap();
        assert_eq!(source.read_array::<2>().unwrap(), [30, 31]);
        assert_eq!(source.seek(50), Err(ImageError::Corrupted));
    }

    #[test]
    fn test_stream_cannot_rewind_past_head() {
        let data = bytes();
        let mut source = ImageSource::from_stream(Trickle { data: &data, chunk: 8 });
        let mut buf = [0u8; 20];
        source.read_exact(&mut buf).unwrap();
        assert_eq!(source.seek(0), Err(ImageError::SourceUnavailable));
        // Forward still works
        source.seek(24).unwrap();
        assert_eq!(source.read_array::<1>().unwrap(), [24]);
    }

    #[test]
    fn test_seekable_adapter() {
        struct Cursor {
            data: [u8; 40],
            pos: usize,
        }

        impl embedded_io::ErrorType for Cursor {
            type Error = core::convert::Infallible;
        }

        impl Read for Cursor {
            fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
                let n = buf.len().min(self.data.len() - self.pos);
                buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
                self.pos += n;
                Ok(n)
            }
        }

        impl Seek for Cursor {
            fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
                self.pos = match pos {
                    SeekFrom::Start(p) => p as usize,
                    SeekFrom::End(d) => (self.data.len() as i64 + d) as usize,
                    SeekFrom::Current(d) => (self.pos as i64 + d) as usize,
                };
                Ok(self.pos as u64)
            }
        }

        let mut source = ImageSource::from_seekable(Cursor { data: bytes(), pos: 0 }).unwrap();
        assert!(source.is_seekable());
        assert_eq!(source.length(), Some(40));
        source.seek(35).unwrap();
        assert_eq!(source.read_array::<1>().unwrap(), [35]);
        source.seek(0).unwrap();
        assert_eq!(source.read_array::<1>().unwrap(), [0]);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_missing_file_unavailable() {
        assert!(matches!(
            ImageSource::from_file("/nonexistent/vitrine.bmp"),
            Err(ImageError::SourceUnavailable)
        ));
    }
}
