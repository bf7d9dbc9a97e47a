//! One writable output destination behind a per-sink mutex.
//!
//! A sink wraps exactly one of: the process's standard output, a file it
//! owns, or a caller-supplied stream. Descriptor-backed sinks (stdout) take
//! a raw `write()` fast path that stays safe for interleaved low-level
//! cursor writes; everything else goes through the stream's buffer, where a
//! short write is treated as failure.

use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::RawFd;
use std::path::Path;

/// What a sink writes to, and who owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// The process's standard output (non-owning).
    Stdout,
    /// A file opened in append mode and owned by the sink.
    OwnedFile,
    /// A caller-supplied stream; its lifetime is the caller's business.
    Wrapped,
    /// Between destruction and slot reuse.
    Invalid,
}

enum Target {
    Stdout,
    OwnedFile(File),
    Wrapped(Box<dyn Write + Send>),
    Closed,
}

/// Mutable sink state; the registry wraps this in the per-sink mutex.
pub(crate) struct SinkInner {
    target: Target,
    raw_fd: Option<RawFd>,
}

impl std::fmt::Debug for SinkInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkInner")
            .field("kind", &self.kind())
            .field("raw_fd", &self.raw_fd)
            .finish()
    }
}

impl SinkInner {
    pub(crate) const fn stdout() -> Self {
        Self {
            target: Target::Stdout,
            raw_fd: Some(libc::STDOUT_FILENO),
        }
    }

    /// Open `path` in append mode, distinguishing "could not open" from
    /// "opened but not writable".
    pub(crate) fn owned_file(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| Error::FileOpen { path: path.to_path_buf(), source })?;
        if let Err(source) = file.metadata() {
            return Err(Error::FileNotWritable { path: path.to_path_buf(), source });
        }
        Ok(Self {
            target: Target::OwnedFile(file),
            raw_fd: None,
        })
    }

    pub(crate) fn wrapped(stream: Box<dyn Write + Send>) -> Self {
        Self {
            target: Target::Wrapped(stream),
            raw_fd: None,
        }
    }

    pub(crate) const fn kind(&self) -> SinkKind {
        match self.target {
            Target::Stdout => SinkKind::Stdout,
            Target::OwnedFile(_) => SinkKind::OwnedFile,
            Target::Wrapped(_) => SinkKind::Wrapped,
            Target::Closed => SinkKind::Invalid,
        }
    }

    /// Write `bytes`, returning the number of bytes written.
    ///
    /// Descriptor-backed sinks bypass the stream entirely and retry partial
    /// writes until the whole buffer is out (the per-sink lock is held, so
    /// nothing can interleave); stream-backed sinks make a single write call
    /// and fail on a short write.
    pub(crate) fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        if bytes.is_empty() {
            return Ok(0);
        }
        if let Some(fd) = self.raw_fd {
            return write_fd(fd, bytes);
        }
        let written = match &mut self.target {
            Target::Stdout => io::stdout().write(bytes)?,
            Target::OwnedFile(file) => file.write(bytes)?,
            Target::Wrapped(stream) => stream.write(bytes)?,
            Target::Closed => return Err(Error::SinkClosed),
        };
        if written != bytes.len() {
            return Err(Error::ShortWrite { written, requested: bytes.len() });
        }
        Ok(written)
    }

    /// Flush buffered output. Descriptor-backed sinks are unbuffered, so
    /// this is a successful no-op for them.
    pub(crate) fn flush(&mut self) -> Result<()> {
        if self.raw_fd.is_some() {
            return Ok(());
        }
        match &mut self.target {
            Target::Stdout => io::stdout().flush()?,
            Target::OwnedFile(file) => file.flush()?,
            Target::Wrapped(stream) => stream.flush()?,
            Target::Closed => return Err(Error::SinkClosed),
        }
        Ok(())
    }

    /// Flush, close an owned file, and leave the sink unusable.
    ///
    /// Safe to call more than once; only the first call can fail.
    pub(crate) fn close(&mut self) -> Result<()> {
        let result = match std::mem::replace(&mut self.target, Target::Closed) {
            Target::OwnedFile(mut file) => {
                file.flush().map_err(Error::CloseFailed)?;
                file.sync_all().map_err(Error::CloseFailed)
            }
            Target::Stdout => io::stdout().flush().map_err(Error::CloseFailed),
            Target::Wrapped(mut stream) => stream.flush().map_err(Error::CloseFailed),
            Target::Closed => Ok(()),
        };
        self.raw_fd = None;
        result
    }

    /// Best-effort terminal detection: true only for descriptor-backed
    /// sinks whose descriptor is connected to a terminal.
    #[allow(unsafe_code)]
    pub(crate) fn is_tty(&self) -> bool {
        self.raw_fd
            .is_some_and(|fd| unsafe { libc::isatty(fd) } != 0)
    }
}

/// Raw `write(2)` loop, bypassing stdio buffering.
///
/// A partial write is retried on the remainder so a frame can never land
/// half-drawn on the descriptor; only EOF-like zero progress or a real
/// error aborts.
#[allow(unsafe_code)]
fn write_fd(fd: RawFd, bytes: &[u8]) -> Result<usize> {
    let mut written = 0;
    while written < bytes.len() {
        let remaining = &bytes[written..];
        let rc = unsafe { libc::write(fd, remaining.as_ptr().cast(), remaining.len()) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(Error::Io(err));
        }
        if rc == 0 {
            return Err(Error::ShortWrite { written, requested: bytes.len() });
        }
        #[allow(clippy::cast_sign_loss)]
        {
            written += rc as usize;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct ShortWriter;

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len() / 2)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_wrapped_write_and_kind() {
        let buf = SharedBuf::default();
        let mut sink = SinkInner::wrapped(Box::new(buf.clone()));
        assert_eq!(sink.kind(), SinkKind::Wrapped);
        assert_eq!(sink.write(b"hello").unwrap(), 5);
        assert_eq!(&*buf.0.lock().unwrap(), b"hello");
    }

    #[test]
    fn test_empty_write_is_zero() {
        let mut sink = SinkInner::wrapped(Box::new(SharedBuf::default()));
        assert_eq!(sink.write(b"").unwrap(), 0);
    }

    #[test]
    fn test_short_write_is_error() {
        let mut sink = SinkInner::wrapped(Box::new(ShortWriter));
        let err = sink.write(b"12345678").unwrap_err();
        assert!(matches!(err, Error::ShortWrite { written: 4, requested: 8 }));
    }

    #[test]
    fn test_closed_sink_rejects_io() {
        let mut sink = SinkInner::wrapped(Box::new(SharedBuf::default()));
        sink.close().unwrap();
        assert_eq!(sink.kind(), SinkKind::Invalid);
        assert!(matches!(sink.write(b"x"), Err(Error::SinkClosed)));
        assert!(matches!(sink.flush(), Err(Error::SinkClosed)));
        // Second close is a successful no-op.
        sink.close().unwrap();
    }

    #[test]
    fn test_wrapped_is_not_tty() {
        let sink = SinkInner::wrapped(Box::new(SharedBuf::default()));
        assert!(!sink.is_tty());
    }

    #[test]
    fn test_write_fd_delivers_whole_buffer() {
        use std::io::{Read, Seek, SeekFrom};
        use std::os::fd::AsRawFd;

        let mut file = tempfile::tempfile().unwrap();
        // Larger than a pipe buffer, so partial-write handling is load-bearing.
        let payload = vec![b'#'; 70_000];
        assert_eq!(write_fd(file.as_raw_fd(), &payload).unwrap(), payload.len());

        let mut back = Vec::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_end(&mut back).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_write_fd_error_on_bad_descriptor() {
        assert!(matches!(write_fd(-1, b"x"), Err(Error::Io(_))));
    }

    #[test]
    fn test_stdout_kind_and_fd() {
        let sink = SinkInner::stdout();
        assert_eq!(sink.kind(), SinkKind::Stdout);
        // No assertion on is_tty: depends on how the test runner is wired.
    }
}
