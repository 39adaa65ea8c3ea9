//! Draining picker streams of unknown length.

use std::io::{self, ErrorKind, Read};

/// Default intermediate buffer size for [`ContentReader`].
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Drains a stream of unspecified length into one owned byte buffer.
///
/// The stream is read through a fixed-size intermediate buffer until
/// end-of-stream. The drain blocks the calling thread, so it must not run on
/// a thread that services user interaction.
#[derive(Debug, Clone, Copy)]
pub struct ContentReader {
    chunk_size: usize,
}

impl ContentReader {
    /// A reader using `chunk_size` byte reads (clamped to at least 1).
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Read `reader` to end-of-stream.
    ///
    /// The reader is consumed and dropped on every exit path. Any read
    /// failure fails the whole drain; no partial buffer is returned. Running
    /// out of memory is reported as [`ErrorKind::OutOfMemory`].
    pub fn drain<R: Read>(&self, mut reader: R) -> io::Result<Vec<u8>> {
        let mut chunk = vec![0u8; self.chunk_size];
        let mut content = Vec::new();

        loop {
            let read = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            content
                .try_reserve(read)
                .map_err(|err| io::Error::new(ErrorKind::OutOfMemory, err))?;
            content.extend_from_slice(&chunk[..read]);
        }

        Ok(content)
    }
}

impl Default for ContentReader {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Cursor;
    use std::rc::Rc;

    /// Yields scripted results, then end-of-stream. Records when dropped.
    struct ScriptedStream {
        script: Vec<io::Result<Vec<u8>>>,
        dropped: Rc<Cell<bool>>,
    }

    impl ScriptedStream {
        fn new(script: Vec<io::Result<Vec<u8>>>) -> (Self, Rc<Cell<bool>>) {
            let dropped = Rc::new(Cell::new(false));
            let mut script = script;
            script.reverse();
            (
                Self {
                    script,
                    dropped: dropped.clone(),
                },
                dropped,
            )
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.script.pop() {
                None => Ok(0),
                Some(Ok(bytes)) => {
                    assert!(bytes.len() <= buf.len(), "script chunk exceeds buffer");
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(err)) => Err(err),
            }
        }
    }

    impl Drop for ScriptedStream {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    #[test]
    fn empty_stream() {
        let data = ContentReader::default().drain(Cursor::new(Vec::new())).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn stream_larger_than_chunk() {
        let source: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let data = ContentReader::new(7).drain(Cursor::new(source.clone())).unwrap();
        assert_eq!(data, source);
    }

    #[test]
    fn zero_chunk_is_clamped() {
        let reader = ContentReader::new(0);
        assert_eq!(reader.chunk_size(), 1);
        assert_eq!(reader.drain(Cursor::new(b"abc".to_vec())).unwrap(), b"abc");
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let (stream, _) = ScriptedStream::new(vec![
            Ok(b"ab".to_vec()),
            Err(io::Error::from(ErrorKind::Interrupted)),
            Ok(b"cd".to_vec()),
        ]);
        let data = ContentReader::new(4).drain(stream).unwrap();
        assert_eq!(data, b"abcd");
    }

    #[test]
    fn mid_read_failure_fails_whole_drain_and_releases_stream() {
        let (stream, dropped) = ScriptedStream::new(vec![
            Ok(b"partial".to_vec()),
            Err(io::Error::new(ErrorKind::ConnectionReset, "provider went away")),
            Ok(b"never".to_vec()),
        ]);
        let err = ContentReader::new(16).drain(stream).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionReset);
        assert!(dropped.get());
    }

    #[test]
    fn stream_released_after_success() {
        let (stream, dropped) = ScriptedStream::new(vec![Ok(b"x".to_vec())]);
        ContentReader::new(1).drain(stream).unwrap();
        assert!(dropped.get());
    }
}
