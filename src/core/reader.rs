use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::models::error::ReadError;

/// Size of the buffer a file is streamed through.
pub const READ_BUFFER_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    pub bytes_read: u64,
    pub elapsed: Duration,
}

/// Reads `path` to end-of-file through a fixed buffer and discards the data.
///
/// Interrupted reads are retried; the loop ends on end-of-file or on the
/// first other error.
pub fn read_all(path: &Path) -> Result<ReadOutcome, ReadError> {
    let start = Instant::now();
    let mut file = File::open(path).map_err(|e| ReadError::io(path, &e))?;
    let bytes_read = drain(&mut file).map_err(|e| ReadError::io(path, &e))?;
    Ok(ReadOutcome {
        bytes_read,
        elapsed: start.elapsed(),
    })
}

/// Number of bytes pulled from `reader` until it reports end-of-stream.
pub fn drain<R: Read>(reader: &mut R) -> std::io::Result<u64> {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => total += n as u64,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
