//! Content hashing for duplicate detection.
//!
//! MD5 is fast and good enough to spot byte-identical copies, but it is not
//! collision resistant: two different files can share a digest, and with a
//! prefix limit any two files sharing that prefix will. A duplicate verdict
//! is therefore a strong hint, not proof.

use md5::{Digest, Md5};
use std::io::{self, BufReader, Read};

const BUFFER_SIZE: usize = 8192;

/// Computes the MD5 hex digest of everything `reader` yields, or of the first
/// `max_bytes` bytes when a limit is given.
///
/// Reads in 8 KiB chunks so memory use stays flat for large files.
///
/// ```
/// use mediasort::hasher::hash_reader;
///
/// let digest = hash_reader(&b"hello"[..], None).unwrap();
/// assert_eq!(digest, "5d41402abc4b2a76b9719d911017c592");
/// ```
pub fn hash_reader<R: Read>(reader: R, max_bytes: Option<u64>) -> io::Result<String> {
    match max_bytes {
        Some(limit) => hash_stream(reader.take(limit)),
        None => hash_stream(reader),
    }
}

fn hash_stream<R: Read>(reader: R) -> io::Result<String> {
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, reader);
    let mut hasher = Md5::new();
    let mut buffer = [0u8; BUFFER_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
