use super::{Fingerprint, HashAlgorithm};
use sha2::{Digest, Sha256};
use std::io::{self, Read};

enum ContentHasher {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl ContentHasher {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => ContentHasher::Sha256(Sha256::new()),
            HashAlgorithm::Blake3 => ContentHasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            ContentHasher::Sha256(hasher) => hasher.update(data),
            ContentHasher::Blake3(hasher) => {
                hasher.update(data);
            }
        }
    }

    fn finalize(self) -> Fingerprint {
        let mut bytes = [0u8; 32];
        match self {
            ContentHasher::Sha256(hasher) => bytes.copy_from_slice(&hasher.finalize()),
            ContentHasher::Blake3(hasher) => bytes.copy_from_slice(hasher.finalize().as_bytes()),
        }
        Fingerprint(bytes)
    }
}

/// Feed `reader` through the hash in `block_size` chunks until end of stream.
///
/// Only one block is held in memory at a time. A read error aborts the digest.
pub fn hash_reader<R: Read>(
    reader: &mut R,
    algorithm: HashAlgorithm,
    block_size: usize,
) -> io::Result<Fingerprint> {
    let mut hasher = ContentHasher::new(algorithm);
    let mut buffer = vec![0u8; block_size.max(1)];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that fails after yielding some bytes.
    struct FailingReader {
        remaining: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "device went away"));
            }
            let n = buf.len().min(self.remaining);
            buf[..n].fill(0x42);
            self.remaining -= n;
            Ok(n)
        }
    }

    #[test]
    fn test_sha256_known_vector() {
        let fp = hash_reader(&mut Cursor::new(b"abc"), HashAlgorithm::Sha256, 2).unwrap();
        assert_eq!(
            fp.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_empty_input() {
        let fp = hash_reader(&mut Cursor::new(Vec::new()), HashAlgorithm::Sha256, 16).unwrap();
        assert_eq!(
            fp.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_blake3_matches_one_shot() {
        let data = vec![7u8; 10_000];
        let fp = hash_reader(&mut Cursor::new(&data), HashAlgorithm::Blake3, 333).unwrap();
        assert_eq!(fp.as_bytes(), blake3::hash(&data).as_bytes());
    }

    #[test]
    fn test_read_error_propagates() {
        let mut reader = FailingReader { remaining: 100 };
        let err = hash_reader(&mut reader, HashAlgorithm::Sha256, 16).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn test_zero_block_size_is_clamped() {
        let a = hash_reader(&mut Cursor::new(b"hello"), HashAlgorithm::Sha256, 0).unwrap();
        let b = hash_reader(&mut Cursor::new(b"hello"), HashAlgorithm::Sha256, 4096).unwrap();
        assert_eq!(a, b);
    }
}
