//! Content identity: streaming file fingerprints and content equality.

pub mod streaming;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::trace;

/// 16 KiB read blocks.
pub const DEFAULT_BLOCK_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha256 => f.write_str("sha256"),
            HashAlgorithm::Blake3 => f.write_str("blake3"),
        }
    }
}

/// 256-bit content digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

/// Fingerprinting configuration shared by every file in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentIdentity {
    algorithm: HashAlgorithm,
    block_size: usize,
}

impl Default for ContentIdentity {
    fn default() -> Self {
        Self::new(HashAlgorithm::default(), DEFAULT_BLOCK_SIZE)
    }
}

impl ContentIdentity {
    pub fn new(algorithm: HashAlgorithm, block_size: usize) -> Self {
        Self {
            algorithm,
            block_size: block_size.max(1),
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Stream the file at `path` through the hash. The handle is closed before
    /// returning, on success or error.
    pub fn fingerprint(&self, path: &Path) -> io::Result<Fingerprint> {
        let mut file = File::open(path)?;
        let fingerprint = streaming::hash_reader(&mut file, self.algorithm, self.block_size)?;
        trace!("{} {}", fingerprint, path.display());
        Ok(fingerprint)
    }

    /// True when both files have identical bytes. Files of different length are
    /// rejected without hashing.
    pub fn content_equals(&self, a: &Path, b: &Path) -> io::Result<bool> {
        if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
            return Ok(false);
        }
        Ok(self.fingerprint(a)? == self.fingerprint(b)?)
    }
}

/// Fingerprint with the default algorithm and block size.
pub fn fingerprint(path: &Path) -> io::Result<Fingerprint> {
    ContentIdentity::default().fingerprint(path)
}

/// Content equality with the default algorithm and block size.
pub fn content_equals(a: &Path, b: &Path) -> io::Result<bool> {
    ContentIdentity::default().content_equals(a, b)
}
