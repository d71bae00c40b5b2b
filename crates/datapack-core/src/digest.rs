//! # Content Digests
//!
//! Defines [`ContentDigest`] and [`DigestAlgorithm`] for payload and tag
//! manifests. Digests are integrity checksums, not security commitments:
//! MD5 is the default because BagIt consumers of resource-map bags expect
//! `manifest-md5.txt`; SHA-256 is available for stricter deployments.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Read buffer size for streaming file digests.
const CHUNK_SIZE: usize = 64 * 1024;

/// The hash algorithm used to compute a content digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// MD5, a fast integrity checksum, the BagIt default for resource-map bags.
    #[default]
    Md5,
    /// SHA-256.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier used in BagIt manifest file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }

    /// Payload manifest file name, e.g. `manifest-md5.txt`.
    pub fn manifest_file_name(&self) -> String {
        format!("manifest-{}.txt", self.as_str())
    }

    /// Tag manifest file name, e.g. `tagmanifest-md5.txt`.
    pub fn tag_manifest_file_name(&self) -> String {
        format!("tagmanifest-{}.txt", self.as_str())
    }

    /// Length of the hex rendering of a digest.
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha256 => 64,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(format!("unsupported digest algorithm: {other:?}")),
        }
    }
}

/// A digest value tagged with the algorithm that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// Raw digest bytes (16 for MD5, 32 for SHA-256).
    pub bytes: Vec<u8>,
}

impl ContentDigest {
    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Digest an in-memory byte slice.
pub fn digest_bytes(algorithm: DigestAlgorithm, data: &[u8]) -> ContentDigest {
    let bytes = match algorithm {
        DigestAlgorithm::Md5 => Md5::digest(data).to_vec(),
        DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
    };
    ContentDigest { algorithm, bytes }
}

/// Digest everything readable from `reader`, streaming in fixed-size chunks.
pub fn digest_reader(algorithm: DigestAlgorithm, reader: impl Read) -> io::Result<ContentDigest> {
    let bytes = match algorithm {
        DigestAlgorithm::Md5 => stream::<Md5>(reader)?,
        DigestAlgorithm::Sha256 => stream::<Sha256>(reader)?,
    };
    Ok(ContentDigest { algorithm, bytes })
}

/// Digest the file at `path`.
pub fn digest_file(algorithm: DigestAlgorithm, path: &Path) -> io::Result<ContentDigest> {
    digest_reader(algorithm, File::open(path)?)
}

fn stream<D: Digest>(mut reader: impl Read) -> io::Result<Vec<u8>> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn known_md5_vector() {
        // md5("") and md5("abc") from RFC 1321.
        assert_eq!(
            digest_bytes(DigestAlgorithm::Md5, b"").to_hex(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            digest_bytes(DigestAlgorithm::Md5, b"abc").to_hex(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn known_sha256_vector() {
        assert_eq!(
            digest_bytes(DigestAlgorithm::Sha256, b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn reader_digest_matches_bytes_digest() {
        let data = vec![7u8; CHUNK_SIZE * 2 + 17];
        for alg in [DigestAlgorithm::Md5, DigestAlgorithm::Sha256] {
            let streamed = digest_reader(alg, data.as_slice()).unwrap();
            assert_eq!(streamed, digest_bytes(alg, &data));
        }
    }

    #[test]
    fn file_digest_matches_bytes_digest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"1,2,3\n4,5,6").unwrap();
        let from_file = digest_file(DigestAlgorithm::Md5, file.path()).unwrap();
        assert_eq!(from_file, digest_bytes(DigestAlgorithm::Md5, b"1,2,3\n4,5,6"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = digest_file(DigestAlgorithm::Md5, Path::new("/nonexistent/datapack/file"));
        assert!(result.is_err());
    }

    #[test]
    fn manifest_file_names() {
        assert_eq!(DigestAlgorithm::Md5.manifest_file_name(), "manifest-md5.txt");
        assert_eq!(
            DigestAlgorithm::Sha256.tag_manifest_file_name(),
            "tagmanifest-sha256.txt"
        );
    }

    #[test]
    fn algorithm_parse_and_display() {
        assert_eq!("MD5".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Md5);
        assert_eq!("sha-256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert!("crc32".parse::<DigestAlgorithm>().is_err());
        assert_eq!(DigestAlgorithm::Sha256.to_string(), "sha256");
    }

    #[test]
    fn hex_length_matches_algorithm() {
        for alg in [DigestAlgorithm::Md5, DigestAlgorithm::Sha256] {
            assert_eq!(digest_bytes(alg, b"x").to_hex().len(), alg.hex_len());
        }
    }

    #[test]
    fn display_carries_algorithm_tag() {
        let d = digest_bytes(DigestAlgorithm::Md5, b"abc");
        assert_eq!(format!("{d}"), "md5:900150983cd24fb0d6963f7d28e17f72");
    }
}
