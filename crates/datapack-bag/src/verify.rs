//! # Bag Verification
//!
//! Re-reads a zipped bag and checks it against its own manifests:
//!
//! - `bagit.txt` declares a BagIt version
//! - a `manifest-<alg>.txt` exists and every listed digest matches
//! - every `data/` entry is listed in the manifest
//! - `tagmanifest-<alg>.txt`, when present, matches the tag files
//! - `Payload-Oxum` in `bag-info.txt` matches the payload totals
//!
//! Mismatches are collected as [`Problem`]s; only an unreadable archive is
//! an error.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use datapack_core::{digest_bytes, DigestAlgorithm};

use crate::archive::read_entries;
use crate::error::{BagError, BagResult};
use crate::info::{
    parse_manifest_line, parse_oxum, parse_pid_line, parse_tag_fields, BAGIT_TXT, BAG_INFO_TXT,
    DATA_DIR, PID_MAPPING_TXT,
};

/// One inconsistency found in a bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// A required tag file is absent.
    MissingTagFile(String),
    /// `bagit.txt` lacks a `BagIt-Version` line.
    BadDeclaration,
    /// A manifest line could not be parsed.
    MalformedLine {
        /// Manifest file name.
        file: String,
        /// 1-based line number.
        line: usize,
    },
    /// A manifest lists a file the archive does not contain.
    MissingFile(String),
    /// A file's digest differs from its manifest entry.
    DigestMismatch {
        /// Entry path.
        path: String,
        /// Digest listed in the manifest.
        expected: String,
        /// Digest of the archived bytes.
        actual: String,
    },
    /// A payload file is not listed in the manifest.
    Unlisted(String),
    /// `Payload-Oxum` disagrees with the payload.
    OxumMismatch {
        /// Value from `bag-info.txt`.
        declared: String,
        /// Value computed from the payload.
        actual: String,
    },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTagFile(name) => write!(f, "missing tag file {name}"),
            Self::BadDeclaration => write!(f, "{BAGIT_TXT} has no BagIt-Version"),
            Self::MalformedLine { file, line } => write!(f, "{file}:{line}: malformed line"),
            Self::MissingFile(path) => write!(f, "{path}: listed in manifest but not in archive"),
            Self::DigestMismatch {
                path,
                expected,
                actual,
            } => write!(f, "{path}: digest {actual} does not match manifest {expected}"),
            Self::Unlisted(path) => write!(f, "{path}: payload file not in manifest"),
            Self::OxumMismatch { declared, actual } => {
                write!(f, "Payload-Oxum {declared} does not match payload {actual}")
            }
        }
    }
}

/// Outcome of [`verify_archive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagReport {
    /// The archive that was read.
    pub path: PathBuf,
    /// Algorithm of the payload manifest, if one was found.
    pub algorithm: Option<DigestAlgorithm>,
    /// Number of files under `data/`.
    pub payload_files: u64,
    /// Total bytes under `data/`.
    pub payload_bytes: u64,
    /// `bag-info.txt` fields, in file order.
    pub info: Vec<(String, String)>,
    /// `pid-mapping.txt` entries as `(identifier, path)`.
    pub pid_mapping: Vec<(String, String)>,
    /// Every inconsistency found.
    pub problems: Vec<Problem>,
}

impl BagReport {
    /// Whether no problems were found.
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    /// First `bag-info.txt` value for `label`, case-insensitive.
    pub fn info_value(&self, label: &str) -> Option<&str> {
        self.info
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(label))
            .map(|(_, v)| v.as_str())
    }
}

/// Read the zip bag at `path` and check it against its manifests.
pub fn verify_archive(path: &Path) -> BagResult<BagReport> {
    let entries = read_entries(path)?;
    if entries.is_empty() {
        return Err(BagError::Verification(format!(
            "{} contains no files",
            path.display()
        )));
    }

    let mut problems = Vec::new();
    match entries.get(BAGIT_TXT) {
        None => problems.push(Problem::MissingTagFile(BAGIT_TXT.to_string())),
        Some(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            if !parse_tag_fields(&text)
                .iter()
                .any(|(label, _)| label == "BagIt-Version")
            {
                problems.push(Problem::BadDeclaration);
            }
        }
    }

    let payload: BTreeMap<&str, &[u8]> = entries
        .iter()
        .filter(|(name, _)| name.starts_with(&format!("{DATA_DIR}/")))
        .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
        .collect();
    let payload_files = payload.len() as u64;
    let payload_bytes: u64 = payload.values().map(|b| b.len() as u64).sum();

    let algorithm = find_manifest(&entries, "manifest-");
    match algorithm {
        None => problems.push(Problem::MissingTagFile("manifest-<alg>.txt".to_string())),
        Some(alg) => {
            let name = alg.manifest_file_name();
            let listed = check_manifest(&entries, &name, alg, &mut problems);
            for path in payload.keys() {
                if !listed.contains(*path) {
                    problems.push(Problem::Unlisted(path.to_string()));
                }
            }
            let tag_name = alg.tag_manifest_file_name();
            if entries.contains_key(&tag_name) {
                check_manifest(&entries, &tag_name, alg, &mut problems);
            }
        }
    }

    let info = entries
        .get(BAG_INFO_TXT)
        .map(|b| parse_tag_fields(&String::from_utf8_lossy(b)))
        .unwrap_or_default();
    let declared_oxum = info
        .iter()
        .find(|(l, _)| l.eq_ignore_ascii_case("Payload-Oxum"))
        .map(|(_, v)| v.clone());
    if let Some(declared) = declared_oxum {
        if parse_oxum(&declared) != Some((payload_bytes, payload_files)) {
            problems.push(Problem::OxumMismatch {
                declared,
                actual: format!("{payload_bytes}.{payload_files}"),
            });
        }
    }

    let pid_mapping = entries
        .get(PID_MAPPING_TXT)
        .map(|b| {
            String::from_utf8_lossy(b)
                .lines()
                .filter_map(parse_pid_line)
                .map(|(id, p)| (id.to_string(), p.to_string()))
                .collect()
        })
        .unwrap_or_default();

    tracing::debug!(
        archive = %path.display(),
        files = payload_files,
        problems = problems.len(),
        "verified bag"
    );
    Ok(BagReport {
        path: path.to_path_buf(),
        algorithm,
        payload_files,
        payload_bytes,
        info,
        pid_mapping,
        problems,
    })
}

/// The algorithm of the first `<prefix><alg>.txt` entry, preferring the
/// sorted order of entry names.
fn find_manifest(entries: &BTreeMap<String, Vec<u8>>, prefix: &str) -> Option<DigestAlgorithm> {
    entries.keys().find_map(|name| {
        name.strip_prefix(prefix)?
            .strip_suffix(".txt")?
            .parse()
            .ok()
    })
}

/// Check every line of manifest `name`; returns the listed paths.
fn check_manifest(
    entries: &BTreeMap<String, Vec<u8>>,
    name: &str,
    algorithm: DigestAlgorithm,
    problems: &mut Vec<Problem>,
) -> BTreeSet<String> {
    let mut listed = BTreeSet::new();
    let Some(bytes) = entries.get(name) else {
        return listed;
    };
    let text = String::from_utf8_lossy(bytes);
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((expected, path)) = parse_manifest_line(line) else {
            problems.push(Problem::MalformedLine {
                file: name.to_string(),
                line: i + 1,
            });
            continue;
        };
        listed.insert(path.to_string());
        match entries.get(path) {
            None => problems.push(Problem::MissingFile(path.to_string())),
            Some(content) => {
                let actual = digest_bytes(algorithm, content).to_hex();
                if !actual.eq_ignore_ascii_case(expected) {
                    problems.push(Problem::DigestMismatch {
                        path: path.to_string(),
                        expected: expected.to_string(),
                        actual,
                    });
                }
            }
        }
    }
    listed
}
