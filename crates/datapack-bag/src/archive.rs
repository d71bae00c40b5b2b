//! Zip compression of a staged bag and reading bags back.
//!
//! Entries are written in sorted path order with `/` separators relative
//! to the staging root and a fixed modification time, so the same staged
//! tree always yields the same archive bytes.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::config::Compression;
use crate::error::{BagError, BagResult};

/// Compress every file under `root` into `sink`. Returns the entry count.
pub fn write_zip<W: Write + Seek>(root: &Path, sink: W, compression: Compression) -> BagResult<usize> {
    let options = SimpleFileOptions::default()
        .compression_method(compression.method())
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(sink);
    let mut entries = 0;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            BagError::Io {
                path,
                source: io::Error::from(e),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry_name(root, entry.path())?;
        zip.start_file(name.as_str(), options)?;
        let mut file = File::open(entry.path()).map_err(BagError::io(entry.path()))?;
        io::copy(&mut file, &mut zip).map_err(BagError::io(entry.path()))?;
        tracing::trace!(entry = %name, "compressed");
        entries += 1;
    }
    zip.finish()?;
    Ok(entries)
}

fn entry_name(root: &Path, path: &Path) -> BagResult<String> {
    let rel = path.strip_prefix(root).map_err(|_| {
        BagError::Verification(format!("{} is outside {}", path.display(), root.display()))
    })?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Read every file entry of the zip at `path` into memory, keyed by
/// entry name.
pub fn read_entries(path: &Path) -> BagResult<BTreeMap<String, Vec<u8>>> {
    let file = File::open(path).map_err(BagError::io(path))?;
    let mut archive = ZipArchive::new(file)?;
    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut bytes).map_err(BagError::io(path))?;
        entries.insert(name, bytes);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_relative_sorted_entries() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("data/sub")).unwrap();
        fs::write(root.join("bagit.txt"), "decl").unwrap();
        fs::write(root.join("data/b"), "bb").unwrap();
        fs::write(root.join("data/sub/a"), "aa").unwrap();

        let out = tempfile::NamedTempFile::new().unwrap();
        let n = write_zip(root, out.reopen().unwrap(), Compression::Deflated).unwrap();
        assert_eq!(n, 3);

        let entries = read_entries(out.path()).unwrap();
        let names: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["bagit.txt", "data/b", "data/sub/a"]);
        assert_eq!(entries["data/sub/a"], b"aa");
    }

    #[test]
    fn identical_trees_give_identical_archives() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.txt"), "same").unwrap();

        let mut a = io::Cursor::new(Vec::new());
        let mut b = io::Cursor::new(Vec::new());
        write_zip(dir.path(), &mut a, Compression::Stored).unwrap();
        write_zip(dir.path(), &mut b, Compression::Stored).unwrap();
        assert_eq!(a.into_inner(), b.into_inner());
    }

    #[test]
    fn unreadable_archive_is_an_error() {
        let f = tempfile::NamedTempFile::new().unwrap();
        fs::write(f.path(), "not a zip").unwrap();
        assert!(matches!(read_entries(f.path()), Err(BagError::Archive(_))));
    }
}
