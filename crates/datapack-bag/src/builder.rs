//! # Bag Builder
//!
//! Stages a [`DataPackage`] as a BagIt tree and compresses it into one zip
//! archive. The build is a fail-fast sequence:
//!
//! 1. create a uniquely named staging tree with `data/`
//! 2. write `bagit.txt`
//! 3. stage every member under `data/`, in identifier order
//! 4. render the resource map as RDF/XML into `data/<map id>.rdf`
//! 5. digest every payload file into the manifest
//! 6. map every identifier to its payload path
//! 7. total the payload size
//! 8. write `bag-info.txt`, `pid-mapping.txt`, `manifest-<alg>.txt`
//! 9. digest the three tag files into `tagmanifest-<alg>.txt`
//! 10. zip the tree and persist it as `<bag id>.zip`
//!
//! ## Invariant
//!
//! An archive file exists at the returned path only if every step
//! succeeded. The zip is written to a temporary file in the output
//! directory and renamed into place last.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use datapack_core::{digest_file, MemberContent};
use datapack_package::DataPackage;
use datapack_rdf::{SerializeOptions, Syntax};
use tempfile::{Builder, NamedTempFile};

use crate::archive;
use crate::config::BagConfig;
use crate::error::{BagError, BagResult};
use crate::info::{
    bagit_declaration, render_pairs, BagInfo, BAGIT_TXT, BAG_INFO_TXT, DATA_DIR, PID_MAPPING_TXT,
};

/// One file written under `data/`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PayloadFile {
    id: String,
    relative: String,
    size: u64,
}

/// Builds BagIt zip archives from packages.
#[derive(Debug, Clone, Default)]
pub struct BagBuilder {
    config: BagConfig,
}

impl BagBuilder {
    /// A builder using `config`.
    pub fn new(config: BagConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &BagConfig {
        &self.config
    }

    /// Stage and compress `package`, returning the archive path.
    pub fn build(&self, package: &DataPackage) -> BagResult<PathBuf> {
        let parent = self.config.staging_root();
        fs::create_dir_all(&parent).map_err(|source| BagError::Staging {
            path: parent.clone(),
            source,
        })?;
        let staging = Builder::new()
            .prefix("datapack-bag-")
            .tempdir_in(&parent)
            .map_err(|source| BagError::Staging {
                path: parent.clone(),
                source,
            })?;
        let root = staging.path();
        let data = root.join(DATA_DIR);
        fs::create_dir(&data).map_err(|source| BagError::Staging {
            path: data.clone(),
            source,
        })?;
        tracing::debug!(staging = %root.display(), "created staging tree");

        write_text(root, BAGIT_TXT, &bagit_declaration())?;

        let mut payload = stage_members(package, &data)?;
        payload.push(self.stage_resource_map(package, &data, &payload)?);

        let algorithm = self.config.digest;
        let mut manifest = Vec::with_capacity(payload.len());
        for file in &payload {
            let path = root.join(&file.relative);
            let digest = digest_file(algorithm, &path).map_err(BagError::io(&path))?;
            manifest.push((digest.to_hex(), file.relative.as_str()));
        }

        let info = BagInfo {
            payload_bytes: payload.iter().map(|f| f.size).sum(),
            payload_files: payload.len() as u64,
            bagging_date: self
                .config
                .bagging_date
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        };
        write_text(root, BAG_INFO_TXT, &info.render())?;
        write_text(
            root,
            PID_MAPPING_TXT,
            &render_pairs(payload.iter().map(|f| (f.id.as_str(), f.relative.as_str()))),
        )?;
        write_text(
            root,
            &algorithm.manifest_file_name(),
            &render_pairs(manifest.iter().map(|(hex, path)| (hex.as_str(), *path))),
        )?;

        let mut tag_manifest = Vec::new();
        for name in [BAG_INFO_TXT, BAGIT_TXT, PID_MAPPING_TXT] {
            let path = root.join(name);
            let digest = digest_file(algorithm, &path).map_err(BagError::io(&path))?;
            tag_manifest.push((digest.to_hex(), name));
        }
        write_text(
            root,
            &algorithm.tag_manifest_file_name(),
            &render_pairs(tag_manifest.iter().map(|(hex, name)| (hex.as_str(), *name))),
        )?;

        let bag_id = package.id_generator().new_id();
        let archive_path = self.compress(root, &bag_id)?;
        tracing::info!(
            archive = %archive_path.display(),
            files = info.payload_files,
            bytes = info.payload_bytes,
            "built bag"
        );
        Ok(archive_path)
    }

    fn stage_resource_map(
        &self,
        package: &DataPackage,
        data: &Path,
        staged: &[PayloadFile],
    ) -> BagResult<PayloadFile> {
        let map_id = package.new_resource_map_id();
        let file_name = format!("{}.rdf", sanitize(&map_id));
        let relative = format!("{DATA_DIR}/{file_name}");
        if let Some(prev) = staged.iter().find(|f| f.relative == relative) {
            return Err(BagError::DuplicatePayloadPath {
                path: relative,
                first: prev.id.clone(),
                second: map_id,
            });
        }

        let xml = package.serialize(&map_id, Syntax::RdfXml, None, &SerializeOptions::default())?;
        let path = data.join(&file_name);
        fs::write(&path, &xml).map_err(BagError::io(&path))?;
        tracing::debug!(map_id = %map_id, bytes = xml.len(), "staged resource map");
        Ok(PayloadFile {
            id: map_id,
            relative,
            size: xml.len() as u64,
        })
    }

    fn compress(&self, root: &Path, bag_id: &str) -> BagResult<PathBuf> {
        let out_dir = self.config.output_root();
        fs::create_dir_all(&out_dir).map_err(BagError::io(&out_dir))?;
        let dest = out_dir.join(format!("{}.zip", sanitize(bag_id)));

        let mut tmp = NamedTempFile::new_in(&out_dir).map_err(BagError::io(&out_dir))?;
        let entries = archive::write_zip(root, tmp.as_file_mut(), self.config.compression)?;
        tmp.persist(&dest).map_err(|e| BagError::Io {
            path: dest.clone(),
            source: e.error,
        })?;
        tracing::debug!(entries, archive = %dest.display(), "compressed bag");
        Ok(dest)
    }
}

/// Copy or write every member into `data`, in identifier order.
fn stage_members(package: &DataPackage, data: &Path) -> BagResult<Vec<PayloadFile>> {
    let mut claimed: BTreeMap<String, String> = BTreeMap::new();
    let mut staged = Vec::with_capacity(package.len());

    for member in package.members() {
        let id = member.identifier();
        let file_name = match member.external_path() {
            Some(src) => src
                .file_name()
                .map(|n| sanitize(&n.to_string_lossy()))
                .unwrap_or_else(|| sanitize(id)),
            None => sanitize(id),
        };
        let relative = format!("{DATA_DIR}/{file_name}");
        if let Some(first) = claimed.get(&relative) {
            return Err(BagError::DuplicatePayloadPath {
                path: relative,
                first: first.clone(),
                second: id.to_string(),
            });
        }

        let dest = data.join(&file_name);
        let size = match member.external_path() {
            Some(src) => {
                if !src.is_file() {
                    return Err(BagError::MissingFile {
                        id: id.to_string(),
                        path: src.to_path_buf(),
                    });
                }
                fs::copy(src, &dest).map_err(BagError::io(src))?
            }
            None => {
                let bytes = member.read_bytes().map_err(BagError::io(&dest))?;
                fs::write(&dest, &bytes).map_err(BagError::io(&dest))?;
                bytes.len() as u64
            }
        };
        tracing::debug!(id, path = %relative, size, "staged member");

        claimed.insert(relative.clone(), id.to_string());
        staged.push(PayloadFile {
            id: id.to_string(),
            relative,
            size,
        });
    }
    Ok(staged)
}

fn write_text(root: &Path, name: &str, contents: &str) -> BagResult<()> {
    let path = root.join(name);
    fs::write(&path, contents).map_err(BagError::io(&path))
}

/// File name for an identifier: path separators and control characters
/// become `_`, and names that would address the parent or current
/// directory are prefixed with `_`.
///
/// Manifest and pid-mapping files are line oriented, so a payload path
/// must never contain a line break.
pub fn sanitize(id: &str) -> String {
    let name: String = id
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    match name.as_str() {
        "" | "." | ".." => format!("_{name}"),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use datapack_core::{Member, SequentialIdGenerator};
    use std::sync::Arc;

    fn config(dir: &Path) -> BagConfig {
        BagConfig {
            staging_dir: Some(dir.join("staging")),
            output_dir: Some(dir.join("out")),
            bagging_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..BagConfig::default()
        }
    }

    fn package() -> DataPackage {
        DataPackage::with_id_generator(Arc::new(SequentialIdGenerator::new("t")))
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize("a/b\\c"), "a_b_c");
        assert_eq!(sanitize(".."), "_..");
        assert_eq!(sanitize("doi:10.5063/F1"), "doi:10.5063_F1");
    }

    #[test]
    fn sanitize_removes_line_breaks() {
        assert_eq!(sanitize("a\nb"), "a_b");
        assert_eq!(sanitize("a\r\nb\t"), "a__b_");
    }

    #[test]
    fn archive_named_after_bag_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = package();
        p.add_member(Member::from_bytes("do1", "x").unwrap());
        let path = BagBuilder::new(config(dir.path())).build(&p).unwrap();
        // t1 is the package id, t2 the resource map id.
        assert_eq!(path, dir.path().join("out").join("t3.zip"));
        assert!(path.is_file());
    }

    #[test]
    fn staging_tree_is_removed_after_build() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = package();
        p.add_member(Member::from_bytes("do1", "x").unwrap());
        BagBuilder::new(config(dir.path())).build(&p).unwrap();
        let left: Vec<_> = fs::read_dir(dir.path().join("staging")).unwrap().collect();
        assert!(left.is_empty());
    }

    #[test]
    fn external_file_is_copied_under_its_basename() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("table.csv");
        fs::write(&src, "a,b\n").unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();

        let mut p = package();
        p.add_member(Member::from_file("urn:x:table", &src).unwrap());
        let staged = stage_members(&p, &data).unwrap();
        assert_eq!(
            staged,
            vec![PayloadFile {
                id: "urn:x:table".into(),
                relative: "data/table.csv".into(),
                size: 4,
            }]
        );
        assert_eq!(fs::read(data.join("table.csv")).unwrap(), b"a,b\n");
    }

    #[test]
    fn colliding_payload_paths_fail() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = package();
        p.add_member(Member::from_bytes("a/b", "1").unwrap());
        p.add_member(Member::from_bytes("a_b", "2").unwrap());
        let err = BagBuilder::new(config(dir.path())).build(&p).unwrap_err();
        match err {
            BagError::DuplicatePayloadPath { path, first, second } => {
                assert_eq!(path, "data/a_b");
                assert_eq!(first, "a/b");
                assert_eq!(second, "a_b");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(fs::read_dir(dir.path().join("out")).ok().map(|d| d.count()), None);
    }

    #[test]
    fn stored_compression_and_sha256() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.compression = crate::config::Compression::Stored;
        cfg.digest = datapack_core::DigestAlgorithm::Sha256;
        let mut p = package();
        p.add_member(Member::from_bytes("do1", "x").unwrap());

        let path = BagBuilder::new(cfg).build(&p).unwrap();
        let entries = archive::read_entries(&path).unwrap();
        assert!(entries.contains_key("manifest-sha256.txt"));
        assert!(entries.contains_key("tagmanifest-sha256.txt"));
        assert!(!entries.contains_key("manifest-md5.txt"));
    }
}
