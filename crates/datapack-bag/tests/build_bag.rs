//! End-to-end bag builds: stage a package, open the zip, and check its
//! layout, manifests and resource map.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use datapack_bag::archive::read_entries;
use datapack_bag::{verify_archive, BagBuilder, BagConfig, BagError};
use datapack_core::{digest_bytes, DigestAlgorithm, Member, SequentialIdGenerator};
use datapack_package::DataPackage;
use quick_xml::events::Event;
use quick_xml::Reader;

const DO1: &str = "1,2,3\n4,5,6";
const DO2: &str = "7,8,9\n4,10,11";

fn config(dir: &Path) -> BagConfig {
    BagConfig {
        staging_dir: Some(dir.join("staging")),
        output_dir: Some(dir.join("out")),
        bagging_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        ..BagConfig::default()
    }
}

fn scenario_package() -> DataPackage {
    let mut package = DataPackage::new();
    package.add_member(Member::from_bytes("do1", DO1).unwrap());
    package.add_member(Member::from_bytes("do2", DO2).unwrap());
    package.record_derivation("do2", &["do2"]).unwrap();
    package
}

fn text(entries: &std::collections::BTreeMap<String, Vec<u8>>, name: &str) -> String {
    String::from_utf8(entries[name].clone()).unwrap()
}

#[test]
fn scenario_bag_has_expected_layout_and_digests() {
    let dir = tempfile::tempdir().unwrap();
    let path = BagBuilder::new(config(dir.path()))
        .build(&scenario_package())
        .unwrap();
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("zip"));

    let entries = read_entries(&path).unwrap();
    for name in [
        "bagit.txt",
        "bag-info.txt",
        "pid-mapping.txt",
        "manifest-md5.txt",
        "tagmanifest-md5.txt",
        "data/do1",
        "data/do2",
    ] {
        assert!(entries.contains_key(name), "missing {name}");
    }
    let maps: Vec<&String> = entries
        .keys()
        .filter(|k| k.starts_with("data/") && k.ends_with(".rdf"))
        .collect();
    assert_eq!(maps.len(), 1);
    assert_eq!(entries.len(), 8);

    assert_eq!(entries["data/do1"], DO1.as_bytes());
    assert_eq!(
        text(&entries, "bagit.txt"),
        "BagIt-Version: 0.97\nTag-File-Character-Encoding: UTF-8\n"
    );

    let manifest = text(&entries, "manifest-md5.txt");
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in &lines {
        let (hex, rel) = line.split_once(' ').unwrap();
        assert_eq!(hex, digest_bytes(DigestAlgorithm::Md5, &entries[rel]).to_hex());
    }
    assert_eq!(lines[0], format!("{} data/do1", digest_bytes(DigestAlgorithm::Md5, DO1.as_bytes()).to_hex()));
    assert!(lines[1].ends_with(" data/do2"));
    assert!(lines[2].ends_with(".rdf"));

    let tags = text(&entries, "tagmanifest-md5.txt");
    let tag_names: Vec<&str> = tags
        .lines()
        .map(|l| l.split_once(' ').unwrap().1)
        .collect();
    assert_eq!(tag_names, vec!["bag-info.txt", "bagit.txt", "pid-mapping.txt"]);

    let map_file = maps[0].as_str();
    let map_id = map_file
        .strip_prefix("data/")
        .and_then(|f| f.strip_suffix(".rdf"))
        .unwrap();
    assert_eq!(
        text(&entries, "pid-mapping.txt"),
        format!("do1 data/do1\ndo2 data/do2\n{map_id} {map_file}\n")
    );

    let rdf_len = entries[map_file].len();
    let total = DO1.len() + DO2.len() + rdf_len;
    let info = text(&entries, "bag-info.txt");
    assert!(info.starts_with(&format!("Payload-Oxum: {total}.3\nBagging-Date: 2024-05-01\nBag-Size: ")));

    let report = verify_archive(&path).unwrap();
    assert!(report.is_valid(), "{:?}", report.problems);
}

#[test]
fn resource_map_is_well_formed_and_aggregates_members() {
    let dir = tempfile::tempdir().unwrap();
    let path = BagBuilder::new(config(dir.path()))
        .build(&scenario_package())
        .unwrap();
    let entries = read_entries(&path).unwrap();
    let (_, xml) = entries
        .iter()
        .find(|(k, _)| k.ends_with(".rdf"))
        .unwrap();

    let mut reader = Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();
    let mut aggregated = Vec::new();
    let mut derived = 0;
    loop {
        match reader.read_event_into(&mut buf).unwrap() {
            Event::Empty(e) => {
                let name = e.name().as_ref().to_vec();
                for attr in e.attributes() {
                    let attr = attr.unwrap();
                    if attr.key.as_ref() == b"rdf:resource" {
                        let value = attr.unescape_value().unwrap().into_owned();
                        if name == b"ore:aggregates" {
                            aggregated.push(value);
                        } else if name == b"prov:wasDerivedFrom" {
                            assert_eq!(value, "do2");
                            derived += 1;
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    aggregated.sort();
    assert_eq!(aggregated, vec!["do1", "do2"]);
    assert_eq!(derived, 1);
}

#[test]
fn missing_external_file_produces_no_archive() {
    let dir = tempfile::tempdir().unwrap();
    let mut package = scenario_package();
    package.add_member(Member::from_file("do3", dir.path().join("absent.csv")).unwrap());

    let err = BagBuilder::new(config(dir.path())).build(&package).unwrap_err();
    assert!(matches!(err, BagError::MissingFile { ref id, .. } if id == "do3"));

    let out = dir.path().join("out");
    let archives = fs::read_dir(&out).map(|d| d.count()).unwrap_or(0);
    assert_eq!(archives, 0);
}

#[test]
fn builds_of_the_same_package_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let builder = BagBuilder::new(config(dir.path()));
    let package = scenario_package();
    let a = builder.build(&package).unwrap();
    let b = builder.build(&package).unwrap();
    assert_ne!(a, b);
    assert!(a.is_file() && b.is_file());
}

#[test]
fn sequential_ids_make_bags_reproducible() {
    let build = |dir: &Path| {
        let mut package =
            DataPackage::with_id_generator(Arc::new(SequentialIdGenerator::new("r")));
        package.add_member(Member::from_bytes("do1", DO1).unwrap());
        package.record_derivation("do1", &["do1"]).unwrap();
        let path = BagBuilder::new(config(dir)).build(&package).unwrap();
        fs::read(path).unwrap()
    };
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    assert_eq!(build(a.path()), build(b.path()));
}

#[test]
fn external_files_are_copied_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("measurements.csv");
    fs::write(&src, "t,v\n0,1.5\n").unwrap();

    let mut package = DataPackage::new();
    package.add_member(Member::from_file("urn:x:measurements", &src).unwrap());
    let path = BagBuilder::new(config(dir.path())).build(&package).unwrap();

    let entries = read_entries(&path).unwrap();
    assert_eq!(entries["data/measurements.csv"], b"t,v\n0,1.5\n");
    assert!(text(&entries, "pid-mapping.txt").starts_with("urn:x:measurements data/measurements.csv\n"));
}

#[test]
fn identifiers_with_line_breaks_never_reach_the_manifest() {
    assert!(Member::from_bytes("a\nb", "x").is_err());
    assert!(Member::from_file("a\r\nb", "a.csv").is_err());
}

#[cfg(unix)]
#[test]
fn external_file_name_with_line_break_still_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("two\nlines.csv");
    fs::write(&src, "a,b\n").unwrap();

    let mut package = DataPackage::new();
    package.add_member(Member::from_file("urn:x:lines", &src).unwrap());
    let path = BagBuilder::new(config(dir.path())).build(&package).unwrap();

    let entries = read_entries(&path).unwrap();
    assert_eq!(entries["data/two_lines.csv"], b"a,b\n");
    let manifest = text(&entries, "manifest-md5.txt");
    assert_eq!(manifest.lines().count(), 2, "{manifest}");

    let report = verify_archive(&path).unwrap();
    assert!(report.is_valid(), "{:?}", report.problems);
    assert!(report
        .pid_mapping
        .iter()
        .any(|(id, p)| id == "urn:x:lines" && p == "data/two_lines.csv"));
}
