//! Tag file contents: `bagit.txt`, `bag-info.txt`, and the two-column
//! manifest and pid-mapping formats.

use std::fmt::Write as _;

use chrono::NaiveDate;

/// BagIt version written to `bagit.txt`.
pub const BAGIT_VERSION: &str = "0.97";

/// Bag declaration file name.
pub const BAGIT_TXT: &str = "bagit.txt";
/// Bag metadata file name.
pub const BAG_INFO_TXT: &str = "bag-info.txt";
/// Identifier-to-path mapping file name.
pub const PID_MAPPING_TXT: &str = "pid-mapping.txt";

/// Payload directory name.
pub const DATA_DIR: &str = "data";

/// Contents of `bagit.txt`.
pub fn bagit_declaration() -> String {
    format!("BagIt-Version: {BAGIT_VERSION}\nTag-File-Character-Encoding: UTF-8\n")
}

/// The fields written to `bag-info.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagInfo {
    /// Total payload bytes.
    pub payload_bytes: u64,
    /// Number of payload files.
    pub payload_files: u64,
    /// Date the bag was assembled.
    pub bagging_date: NaiveDate,
}

impl BagInfo {
    /// `<bytes>.<count>`.
    pub fn payload_oxum(&self) -> String {
        format!("{}.{}", self.payload_bytes, self.payload_files)
    }

    /// Render `bag-info.txt`.
    pub fn render(&self) -> String {
        format!(
            "Payload-Oxum: {}\nBagging-Date: {}\nBag-Size: {}\n",
            self.payload_oxum(),
            self.bagging_date.format("%Y-%m-%d"),
            format_bag_size(self.payload_bytes)
        )
    }
}

/// Human-scaled size with mixed-base thresholds.
///
/// Below 1024 bytes the integer count is shown in `B`. KB divides by 1024
/// and applies below 1,000,000 bytes; MB and GB divide by 10^6 and 10^9.
pub fn format_bag_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let (value, unit) = if bytes < 1_000_000 {
        (bytes as f64 / 1024.0, "KB")
    } else if bytes < 1_000_000_000 {
        (bytes as f64 / 1_000_000.0, "MB")
    } else {
        (bytes as f64 / 1_000_000_000.0, "GB")
    };
    format!("{value:.2} {unit}")
}

/// Parse an `Oxum` value into `(bytes, files)`.
pub fn parse_oxum(value: &str) -> Option<(u64, u64)> {
    let (bytes, files) = value.trim().split_once('.')?;
    Some((bytes.parse().ok()?, files.parse().ok()?))
}

/// Parse `Label: value` lines. Continuation lines (leading whitespace)
/// extend the previous value.
pub fn parse_tag_fields(text: &str) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = Vec::new();
    for line in text.lines() {
        if line.starts_with(|c: char| c == ' ' || c == '\t') {
            if let Some((_, value)) = fields.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }
        if let Some((label, value)) = line.split_once(':') {
            fields.push((label.trim().to_string(), value.trim().to_string()));
        }
    }
    fields
}

/// Render `<left> <right>` lines.
pub fn render_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut out = String::new();
    for (left, right) in pairs {
        let _ = writeln!(out, "{left} {right}");
    }
    out
}

/// Parse a manifest line `<hex> <path>`; the path may contain spaces.
pub fn parse_manifest_line(line: &str) -> Option<(&str, &str)> {
    let (digest, path) = line.trim_end_matches('\r').split_once(char::is_whitespace)?;
    let path = path.trim_start();
    (!digest.is_empty() && !path.is_empty()).then_some((digest, path))
}

/// Parse a pid-mapping line `<identifier> data/<file>`; the identifier may
/// contain spaces.
pub fn parse_pid_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches('\r');
    let marker = format!(" {DATA_DIR}/");
    let idx = line.rfind(&marker)?;
    Some((&line[..idx], &line[idx + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bag_size_thresholds() {
        assert_eq!(format_bag_size(0), "0 B");
        assert_eq!(format_bag_size(22), "22 B");
        assert_eq!(format_bag_size(1023), "1023 B");
        assert_eq!(format_bag_size(1024), "1.00 KB");
        assert_eq!(format_bag_size(1536), "1.50 KB");
        assert_eq!(format_bag_size(999_999), "976.56 KB");
        assert_eq!(format_bag_size(1_000_000), "1.00 MB");
        assert_eq!(format_bag_size(2_500_000), "2.50 MB");
        assert_eq!(format_bag_size(1_000_000_000), "1.00 GB");
        assert_eq!(format_bag_size(12_340_000_000), "12.34 GB");
    }

    #[test]
    fn bag_info_layout() {
        let info = BagInfo {
            payload_bytes: 1700,
            payload_files: 3,
            bagging_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        };
        assert_eq!(
            info.render(),
            "Payload-Oxum: 1700.3\nBagging-Date: 2024-05-01\nBag-Size: 1.66 KB\n"
        );
    }

    #[test]
    fn declaration_is_two_lines() {
        assert_eq!(
            bagit_declaration(),
            "BagIt-Version: 0.97\nTag-File-Character-Encoding: UTF-8\n"
        );
    }

    #[test]
    fn oxum_parsing() {
        assert_eq!(parse_oxum("1700.3"), Some((1700, 3)));
        assert_eq!(parse_oxum("17003"), None);
        assert_eq!(parse_oxum("a.b"), None);
    }

    #[test]
    fn tag_fields_with_continuation() {
        let fields = parse_tag_fields("Payload-Oxum: 10.2\nExternal-Description: one\n  two\n");
        assert_eq!(
            fields,
            vec![
                ("Payload-Oxum".to_string(), "10.2".to_string()),
                ("External-Description".to_string(), "one two".to_string()),
            ]
        );
    }

    #[test]
    fn line_parsers() {
        assert_eq!(
            parse_manifest_line("abc123 data/my file.csv"),
            Some(("abc123", "data/my file.csv"))
        );
        assert_eq!(parse_manifest_line("abc123"), None);
        assert_eq!(
            parse_pid_line("doi:10.1/x y data/x_y"),
            Some(("doi:10.1/x y", "data/x_y"))
        );
        assert_eq!(render_pairs([("a", "data/a"), ("b", "data/b")]), "a data/a\nb data/b\n");
    }
}
