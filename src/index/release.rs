// src/index/release.rs

//! Release manifest checksum refresh
//!
//! The header fields of an existing Release file (Origin, Suite, ...) are
//! kept as written. Everything from the first checksum section onward is
//! replaced with freshly computed entries.

use crate::checksum::HashAlgorithm;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::fmt::Write as _;

/// One ` <hash> <size> <path>` line of a Release checksum section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumEntry {
    pub hash: String,
    pub size: u64,
    pub path: String,
}

impl ChecksumEntry {
    pub fn new<H: Into<String>, P: Into<String>>(hash: H, size: u64, path: P) -> Self {
        Self {
            hash: hash.into(),
            size,
            path: path.into(),
        }
    }

    /// Parse a checksum line with its leading space already removed
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let (Some(hash), Some(size), Some(path), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::ParseError(format!("Malformed checksum line: {:?}", line)));
        };

        let size = size
            .parse()
            .map_err(|e| Error::ParseError(format!("Invalid size '{}': {}", size, e)))?;

        Ok(Self::new(hash, size, path))
    }
}

impl fmt::Display for ChecksumEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.hash, self.size, self.path)
    }
}

/// New checksum sections and header tweaks for a Release file
#[derive(Debug, Clone, Default)]
pub struct ReleaseUpdate {
    pub md5: Vec<ChecksumEntry>,
    /// Written as a `SHA256:` section after `MD5Sum:` when present
    pub sha256: Option<Vec<ChecksumEntry>>,
    /// Replaces (or adds) the `Date:` field
    pub date: Option<DateTime<Utc>>,
}

/// Format a timestamp the way Release `Date:` fields are written
pub fn format_release_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S UTC").to_string()
}

fn is_section_header(line: &str, update: &ReleaseUpdate) -> bool {
    let trimmed = line.trim();
    trimmed == "MD5Sum:" || (update.sha256.is_some() && trimmed == "SHA256:")
}

/// Rewrite `text` with the checksum sections from `update`
///
/// Lines before the first `MD5Sum:` header (or `SHA256:` when a SHA256
/// section is being written) are kept; that header and everything after it
/// is dropped. Without such a header the whole text is kept.
pub fn update_release(text: &str, update: &ReleaseUpdate) -> String {
    let mut out = String::new();
    let mut date_written = false;

    for line in text.lines() {
        if is_section_header(line, update) {
            break;
        }
        match &update.date {
            Some(date) if line.starts_with("Date:") => {
                writeln!(out, "Date: {}", format_release_date(date)).ok();
                date_written = true;
            }
            _ => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    if let Some(date) = &update.date {
        if !date_written {
            writeln!(out, "Date: {}", format_release_date(date)).ok();
        }
    }

    out.push_str("MD5Sum:\n");
    for entry in &update.md5 {
        writeln!(out, " {}", entry).ok();
    }

    if let Some(entries) = &update.sha256 {
        out.push_str("SHA256:\n");
        for entry in entries {
            writeln!(out, " {}", entry).ok();
        }
    }

    out
}

/// Checksum entries of every section in a Release file
///
/// Sections whose name is not a known digest are returned with `None` as
/// the algorithm so callers can report them; their lines are skipped when
/// they do not look like checksum entries.
pub fn parse_checksums(text: &str) -> Result<Vec<(String, Option<HashAlgorithm>, ChecksumEntry)>> {
    let mut entries = Vec::new();
    let mut section: Option<String> = None;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(' ') {
            let Some(name) = &section else {
                continue;
            };
            match HashAlgorithm::from_release_section(name) {
                Some(algorithm) => {
                    entries.push((name.clone(), Some(algorithm), ChecksumEntry::parse(rest)?));
                }
                // Multi-line fields such as Description are not checksums
                None => {
                    if let Ok(entry) = ChecksumEntry::parse(rest) {
                        entries.push((name.clone(), None, entry));
                    }
                }
            }
        } else if let Some(name) = line.strip_suffix(':') {
            section = Some(name.trim().to_string());
        } else {
            section = None;
        }
    }

    Ok(entries)
}
