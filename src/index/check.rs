// src/index/check.rs

//! Consistency check of an existing index
//!
//! Reads back `Packages` and `Release` and compares every referenced file
//! with what is actually on disk.

use crate::checksum::{HashAlgorithm, md5_hex};
use crate::error::{Error, Result};
use crate::index::release::parse_checksums;
use crate::packages::ControlFields;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Packages stanza fields needed for verification
#[derive(Debug)]
struct IndexedPackage<'a> {
    package: &'a str,
    version: Option<&'a str>,
    filename: &'a str,
    size: &'a str,
    md5sum: &'a str,
}

impl<'a> IndexedPackage<'a> {
    /// Pick the verification fields out of a stanza, first occurrence wins
    fn from_fields(fields: &'a ControlFields, index: usize) -> Result<Self> {
        let require = |key: &str| {
            fields.get(key).ok_or_else(|| {
                Error::ParseError(format!(
                    "Packages stanza {} has no {} field",
                    index + 1,
                    key
                ))
            })
        };

        Ok(Self {
            package: require("Package")?,
            version: fields.get("Version"),
            filename: require("Filename")?,
            size: require("Size")?,
            md5sum: require("MD5sum")?,
        })
    }
}

/// A single inconsistency between the index and the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    /// A file referenced by the index does not exist
    Missing { source: String, path: String },
    SizeMismatch {
        source: String,
        path: String,
        expected: u64,
        actual: u64,
    },
    ChecksumMismatch {
        source: String,
        path: String,
        algorithm: HashAlgorithm,
        expected: String,
        actual: String,
    },
    /// A field that should hold a number does not
    InvalidField {
        source: String,
        path: String,
        field: String,
        value: String,
    },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing { source, path } => write!(f, "{}: {} is missing", source, path),
            Problem::SizeMismatch {
                source,
                path,
                expected,
                actual,
            } => write!(
                f,
                "{}: {} size mismatch (expected {}, found {})",
                source, path, expected, actual
            ),
            Problem::ChecksumMismatch {
                source,
                path,
                algorithm,
                expected,
                actual,
            } => write!(
                f,
                "{}: {} {} mismatch (expected {}, found {})",
                source, path, algorithm, expected, actual
            ),
            Problem::InvalidField {
                source,
                path,
                field,
                value,
            } => write!(f, "{}: {} has invalid {} '{}'", source, path, field, value),
        }
    }
}

/// Result of checking a repository
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    /// Number of file references that were verified
    pub checked: usize,
    pub problems: Vec<Problem>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Compare one file on disk against an expected size and digest
fn verify_file(
    report: &mut CheckReport,
    root: &Path,
    source: &str,
    path: &str,
    size: u64,
    algorithm: HashAlgorithm,
    expected: &str,
) -> Result<()> {
    report.checked += 1;
    let full_path = root.join(path);

    if !full_path.is_file() {
        report.problems.push(Problem::Missing {
            source: source.to_string(),
            path: path.to_string(),
        });
        return Ok(());
    }

    let data = fs::read(&full_path)?;
    if data.len() as u64 != size {
        report.problems.push(Problem::SizeMismatch {
            source: source.to_string(),
            path: path.to_string(),
            expected: size,
            actual: data.len() as u64,
        });
    }

    let actual = algorithm.hex_digest(&data);
    if !actual.eq_ignore_ascii_case(expected) {
        report.problems.push(Problem::ChecksumMismatch {
            source: source.to_string(),
            path: path.to_string(),
            algorithm,
            expected: expected.to_string(),
            actual,
        });
    }

    Ok(())
}

/// Verify every `Filename:` of a Packages file relative to `root`
pub fn check_packages(root: &Path, content: &str, report: &mut CheckReport) -> Result<()> {
    let stanzas = ControlFields::parse_stanzas(content);

    debug!("Checking {} Packages entries", stanzas.len());

    for (index, fields) in stanzas.iter().enumerate() {
        let package = IndexedPackage::from_fields(fields, index)?;
        debug!(
            "Checking {} {}",
            package.package,
            package.version.unwrap_or("(no version)")
        );

        let Ok(size) = package.size.trim().parse::<u64>() else {
            report.problems.push(Problem::InvalidField {
                source: "Packages".to_string(),
                path: package.filename.to_string(),
                field: "Size".to_string(),
                value: package.size.to_string(),
            });
            continue;
        };

        verify_file(
            report,
            root,
            "Packages",
            package.filename,
            size,
            HashAlgorithm::Md5,
            package.md5sum.trim(),
        )?;
    }

    Ok(())
}

/// Verify every checksum line of a Release file relative to `root`
pub fn check_release(root: &Path, content: &str, report: &mut CheckReport) -> Result<()> {
    for (section, algorithm, entry) in parse_checksums(content)? {
        let Some(algorithm) = algorithm else {
            warn!("Skipping {} in unsupported Release section {}", entry.path, section);
            continue;
        };
        verify_file(
            report,
            root,
            "Release",
            &entry.path,
            entry.size,
            algorithm,
            &entry.hash,
        )?;
    }
    Ok(())
}

/// Check `Packages` and `Release` under `root`
pub fn check_repository(root: &Path) -> Result<CheckReport> {
    let mut report = CheckReport::default();

    let packages_path = root.join("Packages");
    if !packages_path.is_file() {
        return Err(Error::PackagesNotFound(packages_path.display().to_string()));
    }
    let packages = fs::read_to_string(&packages_path)?;
    check_packages(root, &packages, &mut report)?;

    let release_path = root.join("Release");
    if !release_path.is_file() {
        return Err(Error::ReleaseNotFound(release_path.display().to_string()));
    }
    let release = fs::read_to_string(&release_path)?;
    check_release(root, &release, &mut report)?;

    info!(
        "Checked {} file references, {} problems",
        report.checked,
        report.problems.len()
    );
    if report.is_clean() {
        debug!("Index is consistent (Packages MD5 {})", md5_hex(packages.as_bytes()));
    }

    Ok(report)
}
