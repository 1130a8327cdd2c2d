// src/index/packages.rs

//! Packages index synthesis
//!
//! Each .deb contributes one stanza: its control fields, minus any stale
//! location and checksum fields, followed by the fields describing the
//! archive as it sits in the repository.

use crate::error::Result;
use crate::packages::{ControlFields, DebArchive};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Fields recomputed for every entry, never copied from the control file
const GENERATED_FIELDS: &[&str] = &["Filename", "Size", "MD5sum"];

/// Options controlling the stanza layout
#[derive(Debug, Clone)]
pub struct PackagesOptions {
    /// Directory prefix written into `Filename:` (e.g. "debs")
    pub filename_prefix: String,
    /// Append a `SHA256:` field after `MD5sum:`
    pub sha256: bool,
}

impl Default for PackagesOptions {
    fn default() -> Self {
        Self {
            filename_prefix: "debs".to_string(),
            sha256: false,
        }
    }
}

/// A rendered Packages file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagesIndex {
    pub content: String,
    /// Number of stanzas carrying a `Package:` field
    pub entries: usize,
}

/// List the .deb files directly inside `dir`, sorted by file name
pub fn scan_debs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut debs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_none_or(|ext| ext != "deb") {
            continue;
        }
        if !path.is_file() {
            warn!("Skipping {}: not a regular file", path.display());
            continue;
        }
        debs.push(path);
    }

    debs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} .deb files in {}", debs.len(), dir.display());
    Ok(debs)
}

/// Render one Packages stanza, terminated by a blank line
pub fn format_entry(
    control: &ControlFields,
    filename: &str,
    size: u64,
    md5: &str,
    sha256: Option<&str>,
) -> String {
    let mut fields = if sha256.is_some() {
        control.without(&["Filename", "Size", "MD5sum", "SHA256"])
    } else {
        control.without(GENERATED_FIELDS)
    };

    fields.push("Filename", filename);
    fields.push("Size", size.to_string());
    fields.push("MD5sum", md5);
    if let Some(sha256) = sha256 {
        fields.push("SHA256", sha256);
    }

    let mut out = fields.render();
    out.push('\n');
    out
}

/// Stanza for an already-opened archive
pub fn format_archive(archive: &DebArchive, options: &PackagesOptions) -> String {
    let filename = if options.filename_prefix.is_empty() {
        archive.file_name().to_string()
    } else {
        format!(
            "{}/{}",
            options.filename_prefix.trim_end_matches('/'),
            archive.file_name()
        )
    };

    format_entry(
        archive.control(),
        &filename,
        archive.size(),
        archive.md5(),
        options.sha256.then(|| archive.sha256()),
    )
}

/// Build the Packages index for every .deb in `deb_dir`
///
/// Archives are read in parallel; stanzas are emitted in file name order.
pub fn build_packages(deb_dir: &Path, options: &PackagesOptions) -> Result<PackagesIndex> {
    let debs = scan_debs(deb_dir)?;

    let archives = debs
        .par_iter()
        .map(|path| DebArchive::open(path))
        .collect::<Result<Vec<_>>>()?;

    let mut content = String::new();
    let mut entries = 0;
    for archive in &archives {
        match archive.name() {
            Some(name) => {
                debug!("Indexed {} {}", name, archive.version().unwrap_or("(no version)"));
                entries += 1;
            }
            None => warn!("{} has no Package field", archive.file_name()),
        }
        content.push_str(&format_archive(archive, options));
    }

    info!(
        "Built Packages index: {} entries from {} archives",
        entries,
        archives.len()
    );

    Ok(PackagesIndex { content, entries })
}
