// src/repo.rs

//! Flat repository layout and the index update pipeline
//!
//! A flat repository keeps its archives in a single directory next to the
//! `Packages` and `Release` files:
//!
//! ```text
//! <root>/debs/*.deb
//! <root>/Packages
//! <root>/Packages.bz2
//! <root>/Release
//! ```

use crate::checksum::{md5_hex, sha256_hex};
use crate::error::{Error, Result};
use crate::index::compress::{self, Compression};
use crate::index::packages::{PackagesOptions, build_packages};
use crate::index::release::{ChecksumEntry, ReleaseUpdate, update_release};
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Default directory holding the .deb archives, relative to the root
pub const DEFAULT_DEBS_DIR: &str = "debs";

/// Base name of the generated index
pub const PACKAGES_FILE: &str = "Packages";

pub const RELEASE_FILE: &str = "Release";

/// Settings for one update run
#[derive(Debug, Clone)]
pub struct RepoConfig {
    /// Repository root
    pub root: PathBuf,
    /// Archive directory relative to the root
    pub debs_dir: PathBuf,
    /// Compressed forms written in addition to `Packages.bz2`, in Release order
    pub compressions: Vec<Compression>,
    /// Also emit SHA256 fields and a Release SHA256 section
    pub sha256: bool,
    /// Refresh the Release `Date:` field
    pub touch_date: bool,
}

impl RepoConfig {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            debs_dir: PathBuf::from(DEFAULT_DEBS_DIR),
            compressions: Vec::new(),
            sha256: false,
            touch_date: false,
        }
    }

    /// Prefix used in `Filename:` fields, always '/'-separated
    fn filename_prefix(&self) -> String {
        self.debs_dir
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// `Packages.bz2` first, then the extra forms without duplicates or `none`
    fn effective_compressions(&self) -> Vec<Compression> {
        let mut out = vec![Compression::Bzip2];
        for &comp in &self.compressions {
            if comp == Compression::None {
                warn!("Ignoring 'none' compression: {} is always written", PACKAGES_FILE);
                continue;
            }
            if !out.contains(&comp) {
                out.push(comp);
            }
        }
        out
    }
}

/// A generated file and its size
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub name: String,
    pub size: u64,
}

/// Outcome of an update run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    pub root: PathBuf,
    /// Number of package stanzas in Packages
    pub entries: usize,
    pub packages_size: u64,
    pub compressed: Vec<GeneratedFile>,
    /// Release checksum sections that were written
    pub sections: Vec<String>,
}

impl fmt::Display for UpdateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut files = vec![PACKAGES_FILE.to_string()];
        files.extend(self.compressed.iter().map(|file| file.name.clone()));

        writeln!(
            f,
            "Updated {}, and {} {} entries.",
            files.join(", "),
            RELEASE_FILE,
            self.sections.join("/")
        )?;
        writeln!(f, "{} entries: {}", PACKAGES_FILE, self.entries)?;
        write!(f, "{} size: {}", PACKAGES_FILE, self.packages_size)?;
        for file in &self.compressed {
            write!(f, "\n{} size: {}", file.name, file.size)?;
        }
        Ok(())
    }
}

/// Write `bytes` to `path` through a temporary file in the same directory
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Regenerate Packages, its compressed forms, and the Release checksums
///
/// Both the archive directory and the Release file must exist before
/// anything is written.
pub fn update(config: &RepoConfig) -> Result<UpdateSummary> {
    let root = fs::canonicalize(&config.root).unwrap_or_else(|_| config.root.clone());
    let deb_dir = root.join(&config.debs_dir);
    if !deb_dir.is_dir() {
        return Err(Error::MissingDebsDir(deb_dir.display().to_string()));
    }

    let release_path = root.join(RELEASE_FILE);
    if !release_path.is_file() {
        return Err(Error::ReleaseNotFound(release_path.display().to_string()));
    }

    info!("Indexing {}", deb_dir.display());

    let options = PackagesOptions {
        filename_prefix: config.filename_prefix(),
        sha256: config.sha256,
    };
    let index = build_packages(&deb_dir, &options)?;
    let packages = index.content.as_bytes();

    write_atomic(&root.join(PACKAGES_FILE), packages)?;

    let mut md5_entries = vec![ChecksumEntry::new(
        md5_hex(packages),
        packages.len() as u64,
        PACKAGES_FILE,
    )];
    let mut sha256_entries = vec![ChecksumEntry::new(
        sha256_hex(packages),
        packages.len() as u64,
        PACKAGES_FILE,
    )];
    let mut compressed = Vec::new();

    for comp in config.effective_compressions() {
        let name = format!("{}{}", PACKAGES_FILE, comp.extension());
        let bytes = compress::compress(comp, packages)?;
        write_atomic(&root.join(&name), &bytes)?;

        md5_entries.push(ChecksumEntry::new(md5_hex(&bytes), bytes.len() as u64, &name));
        sha256_entries.push(ChecksumEntry::new(sha256_hex(&bytes), bytes.len() as u64, &name));
        compressed.push(GeneratedFile {
            name,
            size: bytes.len() as u64,
        });
    }

    let release_text = fs::read_to_string(&release_path)?;
    let release_update = ReleaseUpdate {
        md5: md5_entries,
        sha256: config.sha256.then_some(sha256_entries),
        date: config.touch_date.then(Utc::now),
    };
    write_atomic(&release_path, update_release(&release_text, &release_update).as_bytes())?;

    let mut sections = vec!["MD5Sum".to_string()];
    if config.sha256 {
        sections.push("SHA256".to_string());
    }

    info!("Updated {} with {} entries", release_path.display(), index.entries);

    Ok(UpdateSummary {
        root,
        entries: index.entries,
        packages_size: packages.len() as u64,
        compressed,
        sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_debs_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = update(&RepoConfig::new(dir.path())).unwrap_err();
        assert!(matches!(err, Error::MissingDebsDir(_)));
        assert!(err.to_string().starts_with("Missing debs directory at "));
    }

    #[test]
    fn test_missing_release_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("debs")).unwrap();

        let err = update(&RepoConfig::new(dir.path())).unwrap_err();
        assert!(matches!(err, Error::ReleaseNotFound(_)));
        assert!(!dir.path().join("Packages").exists());
        assert!(!dir.path().join("Packages.bz2").exists());
    }

    #[test]
    fn test_empty_repository() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("debs")).unwrap();
        fs::write(dir.path().join("Release"), "Origin: Test\n").unwrap();

        let summary = update(&RepoConfig::new(dir.path())).unwrap();
        assert_eq!(summary.entries, 0);
        assert_eq!(summary.packages_size, 0);
        assert_eq!(fs::read(dir.path().join("Packages")).unwrap(), b"");

        let release = fs::read_to_string(dir.path().join("Release")).unwrap();
        let bz2_size = summary.compressed[0].size;
        assert_eq!(
            release,
            format!(
                "Origin: Test\nMD5Sum:\n {} 0 Packages\n {} {} Packages.bz2\n",
                md5_hex(b""),
                md5_hex(&fs::read(dir.path().join("Packages.bz2")).unwrap()),
                bz2_size
            )
        );
    }

    #[test]
    fn test_filename_prefix_uses_forward_slashes() {
        let mut config = RepoConfig::new("/srv/repo");
        assert_eq!(config.filename_prefix(), "debs");
        config.debs_dir = PathBuf::from("./pool/main/");
        assert_eq!(config.filename_prefix(), "pool/main");
    }

    #[test]
    fn test_effective_compressions_dedupes() {
        let mut config = RepoConfig::new("/srv/repo");
        config.compressions = vec![
            Compression::Xz,
            Compression::None,
            Compression::Gzip,
            Compression::Bzip2,
            Compression::Xz,
        ];
        assert_eq!(
            config.effective_compressions(),
            vec![Compression::Bzip2, Compression::Xz, Compression::Gzip]
        );
    }

    #[test]
    fn test_bzip2_is_always_written() {
        let mut config = RepoConfig::new("/srv/repo");
        assert_eq!(config.effective_compressions(), vec![Compression::Bzip2]);
        config.compressions = vec![Compression::None];
        assert_eq!(config.effective_compressions(), vec![Compression::Bzip2]);
    }

    #[test]
    fn test_summary_display() {
        let summary = UpdateSummary {
            root: PathBuf::from("/srv/repo"),
            entries: 2,
            packages_size: 512,
            compressed: vec![GeneratedFile {
                name: "Packages.bz2".to_string(),
                size: 300,
            }],
            sections: vec!["MD5Sum".to_string()],
        };
        assert_eq!(
            summary.to_string(),
            "Updated Packages, Packages.bz2, and Release MD5Sum entries.\n\
             Packages entries: 2\n\
             Packages size: 512\n\
             Packages.bz2 size: 300"
        );
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Packages");
        fs::write(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }
}
