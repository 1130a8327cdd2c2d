// src/packages/deb.rs

//! Debian package archive reader
//!
//! A .deb is an AR archive holding `debian-binary`, a `control.tar.*` and a
//! `data.tar.*`. Only the control tarball is read; the archive itself is
//! hashed whole for the index.

use crate::checksum::{md5_hex, sha256_hex};
use crate::error::{Error, Result};
use crate::index::compress::{self, Compression};
use crate::packages::control::ControlFields;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::debug;

/// Prefix of the control tarball member inside a .deb
const CONTROL_MEMBER_PREFIX: &str = "control.tar";

/// A .deb archive with its control stanza and archive-level digests
#[derive(Debug, Clone)]
pub struct DebArchive {
    path: PathBuf,
    file_name: String,
    size: u64,
    md5: String,
    sha256: String,
    control: ControlFields,
}

impl DebArchive {
    /// Read a .deb from disk and extract its control stanza
    pub fn open(path: &Path) -> Result<Self> {
        debug!("Reading Debian package: {}", path.display());

        let data = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let control_text = Self::extract_control_text(&data, &file_name)?;
        let control = ControlFields::parse(&control_text);

        debug!(
            "Parsed {}: {} control fields, {} bytes",
            file_name,
            control.len(),
            data.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size: data.len() as u64,
            md5: md5_hex(&data),
            sha256: sha256_hex(&data),
            control,
        })
    }

    /// Extract the decoded control file from raw .deb bytes
    ///
    /// `name` is only used in error messages.
    pub fn extract_control_text(data: &[u8], name: &str) -> Result<String> {
        let (member, blob) = Self::extract_control_member(data, name)?;
        let bytes = Self::read_control_file(&member, &blob, name)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Find the first `control.tar*` member of the AR archive
    fn extract_control_member(data: &[u8], name: &str) -> Result<(String, Vec<u8>)> {
        let mut archive = ar::Archive::new(data);

        while let Some(entry) = archive.next_entry() {
            let mut entry = entry
                .map_err(|e| Error::ArchiveError(format!("Failed to read AR entry in {}: {}", name, e)))?;

            let identifier = String::from_utf8_lossy(entry.header().identifier()).to_string();
            let identifier = identifier.trim_end_matches('/');

            if identifier == CONTROL_MEMBER_PREFIX
                || identifier.starts_with(&format!("{}.", CONTROL_MEMBER_PREFIX))
            {
                let mut content = Vec::new();
                entry.read_to_end(&mut content).map_err(|e| {
                    Error::ArchiveError(format!("Failed to read {} from {}: {}", identifier, name, e))
                })?;
                return Ok((identifier.to_string(), content));
            }
        }

        Err(Error::MissingControlMember(name.to_string()))
    }

    /// Locate the `control` regular file inside the control tarball
    fn read_control_file(member: &str, blob: &[u8], name: &str) -> Result<Vec<u8>> {
        let compression =
            Compression::from_file_name(member).unwrap_or_else(|| Compression::detect(blob));
        debug!("{}: {} is {} compressed", name, member, compression);

        let reader = compress::decompress_reader(blob, compression)?;
        let mut archive = Archive::new(reader);

        let entries = archive
            .entries()
            .map_err(|e| Error::ArchiveError(format!("Failed to read {}: {}", member, e)))?;

        for entry in entries {
            let mut entry = entry
                .map_err(|e| Error::ArchiveError(format!("Failed to read entry in {}: {}", member, e)))?;

            if !entry.header().entry_type().is_file() {
                continue;
            }

            let is_control = entry
                .path()
                .map_err(|e| Error::ArchiveError(format!("Failed to get entry path: {}", e)))?
                .file_name()
                .is_some_and(|file_name| file_name == "control");

            if is_control {
                let mut content = Vec::new();
                entry
                    .read_to_end(&mut content)
                    .map_err(|e| Error::ArchiveError(format!("Failed to read control file: {}", e)))?;
                return Ok(content);
            }
        }

        Err(Error::MissingControlFile(name.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Size of the whole archive in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn md5(&self) -> &str {
        &self.md5
    }

    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn control(&self) -> &ControlFields {
        &self.control
    }

    /// Package name from the control stanza
    pub fn name(&self) -> Option<&str> {
        self.control.get("Package")
    }

    pub fn version(&self) -> Option<&str> {
        self.control.get("Version")
    }
}
