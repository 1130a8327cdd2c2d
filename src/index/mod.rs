// src/index/mod.rs

//! Repository index files
//!
//! - `packages`: synthesize the Packages index from .deb archives
//! - `compress`: compressed forms of the index (Packages.bz2, ...)
//! - `release`: refresh the checksum block of the Release manifest
//! - `check`: verify an existing index against the files on disk

pub mod check;
pub mod compress;
pub mod packages;
pub mod release;

pub use compress::Compression;
pub use packages::{PackagesIndex, PackagesOptions, build_packages};
pub use release::{ChecksumEntry, ReleaseUpdate, update_release};
