// src/lib.rs

//! debindex
//!
//! Regenerates the index metadata of a flat-file Debian repository: scans a
//! directory of `.deb` archives, writes `Packages` and its compressed forms,
//! and refreshes the checksum block of `Release`.
//!
//! # Architecture
//!
//! - `packages`: reading `.deb` archives and their control stanzas
//! - `index`: synthesizing `Packages`, compressing it, updating `Release`,
//!   and verifying an existing index against the files on disk
//! - `repo`: the on-disk repository layout and the update pipeline

pub mod checksum;
mod error;
pub mod index;
pub mod packages;
pub mod repo;

pub use error::{Error, Result};
