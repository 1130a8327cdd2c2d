// src/packages/mod.rs

//! Debian package archive support
//!
//! Reads `.deb` archives and the control stanza embedded in their
//! `control.tar.*` member.

pub mod control;
pub mod deb;

pub use control::ControlFields;
pub use deb::DebArchive;
