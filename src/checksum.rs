// src/checksum.rs

//! Digest helpers shared by the index writer and the checker

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;

/// Checksum algorithms that appear in Packages and Release files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5 (legacy, not for security)
    Md5,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Map a Release section header (without the colon) to an algorithm
    pub fn from_release_section(section: &str) -> Option<Self> {
        match section {
            "MD5Sum" => Some(Self::Md5),
            "SHA256" => Some(Self::Sha256),
            "SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Section header used in Release files
    pub fn release_section(self) -> &'static str {
        match self {
            Self::Md5 => "MD5Sum",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    /// Hex digest of `bytes`
    pub fn hex_digest(self, bytes: &[u8]) -> String {
        match self {
            Self::Md5 => md5_hex(bytes),
            Self::Sha256 => sha256_hex(bytes),
            Self::Sha512 => hex::encode(Sha512::digest(bytes)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.release_section())
    }
}

pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
