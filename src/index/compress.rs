// src/index/compress.rs

//! Compression formats used by control tarballs and index files

use crate::error::{Error, Result};
use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

/// Compression format of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    // .gz
    Gzip,
    // .bz2
    Bzip2,
    // .xz
    Xz,
    // .zst
    Zstd,
    None,
}

impl Compression {
    /// File suffix including the leading dot, empty for uncompressed data
    pub fn extension(self) -> &'static str {
        match self {
            Compression::Gzip => ".gz",
            Compression::Bzip2 => ".bz2",
            Compression::Xz => ".xz",
            Compression::Zstd => ".zst",
            Compression::None => "",
        }
    }

    /// Compression implied by a file name suffix, if it has a known one
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".gz") {
            Some(Compression::Gzip)
        } else if name.ends_with(".bz2") {
            Some(Compression::Bzip2)
        } else if name.ends_with(".xz") {
            Some(Compression::Xz)
        } else if name.ends_with(".zst") {
            Some(Compression::Zstd)
        } else if name.ends_with(".tar") {
            Some(Compression::None)
        } else {
            None
        }
    }

    /// Detect compression from magic bytes
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(&[0x1F, 0x8B]) {
            Compression::Gzip
        } else if bytes.starts_with(b"BZh") {
            Compression::Bzip2
        } else if bytes.starts_with(&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00]) {
            Compression::Xz
        } else if bytes.starts_with(&[0x28, 0xB5, 0x2F, 0xFD]) {
            Compression::Zstd
        } else {
            Compression::None
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compression::Gzip => "gzip",
            Compression::Bzip2 => "bzip2",
            Compression::Xz => "xz",
            Compression::Zstd => "zstd",
            Compression::None => "none",
        };
        f.write_str(name)
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gzip" | "gz" => Ok(Compression::Gzip),
            "bzip2" | "bz2" => Ok(Compression::Bzip2),
            "xz" => Ok(Compression::Xz),
            "zstd" | "zst" => Ok(Compression::Zstd),
            "none" => Ok(Compression::None),
            other => Err(format!(
                "unknown compression '{}', expected one of: gzip, bzip2, xz, zstd, none",
                other
            )),
        }
    }
}

/// Wrap `r` in a decoder for `comp`
pub fn decompress_reader<'a, R: Read + 'a>(r: R, comp: Compression) -> Result<Box<dyn Read + 'a>> {
    match comp {
        Compression::Gzip => Ok(Box::new(GzDecoder::new(r))),
        Compression::Bzip2 => Ok(Box::new(BzDecoder::new(r))),
        Compression::Xz => Ok(Box::new(XzDecoder::new(r))),
        Compression::Zstd => {
            let decoder = zstd::Decoder::new(r).map_err(|e| {
                Error::CompressionError(format!("Failed to create zstd decoder: {}", e))
            })?;
            Ok(Box::new(decoder))
        }
        Compression::None => Ok(Box::new(r)),
    }
}

/// Compress `bytes` in memory
pub fn compress(comp: Compression, bytes: &[u8]) -> Result<Vec<u8>> {
    let wrap = |e: std::io::Error| Error::CompressionError(format!("{} compression failed: {}", comp, e));
    let out = Vec::new();

    let out = match comp {
        Compression::Gzip => {
            let mut e = GzEncoder::new(out, flate2::Compression::default());
            e.write_all(bytes).map_err(wrap)?;
            e.finish().map_err(wrap)?
        }
        Compression::Bzip2 => {
            let mut e = BzEncoder::new(out, bzip2::Compression::default());
            e.write_all(bytes).map_err(wrap)?;
            e.finish().map_err(wrap)?
        }
        Compression::Xz => {
            let mut e = XzEncoder::new(out, 6);
            e.write_all(bytes).map_err(wrap)?;
            e.finish().map_err(wrap)?
        }
        Compression::Zstd => {
            let mut e = zstd::Encoder::new(out, zstd::DEFAULT_COMPRESSION_LEVEL).map_err(wrap)?;
            e.write_all(bytes).map_err(wrap)?;
            e.finish().map_err(wrap)?
        }
        Compression::None => bytes.to_vec(),
    };

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &[u8] = b"Package: foo\nVersion: 1.0\n\n";

    #[test]
    fn test_compressed_output_is_detected() {
        for comp in [
            Compression::Gzip,
            Compression::Bzip2,
            Compression::Xz,
            Compression::Zstd,
        ] {
            let bytes = compress(comp, TEXT).unwrap();
            assert_eq!(Compression::detect(&bytes), comp, "{}", comp);
        }
        assert_eq!(Compression::detect(TEXT), Compression::None);
    }

    #[test]
    fn test_bzip2_decompresses_to_input() {
        let bytes = compress(Compression::Bzip2, TEXT).unwrap();
        let mut reader = decompress_reader(&bytes[..], Compression::Bzip2).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, TEXT);
    }

    #[test]
    fn test_from_file_name() {
        assert_eq!(Compression::from_file_name("control.tar.gz"), Some(Compression::Gzip));
        assert_eq!(Compression::from_file_name("control.tar.zst"), Some(Compression::Zstd));
        assert_eq!(Compression::from_file_name("control.tar"), Some(Compression::None));
        assert_eq!(Compression::from_file_name("control.tar.lz4"), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("bzip2".parse::<Compression>(), Ok(Compression::Bzip2));
        assert_eq!("GZ".parse::<Compression>(), Ok(Compression::Gzip));
        assert!("lzma".parse::<Compression>().is_err());
        assert_eq!(Compression::Bzip2.extension(), ".bz2");
    }
}
