// tests/common/mod.rs

//! Fixture builders shared by the integration tests

#![allow(dead_code)]

use debindex::index::compress::{self, Compression};
use std::fs;
use std::path::Path;

pub const RELEASE_HEADER: &str = "Origin: Example
Label: Example
Suite: stable
Codename: stable
Architectures: amd64 all
Components: main
Description: Example flat repository
";

/// Build a tarball holding `./control` with `control`
pub fn control_tar(control: &str) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(control.len() as u64);
    header.set_mode(0o644);
    builder
        .append_data(&mut header, "./control", control.as_bytes())
        .unwrap();
    builder.into_inner().unwrap()
}

/// Build .deb bytes whose control tarball is compressed with `comp`
pub fn build_deb(control: &str, comp: Compression) -> Vec<u8> {
    let member = format!("control.tar{}", comp.extension());
    let control_blob = compress::compress(comp, &control_tar(control)).unwrap();
    let data_blob = compress::compress(Compression::Gzip, &tar::Builder::new(Vec::new()).into_inner().unwrap()).unwrap();

    let mut builder = ar::Builder::new(Vec::new());
    for (name, data) in [
        ("debian-binary", b"2.0\n".to_vec()),
        (member.as_str(), control_blob),
        ("data.tar.gz", data_blob),
    ] {
        let header = ar::Header::new(name.as_bytes().to_vec(), data.len() as u64);
        builder.append(&header, data.as_slice()).unwrap();
    }
    builder.into_inner().unwrap()
}

/// Create `<root>/debs` and a Release file with a stale MD5Sum block
pub fn init_repo(root: &Path) {
    fs::create_dir_all(root.join("debs")).unwrap();
    fs::write(
        root.join("Release"),
        format!(
            "{}MD5Sum:\n 00000000000000000000000000000000 1 Packages\n",
            RELEASE_HEADER
        ),
    )
    .unwrap();
}

/// Write a .deb into `<root>/debs` and return its bytes
pub fn add_deb(root: &Path, file_name: &str, control: &str, comp: Compression) -> Vec<u8> {
    let data = build_deb(control, comp);
    fs::write(root.join("debs").join(file_name), &data).unwrap();
    data
}
