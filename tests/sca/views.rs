use std::io::Write;
use std::sync::Arc;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use crate::common::{analyze_default, glibc_library, glibc_program};
use pkgsca::{DirFs, MemFs, PackageBundle, PackageFs};

fn append_file(builder: &mut tar::Builder<Vec<u8>>, path: &str, data: &[u8], mode: u32) {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(mode);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_cksum();
    builder.append_data(&mut header, path, data).unwrap();
}

fn append_symlink(builder: &mut tar::Builder<Vec<u8>>, path: &str, target: &str) {
    let mut header = tar::Header::new_gnu();
    header.set_size(0);
    header.set_mode(0o777);
    header.set_entry_type(tar::EntryType::Symlink);
    builder.append_link(&mut header, path, target).unwrap();
}

fn zlib_tar() -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    append_file(
        &mut builder,
        "usr/lib/libz.so.1.3.1",
        &glibc_library("libz.so.1", &[]),
        0o755,
    );
    append_symlink(&mut builder, "usr/lib/libz.so.1", "libz.so.1.3.1");
    append_file(
        &mut builder,
        "usr/bin/minigzip",
        &glibc_program(&["libz.so.1"]),
        0o755,
    );
    builder.into_inner().unwrap()
}

#[test]
fn test_analysis_over_gzipped_tar() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&zlib_tar()).unwrap();
    let gz = encoder.finish().unwrap();

    let fs = MemFs::from_tar(gz.as_slice()).unwrap();
    assert!(fs.symlink_metadata("usr/lib/libz.so.1").unwrap().is_symlink());

    let deps = analyze_default(&PackageBundle::new("zlib", "1.3.1-r0", Arc::new(fs)));
    assert_eq!(
        deps.provides,
        vec!["cmd:minigzip=1.3.1-r0", "so:libz.so.1=1"]
    );
    assert_eq!(
        deps.runtime,
        vec![
            "so:libz.so.1",
            "so:libc.so.6",
            "so:ld-linux-aarch64.so.1"
        ]
    );
}

#[cfg(unix)]
#[test]
fn test_analysis_over_directory() {
    use std::fs;
    use std::os::unix::fs::{symlink, PermissionsExt};

    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("usr/lib")).unwrap();
    fs::create_dir_all(root.join("usr/bin")).unwrap();

    fs::write(root.join("usr/lib/libz.so.1.3.1"), glibc_library("libz.so.1", &[])).unwrap();
    symlink("libz.so.1.3.1", root.join("usr/lib/libz.so.1")).unwrap();

    let tool = root.join("usr/bin/zpipe");
    fs::write(&tool, b"#!/usr/bin/env python3\n").unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let deps = analyze_default(&PackageBundle::new(
        "zlib",
        "1.3.1-r0",
        Arc::new(DirFs::new(root)),
    ));
    assert_eq!(deps.provides, vec!["so:libz.so.1=1"]);
    assert_eq!(
        deps.runtime,
        vec!["so:libz.so.1", "so:libc.so.6", "cmd:python3"]
    );
}

#[cfg(unix)]
#[test]
fn test_directory_links_do_not_escape_root() {
    use std::fs;
    use std::os::unix::fs::symlink;

    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("secret.so.1"), glibc_library("secret.so.1", &[])).unwrap();

    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("usr/lib")).unwrap();
    symlink(
        outside.path().join("secret.so.1"),
        dir.path().join("usr/lib/libsecret.so"),
    )
    .unwrap();

    let view = DirFs::new(dir.path());
    assert!(view.metadata("usr/lib/libsecret.so").is_err());
    assert!(view.read("../etc/passwd").is_err());

    let deps = analyze_default(&PackageBundle::new("secret", "1-r0", Arc::new(view)));
    assert!(deps.is_empty());
}
