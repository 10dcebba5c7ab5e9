use crate::common::{analyze_default, bundle, glibc_library, pc_descriptor, set};
use pkgsca::MemFs;

/// Two bundled PostgreSQL client versions under a private prefix.
fn neon_tree() -> MemFs {
    MemFs::new()
        .with_file(
            "usr/libexec/neon/v14/lib/libecpg_compat.so.3.14",
            glibc_library("libecpg_compat.so.3", &["libecpg.so.6", "libpgtypes.so.3"]),
        )
        .with_symlink(
            "usr/libexec/neon/v14/lib/libecpg_compat.so.3",
            "libecpg_compat.so.3.14",
        )
        .with_file(
            "usr/libexec/neon/v14/lib/pkgconfig/libecpg_compat.pc",
            pc_descriptor("/usr/libexec/neon/v14", "libecpg_compat", "14.10", "ecpg_compat"),
        )
        .with_file(
            "usr/libexec/neon/v15/lib/pkgconfig/libecpg_compat.pc",
            pc_descriptor("/usr/libexec/neon/v15", "libecpg_compat", "15.5", "ecpg_compat"),
        )
}

#[test]
fn test_neon_vendored_manifest() {
    let deps = analyze_default(&bundle("neon", "2604-r0", neon_tree()));

    assert_eq!(
        deps.vendored,
        vec![
            "so:libecpg_compat.so.3=3",
            "pc:libecpg_compat=14.10",
            "pc:libecpg_compat=15.5",
        ]
    );
    assert!(deps.provides.is_empty());
    assert_eq!(
        set(&deps.runtime),
        ["so:libecpg.so.6", "so:libpgtypes.so.3", "so:libc.so.6"]
            .into_iter()
            .collect()
    );
}

#[test]
fn test_multiple_versions_withdraw_provided_library() {
    let fs = MemFs::new()
        .with_file(
            "usr/lib/libfoo.so.1.0",
            glibc_library("libfoo.so.1", &[]),
        )
        .with_file(
            "usr/lib/pkgconfig/foo.pc",
            pc_descriptor("/usr", "foo", "1.0", "foo"),
        )
        .with_file(
            "opt/foo2/lib/pkgconfig/foo.pc",
            pc_descriptor("/opt/foo2", "foo", "2.0", "foo"),
        );
    let deps = analyze_default(&bundle("foo", "2.0-r0", fs));

    assert!(deps.provides.is_empty());
    assert_eq!(
        deps.vendored,
        vec!["pc:foo=2.0", "pc:foo=1.0", "so:libfoo.so.1=1"]
    );
}

#[test]
fn test_single_canonical_descriptor_is_provided() {
    let fs = MemFs::new()
        .with_file("usr/lib/libz.so.1.3", glibc_library("libz.so.1", &[]))
        .with_file(
            "usr/lib/pkgconfig/zlib.pc",
            pc_descriptor("/usr", "zlib", "1.3.1", "z"),
        );
    let deps = analyze_default(&bundle("zlib", "1.3.1-r0", fs));

    assert_eq!(deps.provides, vec!["so:libz.so.1=1", "pc:zlib=1.3.1"]);
    assert!(deps.vendored.is_empty());
}

#[test]
fn test_private_copy_withdraws_public_entries() {
    let fs = MemFs::new()
        .with_file("usr/lib/libfoo.so.1", glibc_library("libfoo.so.1", &[]))
        .with_file(
            "usr/libexec/tool/libfoo.so.1",
            glibc_library("libfoo.so.1", &[]),
        )
        .with_file(
            "usr/lib/pkgconfig/bar.pc",
            pc_descriptor("/usr", "bar", "1.0", "bar"),
        )
        .with_file("opt/x/bar.pc", pc_descriptor("/opt/x", "bar", "1.0", "bar"));
    let deps = analyze_default(&bundle("foo", "1.0-r0", fs));

    assert!(deps.provides.is_empty());
    assert_eq!(deps.vendored, vec!["so:libfoo.so.1=1", "pc:bar=1.0"]);
    assert_eq!(deps.runtime, vec!["so:libc.so.6"]);
}
