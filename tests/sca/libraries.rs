use crate::common::{
    analyze_default, bundle, glibc_library, glibc_program, libcap_libraries, libcap_tree, set,
    LD_LINUX,
};
use pkgsca::test_support::{go_buildinfo, ElfBuilder};
use pkgsca::{MemFs, Specifier};

#[test]
fn test_libcap_manifest() {
    let deps = analyze_default(&bundle("libcap", "2.69-r0", libcap_tree()));

    assert_eq!(
        deps.runtime,
        vec![
            "so:libcap.so.2",
            "so:libpsx.so.2",
            "so:libc.so.6",
            "so:ld-linux-aarch64.so.1",
        ]
    );
    assert_eq!(
        set(&deps.provides),
        ["so:libcap.so.2=2", "so:libpsx.so.2=2", "cmd:getcap=2.69-r0"]
            .into_iter()
            .collect()
    );
    assert!(deps.vendored.is_empty());
}

#[test]
fn test_executable_shared_objects() {
    let deps = analyze_default(&bundle("libcap", "2.69-r0", libcap_libraries()));

    assert_eq!(
        set(&deps.runtime),
        [
            "so:ld-linux-aarch64.so.1",
            "so:libc.so.6",
            "so:libcap.so.2",
            "so:libpsx.so.2",
        ]
        .into_iter()
        .collect()
    );
    assert_eq!(deps.provides, vec!["so:libcap.so.2=2", "so:libpsx.so.2=2"]);
    assert!(deps.vendored.is_empty());
}

#[test]
fn test_manifest_entries_parse_as_specifiers() {
    let deps = analyze_default(&bundle("libcap", "2.69-r0", libcap_tree()));
    for entry in deps.runtime.iter().chain(&deps.provides) {
        let spec: Specifier = entry.parse().unwrap();
        assert_eq!(&spec.to_string(), entry);
    }
}

#[test]
fn test_unstable_soname() {
    let fs = MemFs::new()
        .with_file(
            "usr/lib/libaws-c-s3.so.1.0.0",
            glibc_library("libaws-c-s3.so.0unstable", &[]),
        )
        .with_symlink("usr/lib/libaws-c-s3.so.0unstable", "libaws-c-s3.so.1.0.0");
    let deps = analyze_default(&bundle("aws-c-s3", "0.4.9-r0", fs));

    assert_eq!(deps.provides, vec!["so:libaws-c-s3.so.0unstable=0"]);
    assert_eq!(
        deps.runtime,
        vec!["so:libaws-c-s3.so.0unstable", "so:libc.so.6"]
    );
}

#[test]
fn test_libexec_library_is_not_provided() {
    let fs = MemFs::new()
        .with_file(
            "usr/lib/libexec/helper/libhelper.so.1",
            glibc_library("libhelper.so.1", &[]),
        )
        .with_file(
            "usr/lib/libpublic.so.3",
            glibc_library("libpublic.so.3", &[]),
        );
    let deps = analyze_default(&bundle("helper", "1-r0", fs));

    assert_eq!(deps.provides, vec!["so:libpublic.so.3=3"]);
    assert_eq!(deps.vendored, vec!["so:libhelper.so.1=1"]);
}

#[test]
fn test_go_fips_binary_needs_openssl() {
    let exe = ElfBuilder::executable()
        .needed("libc.so.6")
        .interpreter(LD_LINUX)
        .section(
            ".go.buildinfo",
            go_buildinfo(
                "go1.22.5 X:systemcrypto",
                &[
                    ("-buildmode", "exe"),
                    ("CGO_ENABLED", "1"),
                    ("GOEXPERIMENT", "systemcrypto"),
                ],
            ),
        )
        .build();
    let fs = MemFs::new().with_executable("usr/bin/go-fips-bin", exe);
    let deps = analyze_default(&bundle("go-fips-bin", "v0.0.1-r0", fs));

    assert_eq!(
        set(&deps.runtime),
        [
            "so:ld-linux-aarch64.so.1",
            "so:libc.so.6",
            "so:libcrypto.so.3",
            "so:libssl.so.3",
        ]
        .into_iter()
        .collect()
    );
    assert_eq!(deps.provides, vec!["cmd:go-fips-bin=v0.0.1-r0"]);
    assert!(deps.vendored.is_empty());
}

#[test]
fn test_static_go_binary_provides_command_only() {
    let exe = ElfBuilder::executable()
        .without_dynamic()
        .section(".go.buildinfo", go_buildinfo("go1.22.5", &[("CGO_ENABLED", "0")]))
        .build();
    let fs = MemFs::new().with_executable("usr/bin/go-bin", exe);
    let deps = analyze_default(&bundle("go-bin", "v0.0.1-r0", fs));

    assert_eq!(deps.provides, vec!["cmd:go-bin=v0.0.1-r0"]);
    assert!(deps.runtime.is_empty());
}

#[test]
fn test_section_stripped_objects_are_read_from_segments() {
    let stripped = ElfBuilder::shared_object()
        .soname("libtiny.so.7")
        .needed("libc.so.6")
        .without_section_headers()
        .build();
    let fs = MemFs::new()
        .with_file("usr/lib/libtiny.so.7", stripped)
        .with_executable("usr/bin/tiny", glibc_program(&["libtiny.so.7"]));
    let deps = analyze_default(&bundle("tiny", "7.0-r1", fs));

    assert_eq!(
        deps.provides,
        vec!["cmd:tiny=7.0-r1", "so:libtiny.so.7=7"]
    );
    assert_eq!(
        deps.runtime,
        vec![
            "so:libtiny.so.7",
            "so:libc.so.6",
            "so:ld-linux-aarch64.so.1"
        ]
    );
}

#[test]
fn test_corrupt_objects_are_skipped() {
    let mut truncated = glibc_library("libbroken.so.1", &[]);
    truncated.truncate(80);
    let fs = MemFs::new()
        .with_file("usr/lib/libbroken.so.1", truncated)
        .with_file("usr/lib/notelf.so.1", b"\x7fELX garbage".to_vec())
        .with_file("usr/lib/libok.so.2", glibc_library("libok.so.2", &[]));
    let deps = analyze_default(&bundle("mixed", "1-r0", fs));

    assert_eq!(deps.provides, vec!["so:libok.so.2=2"]);
}
