//! Shared fixtures for the integration tests.

use std::collections::BTreeSet;
use std::sync::Arc;

use pkgsca::test_support::ElfBuilder;
use pkgsca::{analyze, AnalysisContext, Dependencies, MemFs, PackageBundle, PackageHandle};

pub const LD_LINUX: &str = "/lib/ld-linux-aarch64.so.1";

/// Run the built-in generators with a default context and dedup the result.
pub fn analyze_default(handle: &dyn PackageHandle) -> Dependencies {
    let mut deps = Dependencies::new();
    analyze(&AnalysisContext::default(), handle, &mut deps).unwrap();
    deps.dedup();
    deps
}

/// Order-insensitive view of one manifest category.
pub fn set(entries: &[String]) -> BTreeSet<&str> {
    entries.iter().map(String::as_str).collect()
}

pub fn bundle(name: &str, version: &str, fs: MemFs) -> PackageBundle {
    PackageBundle::new(name, version, Arc::new(fs))
}

/// Dynamically linked executable against glibc.
pub fn glibc_program(needed: &[&str]) -> Vec<u8> {
    needed
        .iter()
        .fold(ElfBuilder::executable(), |b, lib| b.needed(lib))
        .needed("libc.so.6")
        .needed("ld-linux-aarch64.so.1")
        .interpreter(LD_LINUX)
        .build()
}

/// Shared library with a soname, linked against glibc.
pub fn glibc_library(soname: &str, needed: &[&str]) -> Vec<u8> {
    needed
        .iter()
        .fold(ElfBuilder::shared_object().soname(soname), |b, lib| {
            b.needed(lib)
        })
        .needed("libc.so.6")
        .build()
}

/// Shared library that can also be run directly: `ET_DYN` with an
/// interpreter, installed with mode 0755.
pub fn executable_library(soname: &str, needed: &[&str]) -> Vec<u8> {
    needed
        .iter()
        .fold(ElfBuilder::shared_object().soname(soname), |b, lib| {
            b.needed(lib)
        })
        .needed("libc.so.6")
        .interpreter(LD_LINUX)
        .build()
}

/// The two libcap libraries and their soname links, as shipped in `usr/lib`.
pub fn libcap_libraries() -> MemFs {
    MemFs::new()
        .with_executable(
            "usr/lib/libcap.so.2.69",
            executable_library("libcap.so.2", &["libpsx.so.2"]),
        )
        .with_symlink("usr/lib/libcap.so.2", "libcap.so.2.69")
        .with_executable(
            "usr/lib/libpsx.so.2.69",
            executable_library("libpsx.so.2", &[]),
        )
        .with_symlink("usr/lib/libpsx.so.2", "libpsx.so.2.69")
}

/// The libcap libraries plus a tool in `usr/sbin`.
pub fn libcap_tree() -> MemFs {
    libcap_libraries().with_executable("usr/sbin/getcap", glibc_program(&["libcap.so.2"]))
}

/// A pkg-config descriptor rooted at `prefix`.
pub fn pc_descriptor(prefix: &str, name: &str, version: &str, lib: &str) -> Vec<u8> {
    format!(
        "prefix={prefix}\nexec_prefix=${{prefix}}\nlibdir=${{exec_prefix}}/lib\n\nName: {name}\nDescription: {name} library\nVersion: {version}\nLibs: -L${{libdir}} -l{lib}\n"
    )
    .into_bytes()
}
