use crate::common::{bundle, libcap_tree, pc_descriptor};
use pkgsca::{analyze, AnalysisContext, Dependencies, GeneratorKind, MemFs, PackageOptions};

fn analyze_with(fs: MemFs, options: PackageOptions) -> Dependencies {
    let handle = bundle("libcap", "2.69-r0", fs).with_options(options);
    let mut deps = Dependencies::new();
    analyze(&AnalysisContext::default(), &handle, &mut deps).unwrap();
    deps.dedup();
    deps
}

fn with_scripts_and_descriptor(fs: MemFs) -> MemFs {
    fs.with_executable("usr/bin/capsh-wrapper", b"#!/bin/sh\nexec capsh \"$@\"\n".to_vec())
        .with_file(
            "usr/lib/pkgconfig/libcap.pc",
            pc_descriptor("/usr", "libcap", "2.69", "cap"),
        )
}

#[test]
fn test_no_provides() {
    let options = PackageOptions {
        no_provides: true,
        ..Default::default()
    };
    let deps = analyze_with(with_scripts_and_descriptor(libcap_tree()), options);

    assert!(deps.provides.is_empty());
    assert!(deps.vendored.is_empty());
    assert!(deps.runtime.contains(&"cmd:sh".to_string()));
    assert!(deps.runtime.contains(&"so:libc.so.6".to_string()));
}

#[test]
fn test_no_depends() {
    let options = PackageOptions {
        no_depends: true,
        ..Default::default()
    };
    let deps = analyze_with(with_scripts_and_descriptor(libcap_tree()), options);

    assert!(deps.runtime.is_empty());
    assert_eq!(
        deps.provides,
        vec![
            "so:libcap.so.2=2",
            "so:libpsx.so.2=2",
            "cmd:getcap=2.69-r0",
            "pc:libcap=2.69",
        ]
    );
}

#[test]
fn test_no_commands() {
    let options = PackageOptions {
        no_commands: true,
        ..Default::default()
    };
    let deps = analyze_with(libcap_tree(), options);

    assert!(deps.provides.iter().all(|p| !p.starts_with("cmd:")));
    assert_eq!(deps.provides.len(), 2);
}

#[test]
fn test_disabled_generators_from_recipe() {
    let options: PackageOptions =
        serde_json::from_str(r#"{"disabled-generators": ["elf", "shebang"]}"#).unwrap();
    assert!(options.is_disabled(GeneratorKind::Elf));

    let deps = analyze_with(with_scripts_and_descriptor(libcap_tree()), options);

    assert_eq!(deps.provides, vec!["pc:libcap=2.69"]);
    assert!(deps.runtime.is_empty());
}
