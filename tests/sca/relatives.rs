use std::sync::Arc;

use crate::common::{analyze_default, bundle, libcap_tree};
use pkgsca::{
    analyze, AnalysisContext, Dependencies, MemFs, PackageFs, PackageHandle, PackageOptions,
    Result, ScaError,
};

fn libcap_dev() -> MemFs {
    MemFs::new()
        .with_symlink("usr/lib/libcap.so", "libcap.so.2.69")
        .with_file("usr/include/sys/capability.h", b"/* header */\n".to_vec())
}

#[test]
fn test_dev_link_resolves_in_relative() {
    let handle = bundle("libcap-dev", "2.69-r0", libcap_dev())
        .with_relative("libcap", Arc::new(libcap_tree()));
    let deps = analyze_default(&handle);

    assert_eq!(deps.runtime, vec!["so:libcap.so.2"]);
    assert!(deps.provides.is_empty());
}

#[test]
fn test_dangling_link_is_skipped() {
    let deps = analyze_default(&bundle("libcap-dev", "2.69-r0", libcap_dev()));
    assert!(deps.is_empty());
}

#[test]
fn test_absolute_link_stays_inside_view() {
    let fs = MemFs::new().with_symlink("usr/lib/libcap.so", "/usr/lib/libcap.so.2.69");
    let handle = bundle("libcap-dev", "2.69-r0", fs).with_relative("libcap", Arc::new(libcap_tree()));

    assert_eq!(analyze_default(&handle).runtime, vec!["so:libcap.so.2"]);
}

/// Handle that names a relative it cannot open.
struct BrokenRelatives {
    fs: Arc<dyn PackageFs>,
    options: PackageOptions,
    base: Dependencies,
}

impl PackageHandle for BrokenRelatives {
    fn package_name(&self) -> &str {
        "libcap-dev"
    }

    fn version(&self) -> &str {
        "2.69-r0"
    }

    fn relative_names(&self) -> Vec<String> {
        vec!["libcap-dev".to_string(), "libcap".to_string()]
    }

    fn filesystem(&self) -> Result<Arc<dyn PackageFs>> {
        Ok(Arc::clone(&self.fs))
    }

    fn filesystem_for_relative(&self, name: &str) -> Result<Arc<dyn PackageFs>> {
        Err(ScaError::Handle(format!("{name} is not unpacked")))
    }

    fn options(&self) -> &PackageOptions {
        &self.options
    }

    fn base_dependencies(&self) -> &Dependencies {
        &self.base
    }
}

#[test]
fn test_unavailable_relative_is_a_hard_failure() {
    let handle = BrokenRelatives {
        fs: Arc::new(libcap_dev()),
        options: PackageOptions::default(),
        base: Dependencies::default(),
    };

    let mut deps = Dependencies::new();
    let err = analyze(&AnalysisContext::default(), &handle, &mut deps).unwrap_err();

    match &err {
        ScaError::Generator {
            generator,
            path,
            source,
        } => {
            assert_eq!(*generator, "elf");
            assert_eq!(path, "usr/lib/libcap.so");
            assert!(matches!(**source, ScaError::Handle(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_retryable());
}

#[test]
fn test_base_dependencies_lead_the_manifest() {
    let mut base = Dependencies::new();
    base.runtime.push("so:libc.so.6".to_string());
    base.runtime.push("cmd:busybox".to_string());
    let handle = bundle("libcap", "2.69-r0", libcap_tree()).with_base_dependencies(base);

    let mut deps = analyze_default(&handle);
    deps.merge_base(handle.base_dependencies());

    assert_eq!(deps.runtime[..2], ["so:libc.so.6", "cmd:busybox"]);
    assert_eq!(
        deps.runtime.iter().filter(|r| *r == "so:libc.so.6").count(),
        1
    );
    assert_eq!(handle.base_dependencies().runtime.len(), 2);
}
