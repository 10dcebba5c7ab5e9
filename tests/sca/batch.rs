use std::sync::Arc;

use crate::common::{bundle, libcap_tree};
use pkgsca::test_support::ElfBuilder;
use pkgsca::{AnalysisContext, Analyzer, CancellationToken, MemFs, PackageHandle, ScaError};

#[test]
fn test_analyze_packages_keeps_input_order() {
    let libcap = bundle("libcap", "2.69-r0", libcap_tree());
    let dev = bundle(
        "libcap-dev",
        "2.69-r0",
        MemFs::new().with_symlink("usr/lib/libcap.so", "libcap.so.2"),
    )
    .with_relative("libcap", Arc::new(libcap_tree()));
    let go = bundle(
        "go-fips",
        "v0.0.1-r0",
        MemFs::new().with_executable(
            "usr/bin/go-fips-bin",
            ElfBuilder::executable().without_dynamic().build(),
        ),
    );
    let handles: Vec<&dyn PackageHandle> = vec![&libcap, &dev, &go];

    let results = Analyzer::new().analyze_packages(&AnalysisContext::default(), &handles);
    assert_eq!(results.len(), 3);

    let libcap = results[0].as_ref().unwrap();
    assert_eq!(libcap.runtime.len(), 4);
    let dev = results[1].as_ref().unwrap();
    assert_eq!(dev.runtime, vec!["so:libcap.so.2"]);
    let go = results[2].as_ref().unwrap();
    assert_eq!(go.provides, vec!["cmd:go-fips-bin=v0.0.1-r0"]);
}

#[test]
fn test_analyze_packages_cancelled() {
    let token = CancellationToken::new();
    token.cancel();
    let ctx = AnalysisContext::default().with_cancellation(token);

    let a = bundle("a", "1-r0", libcap_tree());
    let b = bundle("b", "1-r0", MemFs::new());
    let handles: Vec<&dyn PackageHandle> = vec![&a, &b];
    let results = Analyzer::new().analyze_packages(&ctx, &handles);

    assert!(results
        .iter()
        .all(|r| matches!(r, Err(ScaError::Cancelled))));
}
