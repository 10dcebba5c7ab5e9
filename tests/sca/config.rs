use crate::common::{bundle, glibc_library};
use pkgsca::config::{IoConfig, SegmentRuleConfig};
use pkgsca::sca::PathClassifier;
use pkgsca::{analyze, AnalysisContext, Dependencies, MemFs, ScaConfig};

fn bundled_tree() -> MemFs {
    MemFs::new()
        .with_file(
            "opt/vendor/lib/libvendor.so.4",
            glibc_library("libvendor.so.4", &[]),
        )
        .with_file(
            "usr/lib/private/libinternal.so.1",
            glibc_library("libinternal.so.1", &[]),
        )
}

fn run(ctx: &AnalysisContext) -> Dependencies {
    let mut deps = Dependencies::new();
    analyze(ctx, &bundle("vendor", "4.0-r0", bundled_tree()), &mut deps).unwrap();
    deps
}

#[test]
fn test_default_layout() {
    let deps = run(&AnalysisContext::default());
    assert_eq!(
        deps.vendored,
        vec!["so:libvendor.so.4=4"]
    );
    assert_eq!(deps.provides, vec!["so:libinternal.so.1=1"]);
}

#[test]
fn test_layout_from_json() {
    let config = ScaConfig::from_json_str(
        r#"{
            "paths": {
                "lib_dirs": ["usr/lib", "opt/vendor/lib"],
                "private_segments": [{"match": "exact", "value": "private"}]
            }
        }"#,
    )
    .unwrap();
    assert_eq!(
        config.paths.private_segments,
        vec![SegmentRuleConfig::Exact("private".to_string())]
    );
    assert_eq!(config.io, IoConfig::default());

    let deps = run(&AnalysisContext::new(config));
    assert_eq!(deps.provides, vec!["so:libvendor.so.4=4"]);
    assert_eq!(deps.vendored, vec!["so:libinternal.so.1=1"]);
}

#[test]
fn test_custom_segment_rule() {
    let classifier = PathClassifier::default().with_rule(|segment| segment == "private");
    let ctx = AnalysisContext::default().with_classifier(classifier);

    let deps = run(&ctx);
    assert!(deps.provides.is_empty());
    assert_eq!(
        deps.vendored,
        vec!["so:libvendor.so.4=4", "so:libinternal.so.1=1"]
    );
}

#[test]
fn test_config_round_trip() {
    let config = ScaConfig::default();
    let json = config.to_json_string().unwrap();
    assert!(json.contains("\"prefix\""));
    assert_eq!(ScaConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn test_small_read_limit_skips_objects() {
    let mut config = ScaConfig::default();
    config.io.max_file_size = 64;
    let deps = run(&AnalysisContext::new(config));
    assert!(deps.is_empty());
}
