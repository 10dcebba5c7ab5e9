use std::time::{Duration, Instant};

use crate::common::{bundle, libcap_tree};
use pkgsca::{analyze, AnalysisContext, CancellationToken, Dependencies, ScaError};

#[test]
fn test_cancelled_before_analysis() {
    let token = CancellationToken::new();
    token.cancel();
    let ctx = AnalysisContext::default().with_cancellation(token);

    let mut deps = Dependencies::new();
    let err = analyze(&ctx, &bundle("libcap", "2.69-r0", libcap_tree()), &mut deps).unwrap_err();

    assert!(matches!(err, ScaError::Cancelled));
    assert!(deps.is_empty());
}

#[test]
fn test_deadline_in_the_past() {
    let ctx = AnalysisContext::default().with_deadline(Instant::now());

    let mut deps = Dependencies::new();
    let err = analyze(&ctx, &bundle("libcap", "2.69-r0", libcap_tree()), &mut deps).unwrap_err();

    assert!(matches!(err, ScaError::DeadlineExceeded { .. }));
    assert!(err.is_cancellation());
}

#[test]
fn test_generous_timeout_completes() {
    let ctx = AnalysisContext::default().with_timeout(Duration::from_secs(300));

    let mut deps = Dependencies::new();
    analyze(&ctx, &bundle("libcap", "2.69-r0", libcap_tree()), &mut deps).unwrap();

    assert!(!deps.provides.is_empty());
}

#[test]
fn test_token_is_shared_between_contexts() {
    let token = CancellationToken::new();
    let ctx = AnalysisContext::default().with_cancellation(token.clone());
    assert!(ctx.checkpoint().is_ok());

    token.cancel();
    assert!(ctx.token().is_cancelled());
    assert!(matches!(ctx.checkpoint(), Err(ScaError::Cancelled)));
}
