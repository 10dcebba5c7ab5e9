//! Version strings derived from shared object names.
//!
//! Sonames carry versions as dot-delimited components after `.so`; only the
//! leading digits of the first component matter for ABI compatibility.

/// Split a soname into its stem and the text after the versioned `.so.`.
///
/// `libfoo.so.2.1.0` gives `("libfoo", "2.1.0")`; `libfoo.so` has no
/// versioned suffix.
pub fn split_soname(soname: &str) -> Option<(&str, &str)> {
    let idx = soname.rfind(".so.")?;
    let suffix = &soname[idx + 4..];
    (!suffix.is_empty()).then(|| (&soname[..idx], suffix))
}

/// Major ABI version of a soname.
///
/// The leading digits of the first suffix component, so `libx.so.0unstable`
/// still reports `0`. `None` when the soname has no numeric suffix.
pub fn soname_major(soname: &str) -> Option<&str> {
    let (_, suffix) = split_soname(soname)?;
    let first = suffix.split('.').next()?;
    let digits = first
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(first.len());
    (digits > 0).then(|| &first[..digits])
}

/// Whether `file_name` is a shared object name (`libfoo.so`, `libfoo.so.1`).
pub fn is_shared_object_name(file_name: &str) -> bool {
    file_name.ends_with(".so") || file_name.contains(".so.")
}
