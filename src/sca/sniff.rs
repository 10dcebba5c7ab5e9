//! Content classification from a bounded file prefix.

use infer::MatcherType;

use crate::formats::elf::headers::has_elf_magic;

/// Coarse content class of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    Empty,
    Elf,
    /// Any other binary format or data
    Binary,
    Text,
}

/// Classify a file from its first bytes.
///
/// ELF is checked first so the ELF and text classes never overlap; a
/// non-text `infer` match or a NUL byte marks other binary content.
pub fn classify(prefix: &[u8]) -> ContentClass {
    if prefix.is_empty() {
        return ContentClass::Empty;
    }
    if has_elf_magic(prefix) {
        return ContentClass::Elf;
    }
    if let Some(kind) = infer::get(prefix) {
        if kind.matcher_type() != MatcherType::Text {
            return ContentClass::Binary;
        }
    }
    if memchr::memchr(0, prefix).is_some() {
        return ContentClass::Binary;
    }
    ContentClass::Text
}
