//! File formats read during analysis.

pub mod elf;
pub mod gobuild;
pub mod pkgconfig;
pub mod shebang;
