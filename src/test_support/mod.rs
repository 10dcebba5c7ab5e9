//! Fixture builders for unit tests, integration tests, benchmarks and fuzz
//! seeds.
//!
//! Kept public so `tests/`, `benches/` and the fuzz crate can build the
//! same synthetic objects as the unit tests.

mod elf;
mod go;

pub use elf::ElfBuilder;
pub use go::go_buildinfo;
