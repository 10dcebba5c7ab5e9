#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(pc) = pkgsca::formats::pkgconfig::parse(text) {
            let _ = pc.library_names();
        }
    }
});
