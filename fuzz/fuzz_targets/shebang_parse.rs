#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        if let Some(shebang) = pkgsca::formats::shebang::Shebang::parse(line) {
            let _ = shebang.command();
        }
    }
});
