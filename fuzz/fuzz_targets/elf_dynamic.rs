#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(elf) = pkgsca::formats::elf::ElfObject::parse(data) {
        let _ = elf.dynamic_info();
    }
    let _ = pkgsca::formats::gobuild::GoBuildInfo::find(data);
});
