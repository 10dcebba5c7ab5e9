//! Go build info blobs in the inline-string layout of Go 1.18+.

use crate::formats::gobuild::MAGIC;

const SENTINEL_START: &[u8; 16] = b"0w\xaf\x0c\x92t\x08\x02A\xe1\xc1\x07\xe6\xd6\x18\xe6";
const SENTINEL_END: &[u8; 16] = b"\xf92C1\x86\x18 r\x00\x82B\x10A\x16\xd8\xf2";

fn put_string(out: &mut Vec<u8>, bytes: &[u8]) {
    let mut len = bytes.len() as u64;
    while len >= 0x80 {
        out.push((len as u8 & 0x7f) | 0x80);
        len >>= 7;
    }
    out.push(len as u8);
    out.extend_from_slice(bytes);
}

/// `.go.buildinfo` contents for main package `example.com/cmd/app` with the
/// given `build` settings.
pub fn go_buildinfo(go_version: &str, settings: &[(&str, &str)]) -> Vec<u8> {
    let mut modinfo = SENTINEL_START.to_vec();
    modinfo.extend_from_slice(b"path\texample.com/cmd/app\n");
    modinfo.extend_from_slice(b"mod\texample.com/cmd/app\t(devel)\t\n");
    for (key, value) in settings {
        modinfo.extend_from_slice(format!("build\t{key}={value}\n").as_bytes());
    }
    modinfo.extend_from_slice(SENTINEL_END);

    let mut blob = MAGIC.to_vec();
    // Pointer size 8, inline strings
    blob.push(8);
    blob.push(0x2);
    blob.resize(32, 0);
    put_string(&mut blob, go_version.as_bytes());
    put_string(&mut blob, &modinfo);
    blob
}
