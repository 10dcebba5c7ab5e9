//! Go build information (`.go.buildinfo`).
//!
//! Go 1.18 and later write the toolchain version and the module info inline
//! after a 32-byte header, each as a uvarint-length-prefixed string. The
//! older pointer-based layout is not read.

use memchr::memmem;

/// Header magic, followed by the pointer size and a flags byte
pub const MAGIC: &[u8] = b"\xff Go buildinf:";

const HEADER_SIZE: usize = 32;
const FLAGS_OFFSET: usize = 15;
const FLAG_INLINE_STRINGS: u8 = 0x2;
const SENTINEL_SIZE: usize = 16;

/// Experiments that hand crypto to the system OpenSSL at run time.
const OPENSSL_EXPERIMENTS: [&str; 3] = ["opensslcrypto", "systemcrypto", "strictfipsruntime"];

/// Build information embedded by the Go linker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoBuildInfo {
    /// Toolchain version, possibly with an ` X:<experiments>` suffix
    pub go_version: String,
    /// Main package path
    pub path: Option<String>,
    /// `build` settings in file order
    pub settings: Vec<(String, String)>,
}

fn read_uvarint(data: &[u8]) -> Option<(u64, &[u8])> {
    let mut value = 0u64;
    for (i, &byte) in data.iter().enumerate().take(10) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((value, &data[i + 1..]));
        }
    }
    None
}

fn read_string(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let (len, rest) = read_uvarint(data)?;
    let len = usize::try_from(len).ok()?;
    (len <= rest.len()).then(|| rest.split_at(len))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

impl GoBuildInfo {
    /// Search a whole object image for the build info blob.
    pub fn find(image: &[u8]) -> Option<Self> {
        let start = memmem::find(image, MAGIC)?;
        Self::parse(&image[start..])
    }

    /// Parse a blob starting at the magic, such as `.go.buildinfo` data.
    pub fn parse(blob: &[u8]) -> Option<Self> {
        if blob.len() < HEADER_SIZE || !blob.starts_with(MAGIC) {
            return None;
        }
        if blob[FLAGS_OFFSET] & FLAG_INLINE_STRINGS == 0 {
            return None;
        }

        let (version, rest) = read_string(&blob[HEADER_SIZE..])?;
        let (modinfo, _) = read_string(rest)?;
        // Module info sits between two 16-byte sentinels
        let modinfo = if modinfo.len() > 2 * SENTINEL_SIZE
            && modinfo[modinfo.len() - SENTINEL_SIZE - 1] == b'\n'
        {
            &modinfo[SENTINEL_SIZE..modinfo.len() - SENTINEL_SIZE]
        } else {
            &[]
        };

        let mut info = Self {
            go_version: String::from_utf8_lossy(version).into_owned(),
            ..Default::default()
        };
        for line in String::from_utf8_lossy(modinfo).lines() {
            let Some((kind, rest)) = line.split_once('\t') else {
                continue;
            };
            match kind {
                "path" => info.path = Some(rest.to_string()),
                "build" => {
                    if let Some((key, value)) = rest.split_once('=') {
                        info.settings
                            .push((unquote(key).to_string(), unquote(value).to_string()));
                    }
                }
                _ => {}
            }
        }
        Some(info)
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Experiments enabled at build time, from `GOEXPERIMENT`, the version
    /// suffix and `goexperiment.*` build tags.
    pub fn experiments(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        if let Some(value) = self.setting("GOEXPERIMENT") {
            out.extend(value.split(','));
        }
        for word in self.go_version.split_whitespace() {
            if let Some(list) = word.strip_prefix("X:") {
                out.extend(list.split(','));
            }
        }
        if let Some(tags) = self.setting("-tags") {
            out.extend(tags.split(',').filter_map(|t| t.strip_prefix("goexperiment.")));
        }
        out.retain(|e| !e.is_empty());
        out
    }

    /// Whether the binary loads libcrypto and libssl at run time.
    pub fn uses_system_openssl(&self) -> bool {
        self.experiments()
            .iter()
            .any(|e| OPENSSL_EXPERIMENTS.contains(e))
    }
}
