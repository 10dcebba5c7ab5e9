//! pkg-config generator: provided modules and vendored library copies.
//!
//! When one package ships descriptors for the same library at different
//! versions, every copy is private to the package. Those descriptors and the
//! shared objects they describe go to `vendored` so they never enter the
//! global dependency graph.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::core::{Dependencies, PkgConfigRecord, SonameRecord, Specifier};
use crate::error::ScaError;
use crate::formats::elf::headers::has_elf_magic;
use crate::formats::elf::ElfObject;
use crate::formats::pkgconfig;
use crate::fs::{DirEntry, PackageFs};
use crate::handle::PackageHandle;
use crate::sca::{at, AnalysisContext, GeneratorError, GeneratorResult};
use crate::util::{basename, parent};

/// Parse one descriptor; failures are logged and yield `None`.
fn load_record(ctx: &AnalysisContext, fs: &dyn PackageFs, entry: &DirEntry) -> Option<PkgConfigRecord> {
    let path = entry.path.as_str();
    let data = match fs.read_prefix(path, ctx.config().io.max_file_size as usize) {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %path, error = %e, "cannot read pkg-config descriptor");
            return None;
        }
    };
    let Ok(text) = std::str::from_utf8(&data) else {
        warn!(path = %path, "pkg-config descriptor is not UTF-8");
        return None;
    };
    let limit = ctx.config().io.max_pkgconfig_expansion;
    let parsed = match pkgconfig::parse_with_limit(text, limit) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(path = %path, error = %e, "cannot parse pkg-config descriptor");
            return None;
        }
    };
    let Some(version) = parsed.version.clone() else {
        warn!(path = %path, "pkg-config descriptor has no version");
        return None;
    };

    let name = entry
        .name
        .strip_suffix(".pc")
        .unwrap_or(&entry.name)
        .to_string();

    Some(PkgConfigRecord {
        name,
        version,
        path: path.to_string(),
        requires: parsed.requires.clone(),
        libs: parsed.library_names().into_iter().map(str::to_string).collect(),
        libdir: parsed
            .variable("libdir")
            .map(|dir| dir.trim_matches('/').to_string())
            .filter(|dir| !dir.is_empty()),
    })
}

/// Directories a descriptor's libraries may live in, most specific first.
fn library_dirs(record: &PkgConfigRecord) -> Vec<String> {
    let mut dirs = Vec::new();
    if let Some(libdir) = &record.libdir {
        dirs.push(libdir.clone());
    }
    let pc_dir = parent(&record.path);
    if basename(pc_dir) == "pkgconfig" {
        let fallback = parent(pc_dir).to_string();
        if !dirs.contains(&fallback) {
            dirs.push(fallback);
        }
    }
    dirs
}

/// Soname records of the shared objects a descriptor links against.
fn locate_shared_objects(
    ctx: &AnalysisContext,
    fs: &dyn PackageFs,
    record: &PkgConfigRecord,
) -> Vec<SonameRecord> {
    let libs: Vec<&str> = if record.libs.is_empty() {
        vec![record.name.strip_prefix("lib").unwrap_or(&record.name)]
    } else {
        record.libs.iter().map(String::as_str).collect()
    };

    let mut found = Vec::new();
    for dir in library_dirs(record) {
        let Ok(entries) = fs.read_dir(&dir) else {
            continue;
        };
        for lib in &libs {
            let prefix = format!("lib{lib}.so");
            for entry in entries.iter().filter(|e| e.name.starts_with(&prefix)) {
                if let Some(soname) = soname_of(ctx, fs, &entry.path) {
                    found.push(SonameRecord::new(entry.path.clone(), soname));
                }
            }
        }
        if !found.is_empty() {
            break;
        }
    }
    found
}

fn soname_of(ctx: &AnalysisContext, fs: &dyn PackageFs, path: &str) -> Option<String> {
    let meta = fs.metadata(path).ok()?;
    if !meta.is_file() || meta.size > ctx.config().io.max_file_size {
        return None;
    }
    let data = fs.read_prefix(path, meta.size as usize).ok()?;
    if !has_elf_magic(&data) {
        return None;
    }
    match ElfObject::parse(&data).and_then(|elf| elf.dynamic()) {
        Ok(Some(dynamic)) => dynamic.soname().ok().flatten().map(str::to_string),
        Ok(None) => None,
        Err(e) => {
            warn!(path = %path, error = %e, "corrupt vendored library");
            None
        }
    }
}

/// Scan all `.pc` descriptors in the package.
pub fn generate(
    ctx: &AnalysisContext,
    handle: &dyn PackageHandle,
    deps: &mut Dependencies,
) -> GeneratorResult {
    let fs = handle.filesystem().map_err(at(""))?;
    let entries = fs
        .walk()
        .map_err(|e| GeneratorError::new("", ScaError::io("", e)))?;

    let mut records = Vec::new();
    for entry in entries
        .iter()
        .filter(|e| e.meta.is_file() && e.name.ends_with(".pc"))
    {
        ctx.checkpoint().map_err(at(&entry.path))?;
        if let Some(record) = load_record(ctx, fs.as_ref(), entry) {
            records.push(record);
        }
    }

    let mut versions: HashMap<&str, HashSet<&str>> = HashMap::new();
    for record in &records {
        versions
            .entry(record.name.as_str())
            .or_default()
            .insert(record.version.as_str());
    }

    let options = handle.options();
    for record in &records {
        ctx.checkpoint().map_err(at(&record.path))?;
        let spec = record.specifier();
        let ambiguous = versions
            .get(record.name.as_str())
            .is_some_and(|v| v.len() > 1);

        if ambiguous {
            debug!(path = %record.path, spec = %spec, "multiple versions shipped, vendoring");
            deps.add_vendored_once(&spec);
            for lib in locate_shared_objects(ctx, fs.as_ref(), record) {
                let so = lib.specifier();
                debug!(path = %lib.path, spec = %so, "vendored library");
                deps.add_vendored_once(&so);
            }
        } else if ctx.paths().is_pkgconfig_location(&record.path) {
            if !options.no_provides {
                debug!(path = %record.path, spec = %spec, "provided module");
                deps.add_provides(&spec);
            }
            if !options.no_depends {
                for module in &record.requires {
                    deps.add_runtime(&Specifier::pc(module.as_str()));
                }
            }
        } else {
            debug!(path = %record.path, spec = %spec, "private module, vendoring");
            deps.add_vendored(&spec);
        }
    }

    Ok(())
}
