//! ELF generator: shared library requirements, sonames and commands.

use tracing::{debug, trace, warn};

use crate::core::version::is_shared_object_name;
use crate::core::{Dependencies, SonameRecord, Specifier};
use crate::error::{Result, ScaError};
use crate::formats::elf::headers::has_elf_magic;
use crate::formats::elf::{DynamicInfo, ElfObject, ElfType};
use crate::formats::gobuild::GoBuildInfo;
use crate::fs::{DirEntry, FileKind, PackageFs};
use crate::handle::PackageHandle;
use crate::sca::{at, AnalysisContext, GeneratorError, GeneratorResult};
use crate::util::{basename, parent, resolve_link};

/// Libraries a Go binary built against the system OpenSSL opens at run time.
const GO_OPENSSL_LIBRARIES: [&str; 2] = ["libcrypto.so.3", "libssl.so.3"];

/// What one loadable object contributes
struct ObjectInfo {
    file_type: ElfType,
    dynamic: Option<DynamicInfo>,
    /// Go binary whose crypto is delegated to the system OpenSSL
    go_openssl: bool,
}

/// Go build info from `.go.buildinfo`, or from a scan of the whole image
/// when section headers were stripped.
fn go_build_info(elf: &ElfObject<'_>, data: &[u8]) -> Option<GoBuildInfo> {
    let sections = elf.sections().ok()?;
    if sections.count() == 0 {
        return GoBuildInfo::find(data);
    }
    GoBuildInfo::parse(sections.by_name(".go.buildinfo")?.data)
}

/// Read and parse `path` if it is a loadable ELF object.
///
/// Every failure is soft: the file is logged and skipped.
fn inspect(ctx: &AnalysisContext, fs: &dyn PackageFs, path: &str, size: u64) -> Option<ObjectInfo> {
    let limit = ctx.config().io.max_file_size;
    if size > limit {
        warn!(path = %path, size, limit, "object larger than read limit, skipping");
        return None;
    }

    let magic = match fs.read_prefix(path, 4) {
        Ok(magic) => magic,
        Err(e) => {
            warn!(path = %path, error = %e, "cannot read file");
            return None;
        }
    };
    if !has_elf_magic(&magic) {
        trace!(path = %path, "not an ELF object");
        return None;
    }

    let data = match fs.read_prefix(path, limit as usize) {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %path, error = %e, "cannot read ELF object");
            return None;
        }
    };

    let elf = match ElfObject::parse(&data) {
        Ok(elf) => elf,
        Err(e) => {
            warn!(path = %path, error = %e, "corrupt ELF header");
            return None;
        }
    };

    let file_type = elf.file_type();
    if !file_type.is_loadable() {
        trace!(path = %path, "ELF object is neither executable nor shared, skipping");
        return None;
    }

    let go_openssl = go_build_info(&elf, &data).is_some_and(|info| {
        trace!(path = %path, go_version = %info.go_version, "Go build info");
        info.uses_system_openssl()
    });

    match elf.dynamic_info() {
        Ok(dynamic) => Some(ObjectInfo {
            file_type,
            dynamic,
            go_openssl,
        }),
        Err(e) => {
            warn!(path = %path, error = %e, "corrupt dynamic table");
            None
        }
    }
}

/// Scan every regular file and shared-object link in the package.
pub fn generate(
    ctx: &AnalysisContext,
    handle: &dyn PackageHandle,
    deps: &mut Dependencies,
) -> GeneratorResult {
    let fs = handle.filesystem().map_err(at(""))?;
    let entries = fs
        .walk()
        .map_err(|e| GeneratorError::new("", ScaError::io("", e)))?;

    for entry in &entries {
        ctx.checkpoint().map_err(at(&entry.path))?;
        match entry.meta.kind {
            FileKind::File => scan_object(ctx, handle, fs.as_ref(), entry, deps),
            FileKind::Symlink => {
                scan_link(ctx, handle, fs.as_ref(), entry, deps).map_err(at(&entry.path))?
            }
            FileKind::Dir => {}
        }
    }

    Ok(())
}

fn scan_object(
    ctx: &AnalysisContext,
    handle: &dyn PackageHandle,
    fs: &dyn PackageFs,
    entry: &DirEntry,
    deps: &mut Dependencies,
) {
    let Some(info) = inspect(ctx, fs, &entry.path, entry.meta.size) else {
        return;
    };
    let options = handle.options();
    let path = entry.path.as_str();

    if entry.meta.is_executable()
        && ctx.paths().is_bin_location(path)
        && !options.no_provides
        && !options.no_commands
    {
        let spec = Specifier::cmd(entry.name.as_str()).with_version(handle.version());
        debug!(path = %path, spec = %spec, "command");
        deps.add_provides(&spec);
    }

    let Some(dynamic) = info.dynamic else {
        debug!(path = %path, file_type = ?info.file_type, "no dynamic table, statically linked");
        return;
    };

    if !options.no_depends {
        for lib in &dynamic.needed {
            let spec = Specifier::so(lib.as_str());
            debug!(path = %path, spec = %spec, "needed library");
            deps.add_runtime(&spec);
        }
        if let Some(interp) = &dynamic.interpreter {
            let spec = Specifier::so(basename(interp));
            debug!(path = %path, spec = %spec, "program interpreter");
            deps.add_runtime(&spec);
        }
        if info.go_openssl {
            for lib in GO_OPENSSL_LIBRARIES {
                let spec = Specifier::so(lib);
                debug!(path = %path, spec = %spec, "opened at run time by Go crypto");
                deps.add_runtime(&spec);
            }
        }
    }

    if let Some(soname) = &dynamic.soname {
        if options.no_provides {
            return;
        }
        let spec = SonameRecord::new(path, soname.as_str()).specifier();
        if ctx.paths().is_library_location(path) {
            debug!(path = %path, spec = %spec, "provided soname");
            deps.add_provides(&spec);
        } else {
            debug!(path = %path, spec = %spec, "private soname, vendoring");
            deps.add_vendored(&spec);
        }
    }
}

/// A development or soname link pulls in the library it points at.
fn scan_link(
    ctx: &AnalysisContext,
    handle: &dyn PackageHandle,
    fs: &dyn PackageFs,
    entry: &DirEntry,
    deps: &mut Dependencies,
) -> Result<()> {
    if !is_shared_object_name(&entry.name) || !ctx.paths().is_library_location(&entry.path) {
        return Ok(());
    }
    if handle.options().no_depends {
        return Ok(());
    }

    let target = match fs.read_link(&entry.path) {
        Ok(target) => target,
        Err(e) => {
            warn!(path = %entry.path, error = %e, "cannot read link");
            return Ok(());
        }
    };
    let target = resolve_link(parent(&entry.path), &target);

    match resolve_soname(ctx, handle, fs, &target)? {
        Some(soname) => {
            let spec = Specifier::so(soname);
            debug!(path = %entry.path, target = %target, spec = %spec, "library link");
            deps.add_runtime(&spec);
        }
        None => {
            warn!(path = %entry.path, target = %target, "link target not found in package or relatives");
        }
    }
    Ok(())
}

/// Soname of the object at `target`, looking in the package itself and
/// then in each relative.
///
/// `Ok(None)` means no view holds an object with a soname there.
fn resolve_soname(
    ctx: &AnalysisContext,
    handle: &dyn PackageHandle,
    own: &dyn PackageFs,
    target: &str,
) -> Result<Option<String>> {
    if let Some(found) = lookup(ctx, own, target) {
        return Ok(found);
    }

    for name in handle.relative_names() {
        if name == handle.package_name() {
            continue;
        }
        let fs = handle.filesystem_for_relative(&name)?;
        if let Some(found) = lookup(ctx, fs.as_ref(), target) {
            trace!(target = %target, relative = %name, "link resolved in relative");
            return Ok(found);
        }
    }

    Ok(None)
}

/// `None` when `path` is absent from `fs`, otherwise the soname, if any, of
/// the regular file it resolves to.
fn lookup(ctx: &AnalysisContext, fs: &dyn PackageFs, path: &str) -> Option<Option<String>> {
    let resolved = fs.canonicalize(path).ok()?;
    let meta = fs.symlink_metadata(&resolved).ok()?;
    if !meta.is_file() {
        return None;
    }
    Some(
        inspect(ctx, fs, &resolved, meta.size)
            .and_then(|info| info.dynamic)
            .and_then(|dynamic| dynamic.soname),
    )
}
