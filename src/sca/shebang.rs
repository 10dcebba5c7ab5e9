//! Shebang generator: interpreters required by executable scripts.

use tracing::{debug, trace, warn};

use crate::core::{Dependencies, Specifier};
use crate::error::ScaError;
use crate::formats::shebang::Shebang;
use crate::fs::{DirEntry, PackageFs};
use crate::handle::PackageHandle;
use crate::sca::sniff::{classify, ContentClass};
use crate::sca::{at, AnalysisContext, GeneratorError, GeneratorResult};

/// First line of `data` if it fits within `max_line` bytes.
///
/// `Err(())` when the line is cut off by the limit.
fn first_line(data: &[u8], max_line: usize) -> Result<&[u8], ()> {
    let window = &data[..data.len().min(max_line)];
    match memchr::memchr(b'\n', window) {
        Some(end) => Ok(&window[..end]),
        None if data.len() <= max_line => Ok(window),
        None => Err(()),
    }
}

/// Interpreter command of one script, or `None` when it has none.
fn script_command(ctx: &AnalysisContext, fs: &dyn PackageFs, entry: &DirEntry) -> Option<String> {
    let path = entry.path.as_str();
    let io = &ctx.config().io;
    let limit = io.max_sniff_size.max(io.max_shebang_line + 1);

    let data = match fs.read_prefix(path, limit) {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %path, error = %e, "cannot read script");
            return None;
        }
    };

    if classify(&data) != ContentClass::Text {
        trace!(path = %path, "not a text file");
        return None;
    }
    if !data.starts_with(b"#!") {
        return None;
    }

    let Ok(line) = first_line(&data, io.max_shebang_line) else {
        warn!(path = %path, limit = io.max_shebang_line, "interpreter line truncated");
        return None;
    };
    let Ok(line) = std::str::from_utf8(line) else {
        warn!(path = %path, "interpreter line is not UTF-8");
        return None;
    };

    let shebang = Shebang::parse(line.trim_end_matches('\r'))?;
    match shebang.command() {
        Some(command) => Some(command.to_string()),
        None => {
            warn!(path = %path, line = %line, "env launcher names no program");
            None
        }
    }
}

/// Scan executable files and files in executable directories.
pub fn generate(
    ctx: &AnalysisContext,
    handle: &dyn PackageHandle,
    deps: &mut Dependencies,
) -> GeneratorResult {
    let fs = handle.filesystem().map_err(at(""))?;
    let entries = fs
        .walk()
        .map_err(|e| GeneratorError::new("", ScaError::io("", e)))?;

    let no_depends = handle.options().no_depends;
    for entry in entries.iter().filter(|e| e.meta.is_file()) {
        ctx.checkpoint().map_err(at(&entry.path))?;
        if !entry.meta.is_executable() && !ctx.paths().is_bin_location(&entry.path) {
            continue;
        }

        let Some(command) = script_command(ctx, fs.as_ref(), entry) else {
            continue;
        };
        let spec = Specifier::cmd(command);
        debug!(path = %entry.path, spec = %spec, "script interpreter");
        if !no_depends {
            deps.add_runtime(&spec);
        }
    }

    Ok(())
}
