//! pkg-config descriptor (`.pc`) reader.
//!
//! Understands variable definitions with `${var}` references and the keyword
//! lines needed to identify a library: `Name`, `Version`, `Requires` and
//! `Libs`. Everything else is kept verbatim and never interpreted.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, ScaError};

static VAR_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z0-9_.]+)\}").expect("valid variable regex"));

/// Nesting allowed while expanding variables.
const MAX_EXPANSION_DEPTH: usize = 16;

/// Expanded bytes allowed per descriptor by [`parse`].
pub const DEFAULT_EXPANSION_LIMIT: usize = 1 << 20;

const VERSION_OPERATORS: [&str; 6] = ["<", "<=", "=", "!=", ">=", ">"];

/// A parsed descriptor with variables already expanded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PkgConfigFile {
    pub variables: HashMap<String, String>,
    pub name: Option<String>,
    pub version: Option<String>,
    /// Module names from `Requires`, version constraints dropped
    pub requires: Vec<String>,
    /// Expanded `Libs` flags
    pub libs: Vec<String>,
}

impl PkgConfigFile {
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Library names from `-l` flags, in order.
    pub fn library_names(&self) -> Vec<&str> {
        self.libs
            .iter()
            .filter_map(|flag| flag.strip_prefix("-l"))
            .filter(|name| !name.is_empty())
            .collect()
    }
}

enum Line<'a> {
    Variable(&'a str, &'a str),
    Keyword(&'a str, &'a str),
}

fn classify(line: &str) -> Option<Line<'_>> {
    let colon = line.find(':');
    let equals = line.find('=');
    let is_ident = |s: &str| {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    };

    match (colon, equals) {
        (Some(c), Some(e)) if e < c => {
            let name = line[..e].trim();
            is_ident(name).then(|| Line::Variable(name, line[e + 1..].trim()))
        }
        (Some(c), _) => {
            let key = line[..c].trim();
            is_ident(key).then(|| Line::Keyword(key, line[c + 1..].trim()))
        }
        (None, Some(e)) => {
            let name = line[..e].trim();
            is_ident(name).then(|| Line::Variable(name, line[e + 1..].trim()))
        }
        (None, None) => None,
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Expands `${var}` references, resolving each variable once.
///
/// Undefined variables expand to nothing, as pkg-config does with an empty
/// sysroot. Every produced byte is charged against `remaining`, so the total
/// output of one descriptor stays under the limit whatever the fan-out.
struct Expander<'a> {
    raw: &'a HashMap<String, String>,
    resolved: HashMap<&'a str, String>,
    active: Vec<&'a str>,
    limit: usize,
    remaining: usize,
}

impl<'a> Expander<'a> {
    fn new(raw: &'a HashMap<String, String>, limit: usize) -> Self {
        Self {
            raw,
            resolved: HashMap::with_capacity(raw.len()),
            active: Vec::new(),
            limit,
            remaining: limit,
        }
    }

    fn over_limit(&self) -> ScaError {
        ScaError::PkgConfig(format!("expanded text exceeds {} bytes", self.limit))
    }

    fn charge(&mut self, len: usize) -> Result<()> {
        if len > self.remaining {
            return Err(self.over_limit());
        }
        self.remaining -= len;
        Ok(())
    }

    /// Key of `name` once its value is in `resolved`; `None` when undefined.
    fn resolve(&mut self, name: &str) -> Result<Option<&'a str>> {
        let raw: &'a HashMap<String, String> = self.raw;
        let Some((key, value)) = raw.get_key_value(name) else {
            return Ok(None);
        };
        let key = key.as_str();
        if self.resolved.contains_key(key) {
            return Ok(Some(key));
        }
        if self.active.contains(&key) {
            return Err(ScaError::PkgConfig(format!(
                "variable {key:?} refers to itself"
            )));
        }
        if self.active.len() >= MAX_EXPANSION_DEPTH {
            return Err(ScaError::PkgConfig(format!(
                "variable expansion too deep at {key:?}"
            )));
        }

        self.active.push(key);
        let expanded = self.expand(value);
        self.active.pop();
        self.resolved.insert(key, expanded?);
        Ok(Some(key))
    }

    fn expand(&mut self, value: &str) -> Result<String> {
        if !value.contains("${") {
            self.charge(value.len())?;
            return Ok(value.to_string());
        }

        let mut out = String::with_capacity(value.len());
        let mut last = 0;
        for caps in VAR_REF.captures_iter(value) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&value[last..whole.start()]);
            if let Some(key) = self.resolve(name.as_str())? {
                let text = self.resolved.get(key).map_or("", String::as_str);
                if out.len() + text.len() > self.remaining {
                    return Err(self.over_limit());
                }
                out.push_str(text);
            }
            last = whole.end();
        }
        out.push_str(&value[last..]);
        self.charge(out.len())?;
        Ok(out)
    }

    fn into_variables(self) -> HashMap<String, String> {
        self.resolved
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

/// Module names from a `Requires` value, dropping version constraints.
pub fn parse_requires(value: &str) -> Vec<String> {
    let mut modules = Vec::new();
    let mut tokens = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty());

    while let Some(token) = tokens.next() {
        if VERSION_OPERATORS.contains(&token) {
            tokens.next();
            continue;
        }
        modules.push(token.to_string());
    }
    modules
}

/// Parse descriptor text with the default expansion limit.
pub fn parse(text: &str) -> Result<PkgConfigFile> {
    parse_with_limit(text, DEFAULT_EXPANSION_LIMIT)
}

/// Parse descriptor text, failing once variable expansion has produced more
/// than `limit` bytes in total.
pub fn parse_with_limit(text: &str, limit: usize) -> Result<PkgConfigFile> {
    let mut raw_vars: HashMap<String, String> = HashMap::new();
    let mut keywords: Vec<(&str, &str)> = Vec::new();

    for line in text.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        match classify(line) {
            Some(Line::Variable(name, value)) => {
                raw_vars.insert(name.to_string(), value.to_string());
            }
            Some(Line::Keyword(key, value)) => keywords.push((key, value)),
            None => {}
        }
    }

    let mut expander = Expander::new(&raw_vars, limit);
    for name in raw_vars.keys() {
        expander.resolve(name)?;
    }
    let mut expanded = Vec::with_capacity(keywords.len());
    for (key, value) in keywords {
        expanded.push((key, expander.expand(value)?));
    }

    let mut file = PkgConfigFile {
        variables: expander.into_variables(),
        ..Default::default()
    };

    for (key, value) in expanded {
        match key {
            "Name" => file.name = Some(value),
            "Version" => file.version = Some(value).filter(|v| !v.is_empty()),
            "Requires" => file.requires.extend(parse_requires(&value)),
            "Libs" => file
                .libs
                .extend(value.split_whitespace().map(str::to_string)),
            _ => {}
        }
    }

    Ok(file)
}
