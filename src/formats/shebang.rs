//! Interpreter (`#!`) line parsing.

use crate::util::basename;

/// Options of `env` that consume the following word.
const ENV_OPTS_WITH_ARG: [&str; 4] = ["-u", "--unset", "-C", "--chdir"];

/// A parsed `#!` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shebang<'a> {
    /// Interpreter path as written
    pub interpreter: &'a str,
    /// Words after the interpreter
    pub args: Vec<&'a str>,
}

impl<'a> Shebang<'a> {
    /// Parse the first line of a script, without its line terminator.
    ///
    /// Returns `None` when the line is not an interpreter line.
    pub fn parse(line: &'a str) -> Option<Self> {
        let rest = line.strip_prefix("#!")?;
        let mut words = rest.split_whitespace();
        let interpreter = words.next()?;
        Some(Self {
            interpreter,
            args: words.collect(),
        })
    }

    /// Whether the interpreter is the `env` launcher.
    pub fn is_env(&self) -> bool {
        basename(self.interpreter) == "env"
    }

    /// Name of the command the script needs.
    ///
    /// For `env` launchers this is the program `env` would run, so the
    /// launcher itself is never reported. `None` when `env` is given no
    /// program.
    pub fn command(&self) -> Option<&'a str> {
        if self.is_env() {
            env_program(&self.args).map(basename)
        } else {
            Some(basename(self.interpreter))
        }
    }
}

/// The program `env` runs, skipping its options and `NAME=value` pairs.
fn env_program<'a>(args: &[&'a str]) -> Option<&'a str> {
    let mut iter = args.iter().copied();
    while let Some(word) = iter.next() {
        if word == "--" {
            return iter.next();
        }
        if ENV_OPTS_WITH_ARG.contains(&word) {
            iter.next();
            continue;
        }
        if word == "-S" || word == "--split-string" {
            continue;
        }
        if let Some(split) = word.strip_prefix("--split-string=") {
            if !split.is_empty() {
                return Some(split);
            }
            continue;
        }
        if word.starts_with("--") {
            continue;
        }
        if let Some(flags) = word.strip_prefix('-') {
            // `-S` may be glued to its argument or clustered after other flags
            if let Some(idx) = flags.find('S') {
                let split = &flags[idx + 1..];
                if !split.is_empty() {
                    return Some(split);
                }
            }
            continue;
        }
        if word.contains('=') {
            continue;
        }
        return Some(word);
    }
    None
}
