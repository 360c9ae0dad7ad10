//! Build context: environment variables, base directory, build time and
//! the console that progress lines are written to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;

/// Environment variables available to macro expansion.
pub type EnvVars = BTreeMap<String, String>;

/// Line-oriented output shown to whoever runs the build.
pub trait ConsoleSink: Send + Sync {
    fn println(&self, line: &str);
}

/// Writes console lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl ConsoleSink for StdoutConsole {
    fn println(&self, line: &str) {
        println!("{line}");
    }
}

/// Keeps console lines in memory.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    lines: Mutex<Vec<String>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Returns `true` if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl ConsoleSink for MemoryConsole {
    fn println(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Everything a transfer needs to know about the build it publishes.
#[derive(Clone)]
pub struct BuildContext {
    pub env: EnvVars,
    /// Directory that source patterns are relative to.
    pub base_dir: PathBuf,
    /// Timestamp used for date-formatted remote directories.
    pub build_time: NaiveDateTime,
    /// Gates [`print_if_verbose`](Self::print_if_verbose).
    pub verbose: bool,
    /// Prepended to every console line.
    pub console_prefix: String,
    console: Arc<dyn ConsoleSink>,
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("env", &self.env)
            .field("base_dir", &self.base_dir)
            .field("build_time", &self.build_time)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl BuildContext {
    pub fn new(
        env: EnvVars,
        base_dir: impl Into<PathBuf>,
        build_time: NaiveDateTime,
        console: Arc<dyn ConsoleSink>,
    ) -> Self {
        Self {
            env,
            base_dir: base_dir.into(),
            build_time,
            verbose: false,
            console_prefix: String::new(),
            console,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Expands `$NAME` and `${NAME}` references against this build's variables.
    pub fn expand(&self, template: &str) -> String {
        expand(template, &self.env)
    }

    pub fn println(&self, line: &str) {
        self.console
            .println(&format!("{}{line}", self.console_prefix));
    }

    pub fn print_if_verbose(&self, line: &str) {
        if self.verbose {
            self.println(line);
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replaces `$NAME` and `${NAME}` with values from `env`.
///
/// `NAME` is made of ASCII letters, digits and `_`; the braced form also
/// allows `.`. References to unknown variables are left as written.
pub fn expand(template: &str, env: &EnvVars) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                let name = &braced[..end];
                let valid = !name.is_empty() && name.chars().all(|c| is_name_char(c) || c == '.');
                if let Some(value) = env.get(name).filter(|_| valid) {
                    out.push_str(value);
                    rest = &braced[end + 1..];
                    continue;
                }
            }
        } else {
            let len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
            if let Some(value) = env.get(&after[..len]).filter(|_| len > 0) {
                out.push_str(value);
                rest = &after[len..];
                continue;
            }
        }

        out.push('$');
        rest = after;
    }

    out.push_str(rest);
    out
}
