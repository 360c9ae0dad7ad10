//! Local file selection with Ant-style include/exclude patterns.
//!
//! Pattern lists are split on a separator regex (`[, ]+` by default). In a
//! pattern `*` and `?` stay within one path segment and `**` spans any
//! number of segments. A trailing `/` stands for `/**`, and `dir/**` also
//! matches `dir` itself. Every other character, brackets and braces
//! included, matches literally.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use outbound_config::constants::{DEFAULT_EXCLUDES, DEFAULT_PATTERN_SEPARATOR};
use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::TransferError;
use crate::path_rules::to_unix;

/// Files and directories chosen for one transfer, as absolute paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub files: Vec<PathBuf>,
    /// Selected directories holding nothing else that was selected.
    pub empty_dirs: Vec<PathBuf>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.empty_dirs.is_empty()
    }
}

/// Walks a base directory and returns what the patterns select.
#[derive(Debug, Clone)]
pub struct FileFinder {
    includes: GlobSet,
    excludes: GlobSet,
    find_empty_dirs: bool,
}

impl FileFinder {
    /// Compiles include and exclude lists.
    ///
    /// `separator` overrides the regex splitting each list.
    pub fn new(
        includes: &str,
        excludes: Option<&str>,
        default_excludes: bool,
        find_empty_dirs: bool,
        separator: Option<&str>,
    ) -> Result<Self, TransferError> {
        let separator = Regex::new(separator.unwrap_or(DEFAULT_PATTERN_SEPARATOR))?;

        let include_patterns = split_patterns(includes, &separator);
        let mut exclude_patterns = excludes
            .map(|list| split_patterns(list, &separator))
            .unwrap_or_default();
        if default_excludes {
            exclude_patterns.extend(DEFAULT_EXCLUDES.iter().map(|p| p.to_string()));
        }

        Ok(Self {
            includes: compile(&include_patterns)?,
            excludes: compile(&exclude_patterns)?,
            find_empty_dirs,
        })
    }

    /// Returns `true` if `rel_path` (relative, `/`-separated) is selected.
    pub fn is_selected(&self, rel_path: &str) -> bool {
        self.includes.is_match(rel_path) && !self.excludes.is_match(rel_path)
    }

    /// Walks `base` and collects the selected entries.
    ///
    /// Entries are visited in file-name order. Symlinks are followed; links
    /// that loop back onto an ancestor are skipped.
    pub fn find(&self, base: &Path) -> Result<Selection, TransferError> {
        let mut files = Vec::new();
        let mut file_paths = Vec::new();
        let mut dir_paths = Vec::new();

        for entry in WalkDir::new(base)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.loop_ancestor().is_some() => {
                    warn!(path = ?e.path(), "skipping symlink loop");
                    continue;
                }
                Err(e) if is_dangling_link(&e) => {
                    warn!(path = ?e.path(), "skipping dangling symlink");
                    continue;
                }
                Err(e) => return Err(std::io::Error::from(e).into()),
            };

            let rel = match entry.path().strip_prefix(base) {
                Ok(rel) => to_unix(&rel.to_string_lossy()),
                Err(_) => continue,
            };
            if !self.is_selected(&rel) {
                continue;
            }

            if entry.file_type().is_dir() {
                if self.find_empty_dirs {
                    dir_paths.push(rel);
                }
            } else {
                files.push(entry.into_path());
                if self.find_empty_dirs {
                    file_paths.push(rel);
                }
            }
        }

        let empty_dirs = if self.find_empty_dirs {
            let leaves = reduce(&dir_paths, &dir_paths);
            reduce(&leaves, &file_paths)
                .into_iter()
                .map(|rel| base.join(rel))
                .collect()
        } else {
            Vec::new()
        };

        debug!(
            base = %base.display(),
            files = files.len(),
            empty_dirs = empty_dirs.len(),
            "scan complete"
        );

        Ok(Selection { files, empty_dirs })
    }
}

/// Splits a pattern list, dropping blank entries.
pub fn split_patterns(list: &str, separator: &Regex) -> Vec<String> {
    separator
        .split(list.trim())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keeps the directories that are not an ancestor of any entry in `paths`.
///
/// The root (`""`) is never kept. Order follows `directories`.
pub fn reduce(directories: &[String], paths: &[String]) -> Vec<String> {
    let paths: BTreeSet<&str> = paths
        .iter()
        .map(String::as_str)
        .filter(|p| !p.is_empty())
        .collect();

    directories
        .iter()
        .filter(|dir| !dir.is_empty())
        .filter(|dir| {
            let prefix = format!("{dir}/");
            !paths.iter().any(|p| p.starts_with(&prefix))
        })
        .cloned()
        .collect()
}

fn compile(patterns: &[String]) -> Result<GlobSet, TransferError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        for expanded in expand_pattern(pattern) {
            let glob = GlobBuilder::new(&expanded)
                .literal_separator(true)
                .backslash_escape(true)
                .build()
                .map_err(|source| TransferError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            builder.add(glob);
        }
    }
    builder.build().map_err(|source| TransferError::Pattern {
        pattern: patterns.join(","),
        source,
    })
}

/// Rewrites one Ant pattern into the globs that implement it.
fn expand_pattern(pattern: &str) -> Vec<String> {
    let mut pattern = to_unix(pattern);
    if let Some(stripped) = pattern.strip_prefix('/') {
        pattern = stripped.to_string();
    }
    if pattern.ends_with('/') {
        pattern.push_str("**");
    }
    while pattern.contains("**/**") {
        pattern = pattern.replace("**/**", "**");
    }

    let mut globs = vec![escape_literals(&pattern)];
    if let Some(parent) = pattern.strip_suffix("/**")
        && !parent.is_empty()
    {
        globs.push(escape_literals(parent));
    }
    globs
}

/// Escapes the glob syntax Ant patterns don't have. Backslashes were
/// already turned into `/`, so they are free to act as escapes.
fn escape_literals(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '[' | ']' | '{' | '}') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A followed symlink whose target does not exist.
fn is_dangling_link(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
        && err
            .path()
            .and_then(|p| p.symlink_metadata().ok())
            .is_some_and(|meta| meta.file_type().is_symlink())
}
