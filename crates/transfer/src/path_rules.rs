//! Pure functions placing a local file in the remote tree.
//!
//! Every path produced here uses `/` separators regardless of host OS.

use std::path::Path;

use chrono::NaiveDateTime;
use outbound_config::TransferSpec;

use crate::TransferError;
use crate::date_format::format_build_time;
use crate::env::{EnvVars, expand};

/// Converts `\` separators to `/`.
pub fn to_unix(path: &str) -> String {
    path.replace('\\', "/")
}

/// Normalizes a path: unix separators, no `.` segments, no doubled
/// separators, `..` folded into its parent.
///
/// A leading and a trailing separator are kept. Returns `None` when `..`
/// climbs above the start of the path.
pub fn normalize(path: &str) -> Option<String> {
    let unix = to_unix(path);
    if unix.is_empty() {
        return Some(String::new());
    }

    let absolute = unix.starts_with('/');
    let trailing = unix.ends_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in unix.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    let mut normalized = String::with_capacity(unix.len());
    if absolute {
        normalized.push('/');
    }
    normalized.push_str(&segments.join("/"));
    if trailing && !segments.is_empty() {
        normalized.push('/');
    }
    Some(normalized)
}

/// Returns `path` relative to `base`, with `/` separators.
pub fn relative_path_of(base: &Path, path: &Path) -> Result<String, TransferError> {
    let rel = path.strip_prefix(base).map_err(std::io::Error::other)?;
    Ok(to_unix(&rel.to_string_lossy()))
}

/// Removes the macro-expanded `remove_prefix` from the front of `rel_path`.
///
/// A blank prefix leaves the path unchanged. A prefix the path does not
/// start with is a [`TransferError::PrefixMismatch`].
pub fn strip_remove_prefix(
    rel_path: &str,
    remove_prefix: Option<&str>,
    env: &EnvVars,
) -> Result<String, TransferError> {
    let Some(prefix) = remove_prefix.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(rel_path.to_string());
    };

    let expanded = expand(prefix, env);
    let expanded = expanded.trim();
    if expanded.is_empty() {
        return Ok(rel_path.to_string());
    }

    let Some(to_remove) = normalize(&format!("{expanded}/")) else {
        return Ok(rel_path.to_string());
    };
    let to_remove = to_remove.strip_prefix('/').unwrap_or(&to_remove);

    match rel_path.strip_prefix(to_remove) {
        Some(stripped) => Ok(stripped.to_string()),
        None => Err(TransferError::PrefixMismatch {
            path: rel_path.to_string(),
            prefix: to_remove.to_string(),
        }),
    }
}

/// Returns the directory, relative to the remote target directory, that
/// `file` under `base` is placed in.
///
/// Empty when the file sits directly under the effective root.
pub fn relative_directory_of(
    base: &Path,
    file: &Path,
    remove_prefix: Option<&str>,
    env: &EnvVars,
) -> Result<String, TransferError> {
    let rel = relative_path_of(base, file)?;
    let rel = strip_remove_prefix(&rel, remove_prefix, env)?;
    Ok(match rel.rfind('/') {
        Some(idx) => rel[..idx].to_string(),
        None => String::new(),
    })
}

/// Resolves a transfer's remote directory template for one build.
///
/// The template is macro-expanded, normalized and, when the transfer asks
/// for it, rendered as a date pattern against `build_time`. One leading `/`
/// is dropped. A missing or blank template, or one that climbs above the
/// root, resolves to `""`.
pub fn remote_directory_for(
    spec: &TransferSpec,
    build_time: &NaiveDateTime,
    env: &EnvVars,
) -> Result<String, TransferError> {
    let Some(template) = spec.remote_dir_template.as_deref() else {
        return Ok(String::new());
    };

    let Some(mut relative) = normalize(&expand(template, env)) else {
        return Ok(String::new());
    };
    if spec.use_date_format {
        relative = format_build_time(&relative, build_time)?;
    }

    let relative = relative.trim();
    Ok(relative.strip_prefix('/').unwrap_or(relative).to_string())
}

/// Returns `true` if `dir` starts with a path separator.
pub fn is_directory_absolute(dir: &str) -> bool {
    dir.starts_with(['/', '\\'])
}
