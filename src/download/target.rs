//! Download target derivation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::PROVENANCE_SUFFIX;
use crate::error_handling::TargetError;

/// A candidate URL paired with the local path it will be saved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    pub dest: PathBuf,
}

impl DownloadTarget {
    /// Derives the destination for `url` inside `file_dir`.
    ///
    /// The file name is the URL's final path segment with any query string and
    /// fragment removed, percent-decoded. If the segment is not valid
    /// percent-encoded UTF-8 it is used undecoded.
    ///
    /// # Errors
    ///
    /// Returns `TargetError` if there is no file name, or if the decoded name
    /// would escape `file_dir` (path separators, `.` or `..`).
    pub fn from_url(url: &str, file_dir: &Path) -> Result<Self, TargetError> {
        let name = file_name_from_url(url)?;
        Ok(Self {
            url: url.to_string(),
            dest: file_dir.join(name),
        })
    }

    /// The file name portion of the destination.
    pub fn file_name(&self) -> String {
        self.dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Path of the provenance record written next to the download.
    pub fn sidecar_path(&self) -> PathBuf {
        sidecar_path(&self.dest)
    }

    /// Whether the plain (unencrypted) HTTP scheme is used.
    pub fn is_plain_http(&self) -> bool {
        scheme(&self.url).eq_ignore_ascii_case("http")
    }
}

/// Returns the scheme portion of a URL (text before `://`), or the whole string if there is none.
pub fn scheme(url: &str) -> &str {
    url.split_once("://").map_or(url, |(scheme, _)| scheme)
}

/// Appends the provenance suffix to a path, keeping the existing extension.
pub fn sidecar_path(dest: &Path) -> PathBuf {
    let mut raw: OsString = dest.as_os_str().to_owned();
    raw.push(PROVENANCE_SUFFIX);
    PathBuf::from(raw)
}

fn file_name_from_url(url: &str) -> Result<String, TargetError> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment
        .split('?')
        .next()
        .unwrap_or(without_fragment);
    let after_scheme = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| rest);

    // A bare host ("http://example.com") has no path to take a name from
    let segment = match after_scheme.rsplit_once('/') {
        Some((_, segment)) => segment,
        None => return Err(TargetError::NoFileName(url.to_string())),
    };
    if segment.is_empty() {
        return Err(TargetError::NoFileName(url.to_string()));
    }

    let name = match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    };

    if name == "." || name == ".." || name.contains('/') || name.contains('\\') || name.contains('\0')
    {
        return Err(TargetError::UnsafeFileName {
            url: url.to_string(),
            name,
        });
    }

    Ok(name)
}
