//! Dataset loading from disk.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::observability::metrics;
use crate::store::parser::{parse, LineFormat, Parsed};

/// Why a dataset could not be (re)loaded.
///
/// Every variant leaves the previously published snapshot in place.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The configuration does not name a file for this dataset.
    #[error("{key} not configured")]
    NotConfigured { key: &'static str },

    /// The file is missing, unreadable or not valid UTF-8.
    #[error("cannot read {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fixed whitelist parsed to zero addresses.
    #[error("fixed whitelist {} is empty, keeping previous entries", path.display())]
    EmptyFixedWhitelist { path: PathBuf },
}

/// Resolve the configured path for a dataset.
///
/// A missing or blank path is a configuration error.
pub fn configured_path<'a>(
    path: Option<&'a Path>,
    key: &'static str,
) -> Result<&'a Path, LoadError> {
    match path {
        Some(p) if !p.as_os_str().is_empty() => Ok(p),
        _ => Err(LoadError::NotConfigured { key }),
    }
}

/// Read and parse a whole dataset file.
///
/// Invalid lines are logged and counted, never fatal. `dataset` labels
/// log events and metrics.
pub fn read_dataset(path: &Path, format: LineFormat, dataset: &'static str) -> Result<Parsed, LoadError> {
    tracing::info!(dataset, path = %path.display(), "Loading dataset");

    let content = fs::read_to_string(path).map_err(|source| LoadError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = parse(&content, format);

    for invalid in &parsed.invalid {
        tracing::warn!(
            dataset,
            path = %path.display(),
            line_no = invalid.line_no,
            fields = invalid.fields,
            line = %invalid.line,
            "Ignoring invalid line"
        );
    }
    metrics::record_invalid_lines(dataset, parsed.invalid.len());

    tracing::debug!(
        dataset,
        records = parsed.records.len(),
        invalid = parsed.invalid.len(),
        "Parsed dataset"
    );

    Ok(parsed)
}
