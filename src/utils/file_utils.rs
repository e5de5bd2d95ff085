use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use walkdir::WalkDir;

use crate::error::{ExtractError, Result};

/// Create a directory if it doesn't exist
pub fn ensure_dir_exists(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.exists() {
        debug!("Creating directory: {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| ExtractError::io(dir, e))?;
    }
    Ok(())
}

/// Check if a file has a specific extension
pub fn has_extension(path: impl AsRef<Path>, extension: &str) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// List the files directly inside `dir` that carry `extension`, sorted by path
///
/// Subdirectories are not descended into; nesting levels are walked
/// explicitly by the hierarchy builder.
pub fn files_with_extension(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    debug!("Collecting .{} files from directory: {}", extension, dir.display());

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            ExtractError::io(dir, source)
        })?;
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            trace!("Found file: {}", entry.path().display());
            files.push(entry.path().to_owned());
        }
    }

    debug!("Collected {} files", files.len());
    Ok(files)
}

/// Read a file to string, mapping failures to [`ExtractError::Io`]
pub fn read_file_to_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))
}

/// Write a string to a file, creating the parent directory first
pub fn write_string_to_file(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }

    fs::write(path, content).map_err(|e| ExtractError::io(path, e))
}

/// File stem as an owned string, e.g. `Children/Multinomial.h` -> `Multinomial`
pub fn file_stem(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}
