use std::io;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::error::{ExtractError, Result};
use crate::utils::file_utils;

/// A declaration file and the definition file that goes with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePair {
    /// Type name, taken from the file stem
    pub name: String,
    pub header: PathBuf,
    pub source: PathBuf,
}

/// File collector for finding paired declaration/definition files
#[derive(Debug, Clone)]
pub struct FileCollector {
    /// Extension of declaration files, without the dot
    header_extension: String,

    /// Extension of definition files, without the dot
    source_extension: String,
}

impl Default for FileCollector {
    fn default() -> Self {
        Self::new("h", "cpp")
    }
}

impl FileCollector {
    pub fn new(header_extension: &str, source_extension: &str) -> Self {
        Self {
            header_extension: header_extension.to_string(),
            source_extension: source_extension.to_string(),
        }
    }

    /// Pair a declaration file with its definition file
    ///
    /// A missing definition file is a missing input file.
    pub fn pair(&self, header: &Path) -> Result<SourcePair> {
        let name = file_utils::file_stem(header).ok_or_else(|| {
            ExtractError::io(header, io::Error::new(io::ErrorKind::InvalidInput, "no file stem"))
        })?;
        let source = header.with_extension(&self.source_extension);
        if !source.is_file() {
            return Err(ExtractError::io(
                &source,
                io::Error::new(io::ErrorKind::NotFound, "definition file not found"),
            ));
        }
        trace!("Paired {} with {}", header.display(), source.display());
        Ok(SourcePair {
            name,
            header: header.to_path_buf(),
            source,
        })
    }

    /// Collect every pair directly inside `dir`, sorted by name
    ///
    /// A directory that does not exist holds no pairs.
    pub fn collect_pairs(&self, dir: impl AsRef<Path>) -> Result<Vec<SourcePair>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            trace!("No directory {}", dir.display());
            return Ok(Vec::new());
        }

        let pairs = file_utils::files_with_extension(dir, &self.header_extension)?
            .iter()
            .map(|header| self.pair(header))
            .collect::<Result<Vec<_>>>()?;
        debug!("Collected {} types from {}", pairs.len(), dir.display());
        Ok(pairs)
    }

    /// Locate the base type of a category folder
    ///
    /// With an explicit `base` name its declaration file must exist. Otherwise
    /// the candidates are headers whose stem starts with the folder name minus
    /// its last three characters (`Likelihoods` -> `Likeliho`); the shortest
    /// stem wins.
    pub fn find_base(
        &self,
        dir: impl AsRef<Path>,
        category: &str,
        base: Option<&str>,
    ) -> Result<SourcePair> {
        let dir = dir.as_ref();
        let missing = || ExtractError::MissingBaseType {
            category: category.to_string(),
            dir: dir.to_path_buf(),
        };
        if !dir.is_dir() {
            return Err(missing());
        }

        let headers = file_utils::files_with_extension(dir, &self.header_extension)?;
        let header = match base {
            Some(base) => headers
                .into_iter()
                .find(|h| file_utils::file_stem(h).as_deref() == Some(base)),
            None => {
                let prefix = base_prefix(category);
                headers
                    .into_iter()
                    .filter_map(|h| file_utils::file_stem(&h).map(|stem| (stem, h)))
                    .filter(|(stem, _)| stem.starts_with(prefix))
                    .min_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
                    .map(|(_, h)| h)
            }
        }
        .ok_or_else(missing)?;

        debug!("Base of {} is {}", category, header.display());
        self.pair(&header)
    }
}

/// Folder name minus its last three characters
fn base_prefix(folder: &str) -> &str {
    let keep = folder.chars().count().saturating_sub(3);
    match folder.char_indices().nth(keep) {
        Some((at, _)) => &folder[..at],
        None => folder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn base_prefix_drops_three_characters() {
        assert_eq!(base_prefix("Likelihoods"), "Likeliho");
        assert_eq!(base_prefix("Processes"), "Proces");
        assert_eq!(base_prefix("Ab"), "");
    }

    #[test]
    fn finds_shortest_matching_base() {
        let dir = tempdir().unwrap();
        for name in ["Process.h", "Process.cpp", "ProcessFactory.h", "ProcessFactory.cpp", "Manager.h"] {
            touch(dir.path(), name);
        }
        let base = FileCollector::default()
            .find_base(dir.path(), "Processes", None)
            .unwrap();
        assert_eq!(base.name, "Process");
        assert_eq!(base.source, dir.path().join("Process.cpp"));
    }

    #[test]
    fn explicit_base_name_wins() {
        let dir = tempdir().unwrap();
        for name in ["MCMC.h", "MCMC.cpp", "Manager.h"] {
            touch(dir.path(), name);
        }
        let base = FileCollector::default()
            .find_base(dir.path(), "MCMCs", Some("MCMC"))
            .unwrap();
        assert_eq!(base.name, "MCMC");
    }

    #[test]
    fn missing_base_is_an_error() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Manager.h");
        let err = FileCollector::default()
            .find_base(dir.path(), "Likelihoods", None)
            .unwrap_err();
        assert!(matches!(err, ExtractError::MissingBaseType { .. }));
    }

    #[test]
    fn header_without_definition_is_fatal() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Multinomial.h");
        let err = FileCollector::default().collect_pairs(dir.path()).unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    #[test]
    fn collects_pairs_in_name_order() {
        let dir = tempdir().unwrap();
        for name in ["Normal.h", "Normal.cpp", "Binomial.h", "Binomial.cpp", "notes.txt"] {
            touch(dir.path(), name);
        }
        let names: Vec<_> = FileCollector::default()
            .collect_pairs(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Binomial", "Normal"]);
        assert!(FileCollector::default().collect_pairs(dir.path().join("Children")).unwrap().is_empty());
    }
}
