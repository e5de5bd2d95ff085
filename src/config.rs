//! Run configuration: where sources live, the category catalog and the
//! cosmetic name rules.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};
use crate::translation::DEFAULT_PREFIX;
use crate::utils::file_utils;

/// One folder of related configurable types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Folder under the source root, e.g. `Likelihoods`
    pub folder: String,

    /// Base type name when it cannot be derived from the folder name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    /// Whether `Children/<Child>/` directories are scanned as a third level
    #[serde(default = "default_true")]
    pub nested: bool,

    /// Subtypes left out of the rendered output
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<String>,
}

impl Category {
    pub fn new(folder: &str) -> Self {
        Self {
            folder: folder.to_string(),
            base: None,
            nested: true,
            suppressed: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }

    pub fn flat(mut self) -> Self {
        self.nested = false;
        self
    }

    pub fn suppressing(mut self, name: &str) -> Self {
        self.suppressed.push(name.to_string());
        self
    }

    pub fn is_suppressed(&self, type_name: &str) -> bool {
        self.suppressed.iter().any(|s| s == type_name)
    }
}

/// Literal replacement applied to generated command names and labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRule {
    pub from: String,
    pub to: String,
}

impl NameRule {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Configuration of one documentation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocConfig {
    /// Directory holding one folder per category
    pub source_root: PathBuf,

    /// Translations header; `<source_root>/Translations/English_UK.h` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<PathBuf>,

    /// Where the markup files are written
    pub output_dir: PathBuf,

    pub translation_prefix: String,

    /// Name of the subtype directory inside a category folder
    pub children_dir: String,

    pub header_extension: String,

    pub source_extension: String,

    /// Ordered category catalog
    pub categories: Vec<Category>,

    pub name_rules: Vec<NameRule>,

    /// Extra raw type -> display type entries, layered over the built-in table
    pub type_aliases: BTreeMap<String, String>,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("source"),
            translations: None,
            output_dir: PathBuf::from("Documentation/UserManual/Syntax"),
            translation_prefix: DEFAULT_PREFIX.to_string(),
            children_dir: "Children".to_string(),
            header_extension: "h".to_string(),
            source_extension: "cpp".to_string(),
            categories: default_catalog(),
            name_rules: default_name_rules(),
            type_aliases: BTreeMap::new(),
        }
    }
}

/// The framework's categories, in manual order
pub fn default_catalog() -> Vec<Category> {
    vec![
        Category::new("AgeingErrors"),
        Category::new("AgeSizes"),
        Category::new("Catchabilities"),
        Category::new("DerivedQuantities"),
        Category::new("Estimates"),
        Category::new("InitialisationPhases"),
        Category::new("Likelihoods"),
        Category::new("MCMC")
            .with_base("MCMC")
            .suppressing("IndependenceMetropolis"),
        Category::new("Minimisers"),
        Category::new("Model").with_base("Model").flat(),
        Category::new("Observations"),
        Category::new("Penalties"),
        Category::new("Processes"),
        Category::new("Profiles"),
        Category::new("Reports").flat(),
        Category::new("Selectivities"),
        Category::new("SizeWeights"),
        Category::new("TimeSteps"),
    ]
}

pub fn default_name_rules() -> Vec<NameRule> {
    vec![
        NameRule::new(r"m\_c\_m\_c", "mcmc"),
        NameRule::new("M C M C", "MCMC"),
        NameRule::new(r"m\_p\_d", "mpd"),
        NameRule::new("M P D", "MPD"),
    ]
}

impl DocConfig {
    /// Load a TOML configuration file; omitted fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {}", path.display());
        let content = file_utils::read_file_to_string(path)?;
        let config = Self::from_toml(&content)?;
        debug!("Configuration: {:?}", config);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ExtractError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn translations_path(&self) -> PathBuf {
        self.translations
            .clone()
            .unwrap_or_else(|| self.source_root.join("Translations").join("English_UK.h"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.translation_prefix.is_empty() {
            return Err(ExtractError::Config("translation_prefix is empty".into()));
        }
        if self.header_extension.is_empty() || self.source_extension.is_empty() {
            return Err(ExtractError::Config("file extensions must not be empty".into()));
        }
        if self.children_dir.is_empty() {
            return Err(ExtractError::Config("children_dir is empty".into()));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.folder.is_empty() {
                return Err(ExtractError::Config("category with an empty folder".into()));
            }
            if !seen.insert(category.folder.as_str()) {
                return Err(ExtractError::Config(format!(
                    "category {} listed twice",
                    category.folder
                )));
            }
        }
        Ok(())
    }

    /// Categories to build; all of them when `names` is empty
    ///
    /// Selected categories keep catalog order. Naming a category that is not
    /// in the catalog is a configuration error.
    pub fn select_categories(&self, names: &[String]) -> Result<Vec<Category>> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.categories.iter().any(|c| &c.folder == *name))
        {
            return Err(ExtractError::Config(format!("unknown category {unknown}")));
        }

        Ok(self
            .categories
            .iter()
            .filter(|c| names.is_empty() || names.contains(&c.folder))
            .cloned()
            .collect())
    }
}
