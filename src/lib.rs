pub mod class;
pub mod config;
pub mod driver;
pub mod error;
pub mod render;
pub mod translation;
pub mod utils;

// Re-export main types and functions for easier access
pub use class::types::{ClassNode, Hierarchy, Variable};
pub use class::processor::{BuildStats, HierarchyBuilder};
pub use config::{Category, DocConfig};
pub use driver::{run, CommandTypesetter, NoTypesetter, RunOptions, RunSummary, Typesetter};
pub use error::{ExtractError, SourceLocation};
pub use render::{LatexRenderer, NameRules, TypeAliases};
pub use translation::TranslationTable;

// Re-export utility functions
pub use utils::file_utils;
