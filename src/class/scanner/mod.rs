mod constructor;
mod file_collector;
mod member_scanner;
mod progress;
mod statement;
mod tokenizer;

use std::collections::BTreeMap;

use log::debug;

use crate::class::types::Variable;
use crate::error::Result;
use crate::translation::TranslationTable;

// Re-export from submodules
pub use constructor::{ConstructorExtractor, LogicalStatement};
pub use file_collector::{FileCollector, SourcePair};
pub use member_scanner::{member_declaration, normalize_type_spacing, MemberScanner, MemberTable};
pub use progress::ProgressTracker;
pub use statement::{is_statement_start, parse_statement, Modifier, Statement};
pub use tokenizer::{split_arguments, unquote};

/// What one type's pair of files contributes to the hierarchy
#[derive(Debug, Clone)]
pub struct ScannedType {
    /// Members of this type layered over its parent's
    pub members: MemberTable,

    /// Variables declared (or re-flagged) by this type's constructor
    pub variables: Vec<Variable>,
}

/// Class scanner running the member and constructor passes over one type
#[derive(Debug, Clone, Copy)]
pub struct ClassScanner<'a> {
    /// Read-only symbol table shared by every scan
    translations: &'a TranslationTable,
}

impl<'a> ClassScanner<'a> {
    pub fn new(translations: &'a TranslationTable) -> Self {
        Self { translations }
    }

    /// Scan one type given what its parent makes visible
    pub fn scan_type(
        &self,
        pair: &SourcePair,
        parent_members: &MemberTable,
        inherited: &BTreeMap<String, Variable>,
    ) -> Result<ScannedType> {
        let members = MemberScanner::new(&pair.name)
            .scan_file(&pair.header)?
            .layered_over(parent_members);

        let variables =
            ConstructorExtractor::new(&pair.name, self.translations, &members, inherited)
                .extract_file(&pair.source)?;

        debug!(
            "Scanned {}: {} members, {} variables",
            pair.name,
            members.len(),
            variables.len()
        );
        Ok(ScannedType { members, variables })
    }
}
