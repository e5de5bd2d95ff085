use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info};

use super::stats::BuildStats;
use crate::class::scanner::{ClassScanner, FileCollector, MemberTable, ScannedType, SourcePair};
use crate::class::types::{ClassNode, Hierarchy, Variable, LABEL_SYMBOL, TYPE_SYMBOL};
use crate::config::{Category, DocConfig};
use crate::error::Result;
use crate::translation::TranslationTable;

/// Files read per type: the declaration and the definition
const FILES_PER_TYPE: usize = 2;

/// Builds the class tree of a category from its folder layout
///
/// Layout of a category folder:
///
/// ```text
/// <source_root>/<folder>/<Base>.h|.cpp
/// <source_root>/<folder>/Children/<Child>.h|.cpp
/// <source_root>/<folder>/Children/<Child>/<GrandChild>.h|.cpp
/// ```
#[derive(Debug)]
pub struct HierarchyBuilder<'a> {
    config: &'a DocConfig,

    scanner: ClassScanner<'a>,

    /// File collector for finding paired files
    collector: FileCollector,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(config: &'a DocConfig, translations: &'a TranslationTable) -> Self {
        Self {
            config,
            scanner: ClassScanner::new(translations),
            collector: FileCollector::new(&config.header_extension, &config.source_extension),
        }
    }

    /// Build one category's hierarchy
    pub fn build(&self, category: &Category) -> Result<(Hierarchy, BuildStats)> {
        info!("Building category {}", category.folder);
        let dir = self.config.source_root.join(&category.folder);
        let base = self
            .collector
            .find_base(&dir, &category.folder, category.base.as_deref())?;

        let mut stats = BuildStats {
            categories: 1,
            ..BuildStats::default()
        };

        let synthetic = synthetic_variables();
        let seed: BTreeMap<String, Variable> = synthetic
            .iter()
            .map(|v| (v.symbol.clone(), v.clone()))
            .collect();
        let scanned = self.scan(&base, &MemberTable::with_framework_members(), &seed, &mut stats)?;

        let mut root = ClassNode::root(&base.name, synthetic, scanned.variables);
        root.file_path = Some(base.header.clone());

        let children_dir = dir.join(&self.config.children_dir);
        let root = self.attach_children(root, &scanned.members, &children_dir, category, 1, &mut stats)?;

        stats.types = root.type_count();
        stats.documented_variables = root.documented_count();
        info!(
            "Built {}: {} types, {} documented variables",
            category.folder, stats.types, stats.documented_variables
        );

        Ok((
            Hierarchy {
                category: category.folder.clone(),
                root,
            },
            stats,
        ))
    }

    /// Derive a child of `parent` for every pair in `dir` and attach it
    fn attach_children(
        &self,
        mut parent: ClassNode,
        parent_members: &MemberTable,
        dir: &Path,
        category: &Category,
        level: usize,
        stats: &mut BuildStats,
    ) -> Result<ClassNode> {
        for pair in self.collector.collect_pairs(dir)? {
            debug!("Child {} of {}", pair.name, parent.name);
            let scanned = self.scan(&pair, parent_members, &parent.variables, stats)?;

            let mut child = ClassNode::derive(&parent, &pair.name, scanned.variables);
            child.file_path = Some(pair.header.clone());

            let nested_dir = dir.join(&pair.name);
            if level == 1 && nested_dir.is_dir() {
                if category.nested {
                    child = self.attach_children(
                        child,
                        &scanned.members,
                        &nested_dir,
                        category,
                        level + 1,
                        stats,
                    )?;
                } else {
                    debug!("Nesting disabled for {}, skipping {}", category.folder, nested_dir.display());
                }
            }

            parent = parent.with_child(child);
        }
        Ok(parent)
    }

    fn scan(
        &self,
        pair: &SourcePair,
        parent_members: &MemberTable,
        inherited: &BTreeMap<String, Variable>,
        stats: &mut BuildStats,
    ) -> Result<ScannedType> {
        let scanned = self.scanner.scan_type(pair, parent_members, inherited)?;
        stats.files_read += FILES_PER_TYPE;
        if scanned.variables.is_empty() {
            stats.types_without_parameters += 1;
        }
        Ok(scanned)
    }
}

/// The `label` / `type` entries every configurable object carries
fn synthetic_variables() -> [Variable; 2] {
    [
        Variable::synthetic(LABEL_SYMBOL, "label", "The label of the object"),
        Variable::synthetic(TYPE_SYMBOL, "type", "The type of the object"),
    ]
}
