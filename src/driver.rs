//! Sequences a documentation run: translations, per-category build and
//! render, then the external typesetting step.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use log::{debug, info};

use crate::class::processor::{BuildStats, HierarchyBuilder};
use crate::class::scanner::ProgressTracker;
use crate::class::types::Hierarchy;
use crate::config::{Category, DocConfig};
use crate::render::{LatexRenderer, NameRules, TypeAliases};
use crate::translation::TranslationTable;
use crate::utils::file_utils;

/// The step that turns the generated markup into a finished document
pub trait Typesetter {
    fn typeset(&self, output_dir: &Path, files: &[PathBuf]) -> Result<()>;
}

/// Leaves the markup files as they are
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTypesetter;

impl Typesetter for NoTypesetter {
    fn typeset(&self, _output_dir: &Path, files: &[PathBuf]) -> Result<()> {
        debug!("No typesetting step configured for {} files", files.len());
        Ok(())
    }
}

/// Runs a shell command in the output directory
#[derive(Debug, Clone)]
pub struct CommandTypesetter {
    command: String,
}

impl CommandTypesetter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Typesetter for CommandTypesetter {
    fn typeset(&self, output_dir: &Path, _files: &[PathBuf]) -> Result<()> {
        info!("Typesetting with `{}` in {}", self.command, output_dir.display());
        let mut command = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C");
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c");
            c
        };

        let status = command
            .arg(&self.command)
            .current_dir(output_dir)
            .status()
            .with_context(|| format!("Failed to start `{}`", self.command))?;
        if !status.success() {
            bail!("`{}` exited with {}", self.command, status);
        }
        Ok(())
    }
}

/// Per-run choices that are not part of the configuration file
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Catalog folders to build; empty means all
    pub categories: Vec<String>,

    /// Build categories on this many threads; `Some(0)` uses every core
    pub jobs: Option<usize>,

    /// Also dump the built hierarchies as JSON
    pub json: Option<PathBuf>,

    pub show_progress: bool,
}

/// What a successful run produced
#[derive(Debug)]
pub struct RunSummary {
    pub files: Vec<PathBuf>,
    pub hierarchies: Vec<Hierarchy>,
    pub stats: BuildStats,
}

/// Generate the markup for every selected category
///
/// Categories are rendered in catalog order. The first failing category
/// aborts the run; files already written stay on disk.
pub fn run(config: &DocConfig, options: &RunOptions, typesetter: &dyn Typesetter) -> Result<RunSummary> {
    config.validate()?;
    let categories = config.select_categories(&options.categories)?;

    let translations = TranslationTable::load(config.translations_path(), &config.translation_prefix)
        .context("Failed to load translations")?;
    let builder = HierarchyBuilder::new(config, &translations);

    let mut aliases = TypeAliases::builtin();
    aliases.extend(config.type_aliases.clone());
    let names = NameRules::new(config.name_rules.clone());
    let renderer = LatexRenderer::new(&aliases, &names);

    let tracker = if options.show_progress {
        ProgressTracker::new()
    } else {
        ProgressTracker::hidden()
    };

    let render = |category: &Category, built: (Hierarchy, BuildStats)| -> Result<(PathBuf, Hierarchy, BuildStats)> {
        let (hierarchy, stats) = built;
        let path = renderer
            .write(&hierarchy, category, &config.output_dir)
            .with_context(|| format!("Failed to write category {}", category.folder))?;
        Ok((path, hierarchy, stats))
    };
    let build = |category: &Category| {
        builder
            .build(category)
            .with_context(|| format!("Failed to build category {}", category.folder))
    };

    let outputs = match options.jobs {
        Some(jobs) if jobs != 1 => {
            let threads = if jobs == 0 { num_cpus::get() } else { jobs };
            debug!("Building {} categories on {} threads", categories.len(), threads);
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("Failed to build thread pool")?;
            let built = pool.install(|| tracker.track_parallel(&categories, |c| c.folder.clone(), build));
            categories
                .iter()
                .zip(built)
                .map(|(category, built)| render(category, built?))
                .collect::<Result<Vec<_>>>()?
        }
        _ => tracker.track_sequential(&categories, |c| c.folder.clone(), |category| {
            render(category, build(category)?)
        })?,
    };

    let mut summary = RunSummary {
        files: Vec::with_capacity(outputs.len()),
        hierarchies: Vec::with_capacity(outputs.len()),
        stats: BuildStats::new(),
    };
    for (path, hierarchy, stats) in outputs {
        summary.stats.merge(&stats);
        summary.files.push(path);
        summary.hierarchies.push(hierarchy);
    }

    if let Some(json) = &options.json {
        write_json(json, &summary.hierarchies)?;
    }

    typesetter
        .typeset(&config.output_dir, &summary.files)
        .context("Typesetting failed")?;

    info!(
        "Documented {} categories: {} types, {} variables ({:.1} per type) from {} files",
        summary.stats.categories,
        summary.stats.types,
        summary.stats.documented_variables,
        summary.stats.avg_variables_per_type(),
        summary.stats.files_read
    );
    Ok(summary)
}

fn write_json(path: &Path, hierarchies: &[Hierarchy]) -> Result<()> {
    let json = serde_json::to_string_pretty(hierarchies).context("Failed to serialize hierarchies")?;
    file_utils::write_string_to_file(path, &json)?;
    info!("Wrote {}", path.display());
    Ok(())
}
