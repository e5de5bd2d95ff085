//! Generate the syntax reference of the configurable object system.
//!
//! Usage: `param-doc [--config FILE] [--source-root DIR] [--output DIR] [--category NAME]...`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::{error, info, LevelFilter};

use param_doc::{run, CommandTypesetter, DocConfig, NoTypesetter, RunOptions, Typesetter};

#[derive(Parser, Debug)]
#[command(name = "param-doc")]
#[command(about = "Extract configuration parameter documentation from framework sources")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding one folder per category
    #[arg(long = "source-root")]
    source_root: Option<PathBuf>,

    /// Translations header
    #[arg(long)]
    translations: Option<PathBuf>,

    /// Output directory for the markup files
    #[arg(long)]
    output: Option<PathBuf>,

    /// Only build this category (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Build categories on N threads (0 = all cores)
    #[arg(long)]
    jobs: Option<usize>,

    /// Also write the built hierarchies as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Command run in the output directory once every category is written
    #[arg(long)]
    typeset: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format_timestamp(None)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<DocConfig> {
    let mut config = match &args.config {
        Some(path) => DocConfig::load(path)?,
        None => DocConfig::default(),
    };
    if let Some(source_root) = &args.source_root {
        config.source_root = source_root.clone();
    }
    if let Some(translations) = &args.translations {
        config.translations = Some(translations.clone());
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = RunOptions {
        categories: args.categories.clone(),
        jobs: args.jobs,
        json: args.json.clone(),
        show_progress: args.verbose == 0,
    };
    let typesetter: Box<dyn Typesetter> = match &args.typeset {
        Some(command) => Box::new(CommandTypesetter::new(command.as_str())),
        None => Box::new(NoTypesetter),
    };

    match run(&config, &options, typesetter.as_ref()) {
        Ok(summary) => {
            info!("Wrote {} files to {}", summary.files.len(), config.output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
