//! docspec CLI
//!
//! Usage:
//!   docspec generate [OPTIONS]          Render the sample specs
//!   docspec query <SOURCE_MAP> [QUERY]  Look up components in a source map
//!   docspec diff <DIR>                  Compare the two newest structured documents

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use docspec::{samples, Aggregator, Config, SourceMap, SpecError};

#[derive(Parser)]
#[command(name = "docspec")]
#[command(about = "Render specification documents from typed declarations")]
struct Cli {
    /// Log each step to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render sample specs as text, or write the structured document
    Generate {
        /// Sample namespaces to include (tictactoe, bank, cmdline); all by default
        #[arg(short, long = "sample")]
        samples: Vec<String>,

        /// Write the structured document and source map instead of printing text
        #[arg(long)]
        xml: bool,

        /// Output directory for structured documents
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Workspace searched for candidate source locations
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Configuration file (TOML format)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Wrap each plain render in a source reference marker
        #[arg(long)]
        annotate: bool,
    },

    /// Look up components in a source map
    Query {
        /// Path to source_map.json
        source_map: PathBuf,

        /// Case-insensitive component name fragment
        query: Option<String>,

        /// List every component name
        #[arg(short, long)]
        list: bool,
    },

    /// Summarize changes between the two newest structured documents
    Diff {
        /// Directory holding spec-*.xml documents
        dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("docspec=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docspec=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Generate {
            samples,
            xml,
            out,
            workspace,
            config,
            annotate,
        } => generate(&samples, xml, out, workspace, config.as_deref(), annotate),
        Command::Query {
            source_map,
            query,
            list,
        } => run_query(&source_map, query.as_deref(), list),
        Command::Diff { dir } => run_diff(&dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e.report());
        std::process::exit(1);
    }
}

fn generate(
    names: &[String],
    xml: bool,
    out: Option<PathBuf>,
    workspace: Option<PathBuf>,
    config_path: Option<&Path>,
    annotate: bool,
) -> Result<(), SpecError> {
    let mut config = match config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = out {
        config = config.with_output_dir(dir);
    }
    if let Some(root) = workspace {
        config = config.with_workspace(root);
    }
    if annotate {
        config = config.with_annotate_sources(true);
    }

    let registry = if names.is_empty() {
        samples::registry_all()?
    } else {
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        samples::registry(&names)?
    };
    debug!(namespaces = registry.namespaces().len(), "registered samples");

    let aggregator = Aggregator::with_config(&registry, config);
    if !xml {
        print!("{}", aggregator.generate_text()?);
        return Ok(());
    }

    let dir = aggregator.config().output.directory.clone();
    let workspace = aggregator.config().index.workspace.clone();
    let xml_path = aggregator.write_xml(&dir)?;
    let map_path = aggregator.write_source_map(&dir, &xml_path, workspace.as_deref())?;
    println!("{}", xml_path.display());
    println!("{}", map_path.display());
    Ok(())
}

fn run_query(path: &Path, query: Option<&str>, list: bool) -> Result<(), SpecError> {
    let map = SourceMap::load(path)?;

    let Some(query) = query.filter(|_| !list) else {
        for component in map.components() {
            println!("{}", component);
        }
        return Ok(());
    };

    let found = map.search(query);
    if found.is_empty() {
        println!("No components matching '{}'.", query);
        return Ok(());
    }
    for (i, entry) in found.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", entry);
    }
    Ok(())
}

fn run_diff(dir: &Path) -> Result<(), SpecError> {
    match docspec::diff::diff_latest(dir)? {
        Some((older, newer, report)) => {
            println!("Comparing {} -> {}", older.display(), newer.display());
            println!();
            print!("{}", report);
        }
        None => println!("Need at least two structured documents in {}.", dir.display()),
    }
    Ok(())
}
