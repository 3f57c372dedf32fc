//! Project Catalog: per-project summaries of water-control child structures.
//!
//! A water-control project (a dam, a lock and dam, a reservoir) owns child
//! structures of five kinds: embankments, locks, outlets, turbines and gates.
//! Each kind lives in its own source relation with its own schema. This crate
//! reads the selected kinds for one office and folds them into one
//! [`ProjectChildren`](catalog::model::ProjectChildren) per project.
//!
//! # Guarantees
//!
//! - **One summary per project**: a project reported by several kinds is merged.
//! - **Deterministic order**: kinds are read in the fixed order EMBANKMENT, LOCK,
//!   OUTLET, TURBINE, GATE; a project is positioned by the first kind reporting it.
//! - **Absent, never empty**: a kind's list is omitted unless it has entries.
//! - **All or nothing**: any storage error fails the whole query.
//!
//! # Examples
//!
//! ```bash
//! # Create the catalog database under ./.catalog/
//! project-catalog init
//!
//! # Import rows
//! project-catalog load --file rows.json
//!
//! # Locks and outlets of every SPK project whose name contains "dam"
//! project-catalog children --office SPK --project-like dam --kinds "lock|outlet" --format json
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: storage access, configuration, errors, audit and logging
//! - [`catalog`]: kind registry, fetchers, aggregator and CLI surface

pub mod catalog;
pub mod core;

use crate::catalog::cli::{self as catalog_cli, ChildrenCli, KindsCli, LoadCli};
use crate::core::{db, error, logging, store::Store};

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(
    name = "project-catalog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Catalog of child structures for water-control projects"
)]
struct Cli {
    /// Project directory holding `.catalog/` (defaults to current working directory).
    #[clap(long, global = true)]
    root: Option<PathBuf>,
    /// Config file (defaults to `.catalog/catalog.toml`).
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging on stderr.
    #[clap(short, long, global = true)]
    verbose: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the catalog database and its relations
    Init,
    /// Import source rows from a JSON file
    Load(LoadCli),
    /// List the kinds a pattern selects
    Kinds(KindsCli),
    /// Build the per-project children summary
    Children(ChildrenCli),
    /// Print the version
    Version,
}

pub fn run() -> Result<(), error::CatalogError> {
    let Cli {
        root,
        config,
        verbose,
        command,
    } = Cli::parse();
    logging::init_logging(verbose);

    match command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
        }
        Command::Kinds(kinds_cli) => {
            catalog_cli::run_kinds_cli(kinds_cli)?;
        }
        Command::Init => {
            let store = open_store(root, config.as_deref())?;
            db::initialize_catalog_db(&store)?;
            println!(
                "Catalog database initialized at {}",
                db::catalog_db_path(&store).display()
            );
        }
        Command::Load(load_cli) => {
            let store = open_store(root, config.as_deref())?;
            db::initialize_catalog_db(&store)?;
            catalog_cli::run_load_cli(&store, load_cli)?;
        }
        Command::Children(children_cli) => {
            let store = open_store(root, config.as_deref())?;
            require_catalog_db(&store)?;
            catalog_cli::run_children_cli(&store, children_cli)?;
        }
    }
    Ok(())
}

fn open_store(root: Option<PathBuf>, config: Option<&Path>) -> Result<Store, error::CatalogError> {
    let project_root = match root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let store = Store::open(&project_root, config)?;
    tracing::debug!(root = %store.root.display(), "opened store");
    Ok(store)
}

fn require_catalog_db(store: &Store) -> Result<(), error::CatalogError> {
    let path = db::catalog_db_path(store);
    if !path.exists() {
        return Err(error::CatalogError::ValidationError(format!(
            "no catalog database at {}; run 'project-catalog init' first",
            path.display()
        )));
    }
    Ok(())
}
