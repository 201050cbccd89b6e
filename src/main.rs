//! # EAD Indexer CLI (`ead-indexer`)
//!
//! ## Usage
//!
//! ```bash
//! SOLR_ORIGIN_WITH_PORT=http://localhost:8983 ead-indexer [--config ead-indexer.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ead-indexer index file <PATH>` | Replace one finding aid in the index |
//! | `ead-indexer index file <PATH> --dry-run` | Extract and print counts, send nothing |
//! | `ead-indexer index commit <REPO> <COMMIT>` | Apply the EAD changes of one git commit |
//! | `ead-indexer delete <EADID>` | Remove a finding aid and its components |
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); summaries go to stdout.

use clap::{Parser, Subcommand};
use ead_indexer::changeset::index_commit;
use ead_indexer::config::{self, Config};
use ead_indexer::pipeline::{index_file, prepare_file};
use ead_indexer::report::{ErrorKind, ErrorReport};
use ead_indexer::solr::SolrClient;
use ead_indexer::transaction::{delete_collection, RetryPolicy};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// EAD Indexer: load EAD finding aids into a Solr core.
#[derive(Parser)]
#[command(
    name = "ead-indexer",
    about = "Index EAD finding aids into Solr",
    version,
    long_about = "Extracts a collection document and one document per component from each \
    EAD file and replaces them in a Solr core as a single delete/add/commit transaction. \
    Works on a single file or on the EAD files touched by a git commit."
)]
struct Cli {
    /// Path to a configuration file (TOML).
    ///
    /// Optional. Every setting has a default; see the `config` module.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index EAD files.
    Index {
        #[command(subcommand)]
        target: IndexTarget,
    },

    /// Remove a finding aid and all of its components from the index.
    Delete {
        /// EADID of the collection.
        ead_id: String,
    },
}

#[derive(Subcommand)]
enum IndexTarget {
    /// Index one EAD file.
    ///
    /// The file must sit in a partner directory (`<partner>/<eadid>.xml`);
    /// the directory name becomes the repository code.
    File {
        /// Path to the EAD file.
        path: PathBuf,

        /// Extract only. Prints document counts without contacting Solr.
        #[arg(long)]
        dry_run: bool,
    },

    /// Index the EAD files added, changed, or deleted by a git commit.
    Commit {
        /// Path to the git repository.
        repo: PathBuf,

        /// Commit to apply (any revision git understands).
        commit: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    // Dry runs never need the backend
    if let Commands::Index {
        target: IndexTarget::File {
            path,
            dry_run: true,
        },
    } = &cli.command
    {
        let prepared = prepare_file(path)?;
        println!("index file {} (dry run)", path.display());
        println!("  eadid:       {}", prepared.ead_id);
        println!("  repository:  {}", prepared.repository_code);
        println!("  components:  {}", prepared.component_count());
        println!("  documents:   {}", prepared.payloads.len());
        println!("  warnings:    {}", prepared.warnings.len());
        println!("ok");
        return Ok(());
    }

    let origin = config::solr_origin()?;
    let client = SolrClient::new(&origin, &cfg.solr)?;
    let policy = RetryPolicy::from_config(&cfg.solr);
    tracing::debug!(url = %client.update_url(), "using Solr update endpoint");

    match cli.command {
        Commands::Index { target } => match target {
            IndexTarget::File { path, .. } => run_index_file(&client, &path, &policy).await,
            IndexTarget::Commit { repo, commit } => {
                run_index_commit(&client, &cfg, &repo, &commit, &policy).await
            }
        },
        Commands::Delete { ead_id } => run_delete(&client, &ead_id, &policy).await,
    }
}

async fn run_delete(client: &SolrClient, ead_id: &str, policy: &RetryPolicy) -> anyhow::Result<()> {
    println!("delete {}", ead_id);
    match delete_collection(client, ead_id, policy).await {
        Ok(transaction) => {
            println!("  requests:    {}", transaction.requests());
            println!("ok");
            Ok(())
        }
        Err(e) => {
            let mut report = ErrorReport::new();
            report.push(ead_id, ErrorKind::Transaction, &e);
            fail(report)
        }
    }
}

async fn run_index_file(
    client: &SolrClient,
    path: &std::path::Path,
    policy: &RetryPolicy,
) -> anyhow::Result<()> {
    println!("index file {}", path.display());
    match index_file(client, path, policy).await {
        Ok(indexed) => {
            println!("  eadid:       {}", indexed.transaction.ead_id);
            println!("  documents:   {}", indexed.transaction.adds);
            println!("  requests:    {}", indexed.transaction.requests());
            println!("  warnings:    {}", indexed.warnings.len());
            println!("ok");
            Ok(())
        }
        Err(e) => {
            let mut report = ErrorReport::new();
            report.push(path.display().to_string(), e.kind(), &e);
            fail(report)
        }
    }
}

async fn run_index_commit(
    client: &SolrClient,
    cfg: &Config,
    repo: &std::path::Path,
    commit: &str,
    policy: &RetryPolicy,
) -> anyhow::Result<()> {
    let ead_files = cfg.repository.ead_matcher()?;
    println!("index commit {} in {}", commit, repo.display());

    let changes = match index_commit(client, repo, commit, &ead_files, policy).await {
        Ok(changes) => changes,
        Err(e) => {
            let mut report = ErrorReport::new();
            report.push(repo.display().to_string(), ErrorKind::ChangeSet, &e);
            return fail(report);
        }
    };

    println!("  commit:      {}", changes.commit);
    println!("  files:       {}", changes.entries.len());
    println!("  indexed:     {}", changes.indexed);
    println!("  deleted:     {}", changes.deleted);
    println!("  skipped:     {}", changes.skipped);
    println!("  failed:      {}", changes.errors.len());

    if !changes.is_success() {
        let mut report = ErrorReport::new();
        changes.record_failures(&mut report);
        return fail(report);
    }

    println!("ok");
    Ok(())
}

fn fail(report: ErrorReport) -> anyhow::Result<()> {
    eprint!("{}", report.render());
    anyhow::bail!("{} failure(s)", report.len())
}
