//! Command-line surface: `clap` derive subcommands dispatching into the
//! library crate (§6, §10 ambient stack). No behavior lives only in the
//! binary; every branch here is a thin call into `xbps::*`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{Config, Verbosity};
use crate::error::{Error, Result};
use crate::humanize::humanize;
use crate::index::IndexDocument;
use crate::resolve::RankedRepo;
use crate::{indexer, integrity, orphan, plist, registry, repo, resolve, transaction};

/// Top-level command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "xbps-bin", about = "Binary package manager core")]
pub struct Cli {
    /// Target installation root (`-r`). Defaults to `/`.
    #[arg(short = 'r', long = "root", global = true)]
    root: Option<PathBuf>,

    /// Increase logging verbosity; may be given more than once (`-v`, `-vv`).
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Skip confirmations and reverse-dependency warnings (`-f`).
    #[arg(short = 'f', long = "force", global = true)]
    force: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// One subcommand from the CLI surface table (§6).
#[derive(Debug, Subcommand)]
enum Command {
    /// Print installed packages.
    List,
    /// Resolve a plan for `name` and execute it.
    Install {
        /// Package name, optionally with a version constraint (e.g. `foo>=1.0`).
        name: String,
    },
    /// Resolve an upgrade-only plan for `name` and execute it.
    Update {
        /// Package name.
        name: String,
    },
    /// Remove a package, keeping its configuration files.
    Remove {
        /// Package name.
        name: String,
    },
    /// Fully remove a package, or every installed package.
    Purge {
        /// Package name, or the literal `all`.
        target: String,
    },
    /// Re-run the post-install script for a package, or every installed package.
    Reconfigure {
        /// Package name, or the literal `all`.
        target: String,
    },
    /// Print one package's descriptor.
    Show {
        /// Package name.
        name: String,
    },
    /// Print one package's file manifest.
    Files {
        /// Package name.
        name: String,
    },
    /// Re-hash a package's files, or every installed package's files, against
    /// the recorded manifest.
    Check {
        /// Package name, or the literal `all`.
        target: String,
    },
    /// Upgrade every package with a newer version available.
    Autoupdate,
    /// Remove every automatically installed package no longer required.
    Autoremove,
    /// Maintain the repository list.
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },
    /// Run the repository index builder over a directory.
    Index {
        /// Directory to scan.
        dir: PathBuf,
        /// Architecture tag used to pick the arch-specific subdirectory.
        #[arg(long, default_value = "x86_64")]
        arch: String,
    },
}

/// `repo add|remove|list` actions.
#[derive(Debug, Subcommand)]
enum RepoAction {
    /// Register a repository.
    Add {
        /// Repository URI or local path.
        uri: String,
    },
    /// Unregister a repository.
    Remove {
        /// Repository URI or local path.
        uri: String,
    },
    /// Print every registered repository.
    List,
}

/// What: Parse `argv`-style arguments into a [`Cli`].
///
/// Details:
/// - Delegates entirely to `clap`'s derive-generated parser; kept as a thin
///   wrapper so callers never need to name the `clap` crate directly.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// What: Resolve the [`Config`] this invocation runs under.
#[must_use]
pub fn config(cli: &Cli) -> Config {
    Config::builder()
        .root(cli.root.clone().unwrap_or_else(|| PathBuf::from("/")))
        .verbosity(Verbosity::from_count(cli.verbose))
        .force(cli.force)
        .build()
}

/// What: Load every registered repository's index, in priority order.
///
/// Details:
/// - A repository whose `pkg-index.plist` has not been built yet is treated as
///   empty rather than a hard error, matching the builder/autoremove
///   tolerate-and-continue recovery policy (§7).
fn load_ranked_repos(root: &Path) -> Result<Vec<RankedRepo>> {
    let list = repo::load(root)?;
    list.repositories
        .iter()
        .map(|uri| {
            let dir = Path::new(uri);
            let index_path = indexer::index_path(dir);
            let document = if index_path.exists() {
                IndexDocument::from_node(&plist::load(&index_path)?)?
            } else {
                tracing::warn!(uri, "repository has no index yet");
                IndexDocument::new(uri.clone())
            };
            Ok((uri.clone(), document))
        })
        .collect()
}

/// What: Execute one parsed [`Cli`] invocation end-to-end.
///
/// Output:
/// - `Ok(())` on success.
/// - Any [`Error`] the underlying operation returns; the caller (the binary's
///   `main`) maps it to a process exit code via [`Error::exit_code`].
pub fn run(cli: &Cli) -> Result<()> {
    let config = config(cli);
    let root = config.root().path();

    match &cli.command {
        Command::List => {
            let handle = registry::RegistryHandle::prepare(root)?;
            for pkg in &handle.document.packages {
                println!("{} {} [{}]", pkg.pkgname(), pkg.descriptor.version, pkg.state);
            }
        }
        Command::Install { name } => {
            let repos = load_ranked_repos(root)?;
            let mut handle = registry::RegistryHandle::prepare(root)?;
            let plan = resolve::resolve(name, &repos, &handle.document)?;
            transaction::apply(root, &mut handle.document, &plan)?;
            handle.flush()?;
        }
        Command::Update { name } => {
            let repos = load_ranked_repos(root)?;
            let mut handle = registry::RegistryHandle::prepare(root)?;
            let plan = resolve::resolve(name, &repos, &handle.document)?;
            for step in plan.steps.iter().filter(|s| s.is_executable()) {
                if let crate::types::Step::Upgrade { descriptor_new, source_repo, .. } = step {
                    transaction::upgrade(root, &mut handle.document, descriptor_new, source_repo)?;
                }
            }
            handle.flush()?;
        }
        Command::Remove { name } => {
            let mut handle = registry::RegistryHandle::prepare(root)?;
            transaction::remove(root, &mut handle.document, name, false)?;
            handle.flush()?;
        }
        Command::Purge { target } => {
            let mut handle = registry::RegistryHandle::prepare(root)?;
            if target == "all" {
                let names: Vec<String> = handle.document.packages.iter().map(|p| p.pkgname().to_string()).collect();
                for name in names {
                    transaction::remove(root, &mut handle.document, &name, true)?;
                }
            } else {
                transaction::remove(root, &mut handle.document, target, true)?;
            }
            handle.flush()?;
        }
        Command::Reconfigure { target } => {
            let mut handle = registry::RegistryHandle::prepare(root)?;
            if target == "all" {
                let names: Vec<String> = handle.document.packages.iter().map(|p| p.pkgname().to_string()).collect();
                for name in names {
                    transaction::reconfigure(root, &mut handle.document, &name)?;
                }
            } else {
                transaction::reconfigure(root, &mut handle.document, target)?;
            }
            handle.flush()?;
        }
        Command::Show { name } => {
            let handle = registry::RegistryHandle::prepare(root)?;
            let pkg = handle
                .document
                .packages
                .iter()
                .find(|p| p.pkgname() == name)
                .ok_or_else(|| Error::NotFound(name.clone()))?;
            println!("pkgname: {}", pkg.descriptor.pkgname);
            println!("version: {}", pkg.descriptor.version);
            println!("short_desc: {}", pkg.descriptor.short_desc);
            println!("architecture: {}", pkg.descriptor.architecture);
            println!("state: {}", pkg.state);
            if let Some(size) = pkg.descriptor.filename_size {
                println!("size: {}", render_size(size));
            }
        }
        Command::Files { name } => {
            let handle = registry::RegistryHandle::prepare(root)?;
            let pkg = handle
                .document
                .packages
                .iter()
                .find(|p| p.pkgname() == name)
                .ok_or_else(|| Error::NotFound(name.clone()))?;
            for file in &pkg.files {
                println!("{}", file.path);
            }
        }
        Command::Check { target } => {
            let handle = registry::RegistryHandle::prepare(root)?;
            let reports = if target == "all" {
                integrity::check_all(root, &handle.document)
            } else {
                let pkg = handle
                    .document
                    .packages
                    .iter()
                    .find(|p| p.pkgname() == target)
                    .ok_or_else(|| Error::NotFound(target.clone()))?;
                vec![integrity::check_package(root, pkg.pkgname(), &pkg.files)]
            };
            for report in &reports {
                for (path, status) in report.failures() {
                    println!("{}: {path}: {status:?}", report.pkgname);
                }
            }
        }
        Command::Autoupdate => {
            let repos = load_ranked_repos(root)?;
            let mut handle = registry::RegistryHandle::prepare(root)?;
            let names: Vec<String> = handle.document.packages.iter().map(|p| p.pkgname().to_string()).collect();
            for name in names {
                let plan = resolve::resolve(&name, &repos, &handle.document)?;
                for step in plan.steps.iter().filter(|s| s.is_executable()) {
                    if let crate::types::Step::Upgrade { descriptor_new, source_repo, .. } = step {
                        transaction::upgrade(root, &mut handle.document, descriptor_new, source_repo)?;
                    }
                }
            }
            handle.flush()?;
        }
        Command::Autoremove => {
            let mut handle = registry::RegistryHandle::prepare(root)?;
            // `orphan::detect` already iterates to a fixed point internally
            // (simulating each round's removal against a working copy), so
            // the returned set is the full transitive closure in one pass;
            // removing it a second time would hand `transaction::remove`
            // packages already left `CONFIG_FILES` by the first pass.
            let orphans = orphan::detect(&handle.document);
            for name in orphans {
                transaction::remove(root, &mut handle.document, &name, false)?;
            }
            handle.flush()?;
        }
        Command::Repo { action } => match action {
            RepoAction::Add { uri } => repo::register(root, uri)?,
            RepoAction::Remove { uri } => repo::unregister(root, uri)?,
            RepoAction::List => {
                let list = repo::load(root)?;
                for uri in &list.repositories {
                    println!("{uri}");
                }
            }
        },
        Command::Index { dir, arch } => {
            let summary = indexer::build(dir, arch)?;
            println!("updated {} skipped {}", summary.updated, summary.skipped);
        }
    }
    Ok(())
}

/// What: Render a byte size for `show`/`list -s` style output.
///
/// Details:
/// - Thin re-export of [`crate::humanize::humanize`] so CLI call sites don't
///   need to name the `humanize` module directly.
#[must_use]
pub fn render_size(bytes: u64) -> String {
    humanize(bytes)
}
