//! Project automation tasks.
//!
//! Run via `cargo xtask <command>`.

use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

/// Library crate every task operates on.
const CRATE: &str = "multihist";

/// Command line interface for the `xtask` helper.
#[derive(Debug, Parser)]
#[command(name = "xtask")]
struct Cli {
    /// Task to run.
    #[command(subcommand)]
    command: CommandName,
}

/// Supported automation commands.
#[derive(Debug, Subcommand)]
enum CommandName {
    /// Format the workspace and run the linter.
    Tidy,
    /// Run tests using cargo nextest, then the doctests.
    Test,
    /// Run criterion benchmarks.
    Bench {
        /// Bench target to run (`fill` or `indexing`); all when omitted.
        target: Option<String>,
        /// Only run benchmarks whose id contains this filter.
        #[arg(long)]
        filter: Option<String>,
    },
    /// Build the API documentation with warnings denied.
    Doc,
    /// Run tidy, test and doc in sequence.
    Ci,
}

/// Common repository paths computed relative to the `xtask` crate.
#[derive(Debug, Clone)]
struct RepoPaths {
    /// Repository root directory.
    root: PathBuf,
    /// Bench sources of the library crate.
    benches: PathBuf,
}

impl RepoPaths {
    /// Discover repository paths from `CARGO_MANIFEST_DIR`.
    fn discover() -> Result<Self> {
        let xtask_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let root = xtask_dir
            .parent()
            .context("xtask crate must live at <repo>/xtask")?
            .to_path_buf();

        Ok(Self {
            benches: root.join("crates").join(CRATE).join("benches"),
            root,
        })
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

/// Dispatch the selected `xtask` command.
fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = RepoPaths::discover()?;

    match cli.command {
        CommandName::Tidy => tidy(&paths),
        CommandName::Test => test(&paths),
        CommandName::Bench { target, filter } => bench(&paths, target.as_deref(), filter),
        CommandName::Doc => doc(&paths),
        CommandName::Ci => {
            tidy(&paths)?;
            test(&paths)?;
            doc(&paths)
        }
    }
}

/// Run `cargo fmt` and the workspace linter.
fn tidy(paths: &RepoPaths) -> Result<()> {
    format_workspace(paths)?;
    lint_workspace(paths)?;
    format_workspace(paths)?;
    Ok(())
}

/// Run tests using cargo nextest. Nextest skips doctests, so run them after.
fn test(paths: &RepoPaths) -> Result<()> {
    let sh = repo_shell(paths)?;
    cmd!(sh, "cargo nextest run --all").run()?;
    cmd!(sh, "cargo test --doc -p {CRATE}").run()?;
    Ok(())
}

/// Run one or all criterion bench targets.
fn bench(paths: &RepoPaths, target: Option<&str>, filter: Option<String>) -> Result<()> {
    let sh = repo_shell(paths)?;
    let targets = match target {
        Some(name) => {
            let known = bench_targets(&paths.benches)?;
            if !known.iter().any(|t| t == name) {
                anyhow::bail!("unknown bench target {name}; expected one of {known:?}");
            }
            vec![name.to_string()]
        }
        None => bench_targets(&paths.benches)?,
    };

    let filter: Vec<String> = filter.into_iter().collect();
    for target in targets {
        println!("Running bench {target} ...");
        let filter = &filter;
        cmd!(sh, "cargo bench -p {CRATE} --bench {target} -- {filter...}").run()?;
    }
    Ok(())
}

/// Build rustdoc for the library, failing on broken links and missing docs.
fn doc(paths: &RepoPaths) -> Result<()> {
    let sh = repo_shell(paths)?;
    let _env = sh.push_env("RUSTDOCFLAGS", "-D warnings");
    cmd!(sh, "cargo doc --no-deps -p {CRATE}").run()?;
    Ok(())
}

/// Format the Rust workspace using rustfmt.
fn format_workspace(paths: &RepoPaths) -> Result<()> {
    let sh = repo_shell(paths)?;

    let config = paths.root.join("rustfmt-nightly.toml");
    if config.is_file() {
        cmd!(sh, "cargo +nightly fmt --all -- --config-path {config}").run()?;
        return Ok(());
    }

    cmd!(sh, "cargo +nightly fmt --all").run()?;
    Ok(())
}

/// Run clippy across the workspace, applying safe fixes.
fn lint_workspace(paths: &RepoPaths) -> Result<()> {
    let sh = repo_shell(paths)?;
    cmd!(
        sh,
        "cargo clippy -q --fix --all --all-targets --all-features --allow-dirty --tests --benches"
    )
    .run()?;
    Ok(())
}

/// Create a verbose shell rooted at the repository root.
fn repo_shell(paths: &RepoPaths) -> Result<Shell> {
    let sh = Shell::new()?;
    sh.change_dir(&paths.root);
    Ok(sh)
}

/// Names of the bench targets, taken from the `.rs` files in `dir`, sorted.
fn bench_targets(dir: &Path) -> Result<Vec<String>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read directory entry in {}", dir.display()))?
            .path();
        if path.extension().is_some_and(|ext| ext == "rs")
            && let Some(stem) = path.file_stem()
        {
            names.push(stem.to_string_lossy().into_owned());
        }
    }

    names.sort();
    Ok(names)
}
