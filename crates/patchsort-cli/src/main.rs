//! Command-line interface for the `patchsort` state-space patch sorter.
//!
//! Two subcommands: `sort` orders a JSON Patch against a current
//! configuration and schema catalog into individually-valid sub-patches;
//! `validate` only runs the schema/reference check a target configuration
//! would have to pass before sorting is attempted.

use std::fs;
use std::path::{Path as FsPath, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use patchsort_core::schema::{Catalog, SchemaDescription};
use patchsort_core::{AlgorithmKind, NonStrictPatchSorter, SchemaOracle, SorterOptions, StrictPatchSorter};

#[derive(Debug, Parser)]
#[command(name = "patchsort", about = "Order a JSON Patch into individually-valid sub-patches.", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Order a patch into a sequence of individually-valid sub-patches.
    Sort {
        /// Path to the current configuration, as JSON.
        #[arg(long)]
        current: PathBuf,
        /// Path to the JSON Patch (RFC 6902) to apply.
        #[arg(long)]
        patch: PathBuf,
        /// Path to a schema description (see `SchemaDescription`), as JSON.
        #[arg(long)]
        schema: PathBuf,
        /// Reject the patch if it touches any table the schema doesn't know about.
        #[arg(long)]
        strict: bool,
        /// Search strategy.
        #[arg(long, value_enum, default_value_t = CliAlgorithm::Dfs)]
        algorithm: CliAlgorithm,
        /// Maximum number of diffs the search may visit before giving up.
        #[arg(long, default_value_t = 50_000)]
        max_nodes: usize,
    },
    /// Validate a configuration against a schema description.
    Validate {
        /// Path to the configuration to validate, as JSON.
        #[arg(long)]
        config: PathBuf,
        /// Path to a schema description, as JSON.
        #[arg(long)]
        schema: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAlgorithm {
    Dfs,
    Bfs,
    Memoization,
}

impl From<CliAlgorithm> for AlgorithmKind {
    fn from(value: CliAlgorithm) -> Self {
        match value {
            CliAlgorithm::Dfs => AlgorithmKind::Dfs,
            CliAlgorithm::Bfs => AlgorithmKind::Bfs,
            CliAlgorithm::Memoization => AlgorithmKind::Memoization,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    match Cli::parse().command {
        Command::Sort { current, patch, schema, strict, algorithm, max_nodes } => {
            sort(&current, &patch, &schema, strict, algorithm.into(), max_nodes)
        }
        Command::Validate { config, schema } => validate(&config, &schema),
    }
}

fn read_json(path: &FsPath) -> Result<serde_json::Value> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {} as JSON", path.display()))
}

fn read_catalog(path: &FsPath) -> Result<Catalog> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let description: SchemaDescription =
        serde_json::from_str(&raw).with_context(|| format!("parsing {} as a schema description", path.display()))?;
    description.into_catalog().with_context(|| format!("building catalog from {}", path.display()))
}

fn sort(
    current_path: &FsPath,
    patch_path: &FsPath,
    schema_path: &FsPath,
    strict: bool,
    algorithm: AlgorithmKind,
    max_nodes: usize,
) -> Result<()> {
    let current = read_json(current_path)?;
    let patch_value = read_json(patch_path)?;
    let patch: json_patch::Patch =
        serde_json::from_value(patch_value).context("patch file did not contain a JSON Patch array")?;
    let catalog = read_catalog(schema_path)?;
    let options = SorterOptions::default().with_algorithm(algorithm).with_max_nodes(max_nodes)?;

    let output = if strict {
        let ops = StrictPatchSorter::new().sort(&current, &patch, &catalog, &options)?;
        serde_json::to_value(ops)?
    } else {
        let changes = NonStrictPatchSorter::new().sort(&current, &patch, &catalog, &options)?;
        serde_json::to_value(changes)?
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn validate(config_path: &FsPath, schema_path: &FsPath) -> Result<()> {
    let config = read_json(config_path)?;
    let catalog = read_catalog(schema_path)?;
    if catalog.validate_config(&config) {
        println!("valid");
        Ok(())
    } else {
        println!("invalid");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_algorithm_maps_onto_algorithm_kind() {
        assert_eq!(AlgorithmKind::from(CliAlgorithm::Bfs), AlgorithmKind::Bfs);
    }
}
