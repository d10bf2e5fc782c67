//! graphical CLI - compute and export built-in formulas

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use graphical::prelude::*;
use graphical::{builtin, from_json, write_export, CatalogEntry};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "graphical")]
#[command(author, version, about = "Compute geometric and custom formulas")]
struct Cli {
    /// Never use the accelerated integer backend
    #[arg(long, global = true)]
    no_accel: bool,

    /// Log backend decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in formulas
    List,

    /// Compute a built-in formula
    Compute {
        /// Formula id (from `list`), English name or Chinese name
        formula: String,

        /// Arguments as KEY VALUE pairs
        #[arg(value_name = "KEY VALUE", allow_hyphen_values = true)]
        pairs: Vec<String>,
    },

    /// Read one accessor of a built-in shape
    Shape {
        /// Shape name, English or Chinese
        shape: String,

        /// Accessor, e.g. area or 面积
        accessor: String,

        /// Arguments as KEY VALUE pairs
        #[arg(value_name = "KEY VALUE", allow_hyphen_values = true)]
        pairs: Vec<String>,
    },

    /// Export the serializable built-in formulas as JSON
    Export {
        /// Output file, or - for stdout
        #[arg(short, long, default_value = "graphical.json")]
        output: PathBuf,
    },

    /// Load a formula from a JSON record and compute it
    Load {
        /// JSON file holding one formula record
        input: PathBuf,

        /// Arguments as KEY VALUE pairs
        #[arg(value_name = "KEY VALUE", allow_hyphen_values = true)]
        pairs: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let engine = if cli.no_accel {
        Engine::without_acceleration()
    } else {
        Engine::new(EngineOptions::from_env())
    };

    match cli.command {
        Commands::List => list_formulas(),
        Commands::Compute { formula, pairs } => compute_formula(&engine, &formula, &pairs),
        Commands::Shape {
            shape,
            accessor,
            pairs,
        } => read_shape(engine, &shape, &accessor, &pairs),
        Commands::Export { output } => export(&output),
        Commands::Load { input, pairs } => load(&engine, &input, &pairs),
    }
}

/// Pair up KEY VALUE tokens; values are bound as text
fn parse_pairs(pairs: &[String]) -> Result<Arguments> {
    if pairs.len() % 2 != 0 {
        bail!(
            "Arguments must come in KEY VALUE pairs, got {} tokens",
            pairs.len()
        );
    }
    Ok(pairs
        .chunks(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect())
}

fn find_formula(formula: &str) -> Result<&'static CatalogEntry> {
    let catalog = builtin().context("Failed to build the built-in catalogue")?;
    let entry = match formula.parse::<usize>() {
        Ok(id) => catalog.by_id(id),
        Err(_) => catalog.formula(formula),
    };
    entry.with_context(|| format!("Unknown formula '{}'", formula))
}

fn list_formulas() -> Result<()> {
    let catalog = builtin().context("Failed to build the built-in catalogue")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for entry in catalog.formulas() {
        let parameters = entry
            .definition
            .parameters()
            .map(|p| p.externals().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        writeln!(
            out,
            "{:>3}  {}  ({})  [{}]",
            entry.id, entry.display_name, entry.name, parameters
        )?;
    }
    Ok(())
}

fn compute_formula(engine: &Engine, formula: &str, pairs: &[String]) -> Result<()> {
    let entry = find_formula(formula)?;
    let arguments = parse_pairs(pairs)?;
    let instance = entry
        .definition
        .instantiate_with(engine, &arguments)
        .with_context(|| format!("Failed to compute '{}'", entry.name))?;
    println!("{}", instance);
    Ok(())
}

fn read_shape(engine: Engine, shape: &str, accessor: &str, pairs: &[String]) -> Result<()> {
    let catalog = builtin().context("Failed to build the built-in catalogue")?;
    let shape = catalog
        .shape(shape)
        .with_context(|| format!("Unknown shape '{}'", shape))?;
    let bundle = shape
        .bundle_type
        .construct_with(engine, parse_pairs(pairs)?);
    let value = bundle
        .get(accessor)
        .with_context(|| format!("Failed to read '{}' of '{}'", accessor, shape.name))?;
    println!("{}", value);
    Ok(())
}

fn export(output: &Path) -> Result<()> {
    let catalog = builtin().context("Failed to build the built-in catalogue")?;
    if output == Path::new("-") {
        let stdout = io::stdout();
        write_export(catalog, stdout.lock()).context("Failed to write export")?;
        println!();
        return Ok(());
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to create '{}'", output.display()))?;
    let mut writer = BufWriter::new(file);
    write_export(catalog, &mut writer)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write '{}'", output.display()))?;
    eprintln!("Exported to {}", output.display());
    Ok(())
}

fn load(engine: &Engine, input: &Path, pairs: &[String]) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;
    let definition =
        from_json(&text).with_context(|| format!("Invalid formula record in '{}'", input.display()))?;
    let instance = definition
        .instantiate_with(engine, &parse_pairs(pairs)?)
        .with_context(|| format!("Failed to compute '{}'", definition.name()))?;
    println!("{}", instance);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let pairs: Vec<String> = ["a", "2", "b", "3"].iter().map(|s| s.to_string()).collect();
        let arguments = parse_pairs(&pairs).unwrap();
        assert_eq!(arguments.len(), 2);
        assert_eq!(arguments.get("b").map(|v| v.to_string()), Some("3".to_string()));
    }

    #[test]
    fn test_parse_pairs_odd() {
        let pairs = vec!["a".to_string()];
        assert!(parse_pairs(&pairs).is_err());
    }

    #[test]
    fn test_find_formula() {
        assert_eq!(find_formula("1").unwrap().name, "square_area");
        assert_eq!(find_formula("圆形面积").unwrap().name, "circle_area");
        assert!(find_formula("99").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["graphical", "--no-accel", "compute", "2", "a", "5"]).unwrap();
        assert!(cli.no_accel);
        assert!(matches!(cli.command, Commands::Compute { ref pairs, .. } if pairs.len() == 2));
    }
}
