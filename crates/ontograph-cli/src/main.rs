//! CLI entry point for the ontograph tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use ontograph_connector::RdfFormat;

use ontograph_cli::commands;
use ontograph_cli::config::{load_config, LogFormat};

#[derive(Parser)]
#[command(name = "ontograph")]
#[command(about = "Inspect, validate and convert ontologies with ordered lists")]
struct Cli {
    /// Config file prefix (default: ontograph).
    #[arg(short, long, default_value = "ontograph", global = true)]
    config: String,

    /// Input format override: rdfxml, turtle, ntriples, n3.
    #[arg(long, global = true)]
    from: Option<RdfFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report every structural conflict. Exits non-zero if any are found.
    Validate { file: PathBuf },

    /// Count triples, classes, individuals, properties, lists and prefixes.
    Stats { file: PathBuf },

    /// Print the members of a list, or of every list.
    List {
        file: PathBuf,
        label: Option<String>,
    },

    /// Re-serialize an ontology in another format.
    Convert {
        input: PathBuf,
        output: PathBuf,

        /// Output format (otherwise inferred from the output extension).
        #[arg(short, long)]
        format: Option<RdfFormat>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).pretty().init(),
    }

    let connector_config = &config.connector;
    match cli.command {
        Command::Validate { file } => {
            let connector = commands::open(&file, cli.from, connector_config)?;
            let report = commands::validate(&connector, &file);
            print_json(&report)?;
            if !report.valid {
                anyhow::bail!("{} structural conflict(s) found", report.conflicts.len());
            }
        }
        Command::Stats { file } => {
            let connector = commands::open(&file, cli.from, connector_config)?;
            print_json(&commands::stats(&connector))?;
        }
        Command::List { file, label } => {
            let connector = commands::open(&file, cli.from, connector_config)?;
            print_json(&commands::list(&connector, label.as_deref())?)?;
        }
        Command::Convert {
            input,
            output,
            format,
        } => {
            let report = commands::convert(&input, cli.from, &output, format, connector_config)?;
            print_json(&report)?;
        }
    }

    Ok(())
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
