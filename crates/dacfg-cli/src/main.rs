mod table;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dacfg_core::export_json;
use dacfg_store::{Experiment, SimCache, SimKey, default_host, load_experiment};

#[derive(Parser)]
#[command(name = "dacfg", about = "Compare and name data-assimilation experiment configurations")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the synthesized name of each configuration
    Names {
        /// Experiment file (TOML)
        file: PathBuf,

        /// Replace user-given names too
        #[arg(long)]
        overwrite: bool,

        /// Squeeze alignment padding out of the names
        #[arg(long)]
        no_pad: bool,
    },

    /// Print distinct attributes as a table, then the shared ones
    Table {
        /// Experiment file (TOML)
        file: PathBuf,
    },

    /// Print each configuration
    Show {
        /// Experiment file (TOML)
        file: PathBuf,
    },

    /// Export the comparison to a JSON file
    Export {
        /// Experiment file (TOML)
        file: PathBuf,

        /// Output file path
        out: PathBuf,
    },

    /// Print the simulation cache path of each configuration
    SimPath {
        /// Experiment file (TOML)
        file: PathBuf,

        /// Random seed of the simulation
        #[arg(long)]
        seed: u64,

        /// Host name in the cache key (defaults to $HOSTNAME)
        #[arg(long)]
        host: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Names {
            file,
            overwrite,
            no_pad,
        } => cmd_names(file, *overwrite, !*no_pad),
        Commands::Table { file } => cmd_table(file),
        Commands::Show { file } => cmd_show(file),
        Commands::Export { file, out } => cmd_export(file, out),
        Commands::SimPath { file, seed, host } => cmd_sim_path(file, *seed, host.as_deref()),
    }
}

fn open_experiment(file: &Path) -> Result<Experiment> {
    load_experiment(file).with_context(|| format!("failed to load {}", file.display()))
}

fn cmd_names(file: &Path, overwrite: bool, pad: bool) -> Result<()> {
    let mut cfgs = open_experiment(file)?.configs;
    cfgs.assign_names(overwrite, pad);
    tracing::debug!("assigned names to {} configs", cfgs.len());
    for record in cfgs.iter() {
        println!("{}", record.name().unwrap_or_default());
    }
    Ok(())
}

fn cmd_table(file: &Path) -> Result<()> {
    let cfgs = open_experiment(file)?.configs;
    println!("{}", table::render(&cfgs));
    Ok(())
}

fn cmd_show(file: &Path) -> Result<()> {
    let cfgs = open_experiment(file)?.configs;
    for record in cfgs.iter() {
        println!("{record}");
    }
    Ok(())
}

fn cmd_export(file: &Path, out: &Path) -> Result<()> {
    let cfgs = open_experiment(file)?.configs;
    let json = export_json(&cfgs.partition()).context("failed to serialize comparison")?;
    std::fs::write(out, &json).with_context(|| format!("failed to write {}", out.display()))?;
    println!("exported {} configs to {}", cfgs.len(), out.display());
    Ok(())
}

fn cmd_sim_path(file: &Path, seed: u64, host: Option<&str>) -> Result<()> {
    let Experiment { setup, configs } = open_experiment(file)?;
    let Some(setup) = setup else {
        bail!("{} has no [setup] section", file.display());
    };
    let host = host.map_or_else(default_host, str::to_string);
    let script = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");
    let cache = SimCache::from_env(script);

    let mut cfgs = configs;
    cfgs.assign_names(false, false);
    for record in cfgs.iter() {
        let key = SimKey::new(&setup, record.name().unwrap_or_default(), &host, seed);
        println!("{}", cache.path(&key).display());
    }
    Ok(())
}
