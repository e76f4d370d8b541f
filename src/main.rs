//! vmodel CLI - Layered Velocity Model Editor
//!
//! Command-line interface for the vmodel layer-stack editor.

use anyhow::{bail, Context};
use clap::Parser;
use env_logger::Env;
use log::info;

use vmodel::cli::{commands, Cli, Commands};
use vmodel::model::{LayerSpec, MergeOptions};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("vmodel v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("vmodel v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Show { model } => {
            commands::show(&model).with_context(|| format!("showing {}", model.display()))
        }
        Commands::Reference {
            output,
            kind,
            database,
        } => commands::write_reference(&output, kind, database.as_deref())
            .context("writing reference model"),
        Commands::Insert {
            model,
            thickness,
            vs,
            vp,
            rho,
            top,
            output,
        } => {
            let mut spec = LayerSpec::new(vs);
            spec.vpv = vp;
            spec.rho = rho;
            commands::insert(&model, thickness, &spec, top, output.as_deref())
                .with_context(|| format!("inserting layer into {}", model.display()))
        }
        Commands::Perturb {
            model,
            param,
            fraction,
            zmin,
            zmax,
            output,
        } => commands::perturb(&model, param, fraction, zmin, zmax, output.as_deref())
            .with_context(|| format!("perturbing {} in {}", param, model.display())),
        Commands::MergeThin {
            model,
            threshold,
            max_layers,
            output,
        } => {
            let options = MergeOptions {
                thin_threshold_km: threshold,
                max_layers: max_layers.or(MergeOptions::default().max_layers),
            };
            commands::merge_thin(&model, &options, output.as_deref())
                .with_context(|| format!("merging thin layers in {}", model.display()))
        }
        Commands::Profile {
            model,
            param,
            zmin,
            zmax,
            json,
        } => commands::profile(&model, param, zmin, zmax, json)
            .with_context(|| format!("profiling {} in {}", param, model.display())),
        Commands::ApplyTable {
            model,
            table,
            output,
        } => commands::apply_table(&model, &table, output.as_deref())
            .with_context(|| format!("applying {} to {}", table.display(), model.display())),
        Commands::Snapshot { model, output } => commands::snapshot(&model, &output)
            .with_context(|| format!("snapshotting {}", model.display())),
        Commands::Restore { snapshot, output } => commands::restore(&snapshot, &output)
            .with_context(|| format!("restoring {}", snapshot.display())),
        Commands::Check { dir } => {
            let failed = commands::check(&dir)
                .with_context(|| format!("checking {}", dir.display()))?;
            if failed > 0 {
                bail!("{} model files failed validation", failed);
            }
            Ok(())
        }
    }
}
