//! CLI Module
//!
//! Command-line interface for inspecting and editing layered velocity models.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::{ModelKind, Parameter};

/// Layered 1-D earth velocity model editor
#[derive(Parser, Debug)]
#[command(name = "vmodel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the header and layers of a model file
    #[command(name = "show")]
    Show {
        /// Model file
        model: PathBuf,
    },

    /// Write a reference model (built-in AK135 or a 10-column database)
    #[command(name = "reference")]
    Reference {
        /// Output model file
        output: PathBuf,

        /// Layer kind: ISOTROPIC (ISO) or TRANSVERSE ISOTROPIC (TI)
        #[arg(short, long, default_value = "ISO")]
        kind: ModelKind,

        /// Reference database to load instead of AK135
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Insert a layer, splitting any layers it overlaps
    #[command(name = "insert")]
    Insert {
        /// Model file
        model: PathBuf,

        /// Layer thickness (km)
        #[arg(long)]
        thickness: f64,

        /// S velocity (km/s); vsv for transverse-isotropic models
        #[arg(long)]
        vs: f64,

        /// P velocity (km/s); derived from vs when omitted
        #[arg(long)]
        vp: Option<f64>,

        /// Density (g/cm^3); derived from vp when omitted
        #[arg(long)]
        rho: Option<f64>,

        /// Top depth (km); appended below the model when omitted
        #[arg(long, allow_negative_numbers = true)]
        top: Option<f64>,

        /// Output file (defaults to editing the model in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scale one parameter by (1 + fraction) over a depth range
    #[command(name = "perturb")]
    Perturb {
        /// Model file
        model: PathBuf,

        /// Parameter name, e.g. vs, vpv, rho
        #[arg(short, long)]
        param: Parameter,

        /// Relative change in [-1, 1]
        #[arg(short, long, allow_negative_numbers = true)]
        fraction: f64,

        /// Top of the range (km)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        zmin: f64,

        /// Bottom of the range (km), exclusive
        #[arg(long, default_value_t = f64::INFINITY, allow_negative_numbers = true)]
        zmax: f64,

        /// Output file (defaults to editing the model in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge thin layers of an isotropic model in pairs
    #[command(name = "merge-thin")]
    MergeThin {
        /// Model file
        model: PathBuf,

        /// Thickness threshold (km)
        #[arg(long, default_value_t = 1.0)]
        threshold: f64,

        /// Keep at most this many layers
        #[arg(long)]
        max_layers: Option<usize>,

        /// Output file (defaults to editing the model in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a plot-ready staircase profile
    #[command(name = "profile")]
    Profile {
        /// Model file
        model: PathBuf,

        /// Parameter name
        #[arg(short, long)]
        param: Parameter,

        /// Only layers whose bottom is deeper than this (km)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        zmin: f64,

        /// Only layers whose bottom is at most this deep (km)
        #[arg(long, default_value_t = f64::INFINITY)]
        zmax: f64,

        /// Print JSON instead of two columns
        #[arg(long)]
        json: bool,
    },

    /// Insert every layer listed in a layer table
    #[command(name = "apply-table")]
    ApplyTable {
        /// Model file
        model: PathBuf,

        /// Layer table with a '# z0 H vs [vp] [rho]' header
        table: PathBuf,

        /// Output file (defaults to editing the model in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Save a checksummed JSON snapshot of a model
    #[command(name = "snapshot")]
    Snapshot {
        /// Model file
        model: PathBuf,

        /// Snapshot file
        output: PathBuf,
    },

    /// Restore a model file from a JSON snapshot
    #[command(name = "restore")]
    Restore {
        /// Snapshot file
        snapshot: PathBuf,

        /// Output model file
        output: PathBuf,
    },

    /// Validate every *.mod file under a directory
    #[command(name = "check")]
    Check {
        /// Directory to scan
        dir: PathBuf,
    },
}
