//! vmodel - Layered 1-D Earth Velocity Models
//!
//! A model is a stack of homogeneous layers described by parallel parameter
//! columns, in either an isotropic or a transverse-isotropic
//! parameterization. The crate provides:
//! - Layer insertion at arbitrary depth, splitting overlapped layers
//! - Multiplicative perturbation of one parameter over a depth range
//! - Thin-layer merging, staircase profiles and reference models
//! - Model96-style text files, layer tables and JSON snapshots
//!
//! Every edit either fully applies or leaves the stack untouched.

pub mod cli;
pub mod error;
pub mod io;
pub mod model;

pub use error::{ModelError, Result};
pub use model::{LayerStack, ModelKind, Parameter, VelocityModel};
