//! Layered Velocity Model
//!
//! A 1-D earth model is a stack of homogeneous layers, top to bottom, each
//! carrying a thickness and a set of elastic parameters:
//! - Isotropic layers: `vp`, `vs`
//! - Transverse-isotropic layers: `vpv`, `vsv`, `vph`, `vsh`, `vpf`
//! - Both kinds: `rho`, `qp`, `qs`, `etap`, `etas`, `frefp`, `frefs`
//!
//! Layer editing (insertion and perturbation) keeps the stack contiguous:
//! existing layers are split at the edit boundaries and never overlap.

mod columns;
mod editor;
mod header;
mod merge;
mod params;
mod perturb;
mod profile;
pub mod reference;
mod stack;

pub use columns::{CommonColumns, LayerColumns, VelocityColumns};
pub use editor::{InsertionCase, Placement};
pub use header::{BoundaryType, EarthType, ModelHeader, VelocityType};
pub use merge::{MergeOptions, MergeReport};
pub use params::{
    brocher_rho, brocher_vp, f_modulus_velocity, CommonParams, LayerParams, LayerSpec, ModelKind,
    Parameter, Velocity, DEFAULT_FREF, DEFAULT_QP, DEFAULT_QS,
};
pub use perturb::PerturbationReport;
pub use profile::ProfilePoint;
pub use stack::{AttenuationDefaults, IsotropicProfile, LayerStack, DEPTH_EPSILON};

use crate::error::Result;

/// A named layer stack with its file header
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityModel {
    pub header: ModelHeader,
    pub stack: LayerStack,
}

impl VelocityModel {
    /// Empty model of the given kind with default header flags
    pub fn new(kind: ModelKind) -> Self {
        VelocityModel {
            header: ModelHeader::default(),
            stack: LayerStack::new(kind),
        }
    }

    pub fn with_stack(header: ModelHeader, stack: LayerStack) -> Self {
        VelocityModel { header, stack }
    }

    /// The built-in AK135 reference layering
    pub fn ak135(kind: ModelKind) -> Result<Self> {
        Ok(VelocityModel {
            header: ModelHeader::named(reference::AK135_NAME),
            stack: reference::ak135(kind)?,
        })
    }

    /// Model built from plain isotropic profile arrays
    pub fn from_isotropic_profile(
        name: &str,
        kind: ModelKind,
        profile: &IsotropicProfile,
        defaults: AttenuationDefaults,
    ) -> Result<Self> {
        Ok(VelocityModel {
            header: ModelHeader::named(name),
            stack: LayerStack::from_isotropic_profile(kind, profile, defaults)?,
        })
    }

    pub fn kind(&self) -> ModelKind {
        self.stack.kind()
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }
}
