//! Layer parameters
//!
//! Parameter names, per-layer parameter records for both parameterizations,
//! and the empirical crustal relations used when a new layer leaves its
//! P velocity or density unspecified.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Default P quality factor for a new layer
pub const DEFAULT_QP: f64 = 310.0;
/// Default S quality factor for a new layer
pub const DEFAULT_QS: f64 = 150.0;
/// Default reference frequency (Hz)
pub const DEFAULT_FREF: f64 = 1.0;

/// Layer parameterization, fixed for the lifetime of a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "ISOTROPIC")]
    Isotropic,
    #[serde(rename = "TRANSVERSE ISOTROPIC")]
    TransverseIsotropic,
}

impl ModelKind {
    /// Name used in model files
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Isotropic => "ISOTROPIC",
            ModelKind::TransverseIsotropic => "TRANSVERSE ISOTROPIC",
        }
    }

    /// Parameters carried by a stack of this kind, in column order
    pub fn parameters(&self) -> Vec<Parameter> {
        Parameter::ALL
            .iter()
            .copied()
            .filter(|p| p.is_valid_for(*self))
            .collect()
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ISOTROPIC" | "ISO" => Ok(ModelKind::Isotropic),
            "TRANSVERSE ISOTROPIC" | "TI" => Ok(ModelKind::TransverseIsotropic),
            other => Err(ModelError::Parse {
                line: 0,
                reason: format!("unsupported model type '{}'", other),
            }),
        }
    }
}

/// A named per-layer parameter column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Vp,
    Vs,
    Vpv,
    Vsv,
    Vph,
    Vsh,
    Vpf,
    Rho,
    Qp,
    Qs,
    Etap,
    Etas,
    Frefp,
    Frefs,
}

impl Parameter {
    /// Every parameter name, isotropic velocities first
    pub const ALL: [Parameter; 14] = [
        Parameter::Vp,
        Parameter::Vs,
        Parameter::Vpv,
        Parameter::Vsv,
        Parameter::Vph,
        Parameter::Vsh,
        Parameter::Vpf,
        Parameter::Rho,
        Parameter::Qp,
        Parameter::Qs,
        Parameter::Etap,
        Parameter::Etas,
        Parameter::Frefp,
        Parameter::Frefs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Vp => "vp",
            Parameter::Vs => "vs",
            Parameter::Vpv => "vpv",
            Parameter::Vsv => "vsv",
            Parameter::Vph => "vph",
            Parameter::Vsh => "vsh",
            Parameter::Vpf => "vpf",
            Parameter::Rho => "rho",
            Parameter::Qp => "qp",
            Parameter::Qs => "qs",
            Parameter::Etap => "etap",
            Parameter::Etas => "etas",
            Parameter::Frefp => "frefp",
            Parameter::Frefs => "frefs",
        }
    }

    /// Check whether this parameter exists on a stack of the given kind
    pub fn is_valid_for(&self, kind: ModelKind) -> bool {
        match self {
            Parameter::Vp | Parameter::Vs => kind == ModelKind::Isotropic,
            Parameter::Vpv
            | Parameter::Vsv
            | Parameter::Vph
            | Parameter::Vsh
            | Parameter::Vpf => kind == ModelKind::TransverseIsotropic,
            _ => true,
        }
    }

    /// Capability check against the active variant
    pub fn check(&self, kind: ModelKind) -> Result<()> {
        if self.is_valid_for(kind) {
            Ok(())
        } else {
            Err(ModelError::IncompatibleParameter {
                parameter: self.name().to_string(),
                kind,
            })
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Parameter::ALL
            .iter()
            .copied()
            .find(|p| p.name() == lower)
            .ok_or_else(|| ModelError::UnknownParameter {
                name: s.to_string(),
            })
    }
}

/// Velocities of one layer, tagged by parameterization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Velocity {
    Isotropic {
        vp: f64,
        vs: f64,
    },
    TransverseIsotropic {
        vpv: f64,
        vsv: f64,
        vph: f64,
        vsh: f64,
        vpf: f64,
    },
}

impl Velocity {
    pub fn kind(&self) -> ModelKind {
        match self {
            Velocity::Isotropic { .. } => ModelKind::Isotropic,
            Velocity::TransverseIsotropic { .. } => ModelKind::TransverseIsotropic,
        }
    }
}

/// Parameters shared by both parameterizations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommonParams {
    /// Density (g/cm^3)
    pub rho: f64,
    /// P quality factor
    pub qp: f64,
    /// S quality factor
    pub qs: f64,
    pub etap: f64,
    pub etas: f64,
    /// P reference frequency (Hz)
    pub frefp: f64,
    /// S reference frequency (Hz)
    pub frefs: f64,
}

impl CommonParams {
    /// Density and Q with default eta/reference-frequency values
    pub fn new(rho: f64, qp: f64, qs: f64) -> Self {
        Self {
            rho,
            qp,
            qs,
            etap: 0.0,
            etas: 0.0,
            frefp: DEFAULT_FREF,
            frefs: DEFAULT_FREF,
        }
    }
}

/// All parameters of a single layer (thickness excluded)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerParams {
    pub velocity: Velocity,
    pub common: CommonParams,
}

impl LayerParams {
    pub fn isotropic(vp: f64, vs: f64, common: CommonParams) -> Self {
        Self {
            velocity: Velocity::Isotropic { vp, vs },
            common,
        }
    }

    pub fn transverse_isotropic(
        vpv: f64,
        vsv: f64,
        vph: f64,
        vsh: f64,
        vpf: f64,
        common: CommonParams,
    ) -> Self {
        Self {
            velocity: Velocity::TransverseIsotropic {
                vpv,
                vsv,
                vph,
                vsh,
                vpf,
            },
            common,
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.velocity.kind()
    }

    /// Value of a named parameter, `None` if it does not exist for this kind
    pub fn get(&self, param: Parameter) -> Option<f64> {
        let mut copy = *self;
        copy.get_mut(param).map(|v| *v)
    }

    pub fn get_mut(&mut self, param: Parameter) -> Option<&mut f64> {
        let common = &mut self.common;
        match param {
            Parameter::Rho => return Some(&mut common.rho),
            Parameter::Qp => return Some(&mut common.qp),
            Parameter::Qs => return Some(&mut common.qs),
            Parameter::Etap => return Some(&mut common.etap),
            Parameter::Etas => return Some(&mut common.etas),
            Parameter::Frefp => return Some(&mut common.frefp),
            Parameter::Frefs => return Some(&mut common.frefs),
            _ => {}
        }
        match (&mut self.velocity, param) {
            (Velocity::Isotropic { vp, .. }, Parameter::Vp) => Some(vp),
            (Velocity::Isotropic { vs, .. }, Parameter::Vs) => Some(vs),
            (Velocity::TransverseIsotropic { vpv, .. }, Parameter::Vpv) => Some(vpv),
            (Velocity::TransverseIsotropic { vsv, .. }, Parameter::Vsv) => Some(vsv),
            (Velocity::TransverseIsotropic { vph, .. }, Parameter::Vph) => Some(vph),
            (Velocity::TransverseIsotropic { vsh, .. }, Parameter::Vsh) => Some(vsh),
            (Velocity::TransverseIsotropic { vpf, .. }, Parameter::Vpf) => Some(vpf),
            _ => None,
        }
    }

    /// Copy with one parameter multiplied by `factor`
    pub fn scaled(&self, param: Parameter, factor: f64) -> Result<Self> {
        let mut out = *self;
        let kind = out.kind();
        let value = out.get_mut(param).ok_or(ModelError::IncompatibleParameter {
            parameter: param.name().to_string(),
            kind,
        })?;
        *value *= factor;
        Ok(out)
    }
}

/// P velocity from S velocity (Brocher, 2005 crustal regression), km/s
pub fn brocher_vp(vs: f64) -> f64 {
    0.9409 + 2.0947 * vs - 0.8206 * vs.powi(2) + 0.2683 * vs.powi(3) - 0.0251 * vs.powi(4)
}

/// Density from P velocity (Brocher, 2005 Nafe-Drake fit), g/cm^3
pub fn brocher_rho(vp: f64) -> f64 {
    1.6612 * vp - 0.4721 * vp.powi(2) + 0.0671 * vp.powi(3) - 0.0043 * vp.powi(4)
        + 0.000106 * vp.powi(5)
}

/// F-modulus velocity `sqrt(vpv^2 - 2 vsv^2)`
///
/// Returns `None` when the radicand is negative.
pub fn f_modulus_velocity(vpv: f64, vsv: f64) -> Option<f64> {
    let radicand = vpv * vpv - 2.0 * vsv * vsv;
    if radicand >= 0.0 {
        Some(radicand.sqrt())
    } else {
        None
    }
}

/// Input for a new layer with optional values
///
/// Missing velocities and density are derived from `vsv` through the
/// empirical crustal relations by `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// SV velocity (the S velocity of an isotropic layer)
    pub vsv: f64,
    pub vsh: Option<f64>,
    /// PV velocity (the P velocity of an isotropic layer)
    pub vpv: Option<f64>,
    pub vph: Option<f64>,
    pub vpf: Option<f64>,
    pub rho: Option<f64>,
    pub qp: f64,
    pub qs: f64,
    pub etap: f64,
    pub etas: f64,
    pub frefp: f64,
    pub frefs: f64,
}

impl LayerSpec {
    pub fn new(vs: f64) -> Self {
        Self {
            vsv: vs,
            vsh: None,
            vpv: None,
            vph: None,
            vpf: None,
            rho: None,
            qp: DEFAULT_QP,
            qs: DEFAULT_QS,
            etap: 0.0,
            etas: 0.0,
            frefp: DEFAULT_FREF,
            frefs: DEFAULT_FREF,
        }
    }

    pub fn with_vp(mut self, vp: f64) -> Self {
        self.vpv = Some(vp);
        self
    }

    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = Some(rho);
        self
    }

    pub fn with_q(mut self, qp: f64, qs: f64) -> Self {
        self.qp = qp;
        self.qs = qs;
        self
    }

    /// Fill in missing values and build parameters for a stack of `kind`
    ///
    /// # Errors
    /// `UndefinedFModulus` when a transverse-isotropic `vpf` must be derived
    /// but `vpv < sqrt(2) * vsv`.
    pub fn resolve(&self, kind: ModelKind) -> Result<LayerParams> {
        let vsv = self.vsv;
        let vpv = self.vpv.unwrap_or_else(|| brocher_vp(vsv));
        let rho = self.rho.unwrap_or_else(|| brocher_rho(vpv));
        let common = CommonParams {
            rho,
            qp: self.qp,
            qs: self.qs,
            etap: self.etap,
            etas: self.etas,
            frefp: self.frefp,
            frefs: self.frefs,
        };

        match kind {
            ModelKind::Isotropic => Ok(LayerParams::isotropic(vpv, vsv, common)),
            ModelKind::TransverseIsotropic => {
                let vpf = match self.vpf {
                    Some(vpf) => vpf,
                    None => f_modulus_velocity(vpv, vsv)
                        .ok_or(ModelError::UndefinedFModulus { vpv, vsv })?,
                };
                Ok(LayerParams::transverse_isotropic(
                    vpv,
                    vsv,
                    self.vph.unwrap_or(vpv),
                    self.vsh.unwrap_or(vsv),
                    vpf,
                    common,
                ))
            }
        }
    }
}
