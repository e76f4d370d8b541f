//! Layer Stack
//!
//! An ordered stack of horizontal layers. Depth is derived from the
//! cumulative thickness and cached; every mutation goes through
//! [`LayerStack::commit`], which validates a complete column set before it
//! replaces the current one.

use std::ops::Range;

use log::debug;

use super::columns::LayerColumns;
use super::params::{CommonParams, LayerParams, ModelKind, Parameter};
use crate::error::{ModelError, Result};

/// Depths closer than this (km) are treated as the same boundary
pub const DEPTH_EPSILON: f64 = 1e-9;

/// Scalar eta and reference-frequency values used to fill columns when a
/// profile only provides velocities, density and Q
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttenuationDefaults {
    pub etap: f64,
    pub etas: f64,
    pub frefp: f64,
    pub frefs: f64,
}

impl Default for AttenuationDefaults {
    fn default() -> Self {
        Self {
            etap: 0.0,
            etas: 0.0,
            frefp: 1.0,
            frefs: 1.0,
        }
    }
}

/// Isotropic profile columns (velocities, density and Q per layer)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IsotropicProfile {
    pub thickness: Vec<f64>,
    pub vp: Vec<f64>,
    pub vs: Vec<f64>,
    pub rho: Vec<f64>,
    pub qp: Vec<f64>,
    pub qs: Vec<f64>,
}

/// The layer stack
///
/// Invariants: all columns have one value per layer, every thickness is
/// positive, and `depth[i] = thickness[0] + ... + thickness[i]` is strictly
/// increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStack {
    columns: LayerColumns,
    /// Bottom depth of each layer
    depth: Vec<f64>,
}

impl LayerStack {
    /// Create an empty stack of the given kind
    pub fn new(kind: ModelKind) -> Self {
        Self {
            columns: LayerColumns::empty(kind),
            depth: Vec::new(),
        }
    }

    /// Build a stack from explicit columns
    ///
    /// # Errors
    /// `InvalidLayerStack` if the columns violate the stack invariants
    pub fn from_columns(columns: LayerColumns) -> Result<Self> {
        let mut stack = Self::new(columns.kind());
        stack.commit(columns)?;
        Ok(stack)
    }

    /// Build a stack from an isotropic profile
    ///
    /// For a transverse-isotropic stack the horizontal velocities copy the
    /// vertical ones and `vpf` is derived from the F-modulus relation.
    pub fn from_isotropic_profile(
        kind: ModelKind,
        profile: &IsotropicProfile,
        defaults: AttenuationDefaults,
    ) -> Result<Self> {
        let n = profile.thickness.len();
        let lengths = [
            profile.vp.len(),
            profile.vs.len(),
            profile.rho.len(),
            profile.qp.len(),
            profile.qs.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(ModelError::InvalidLayerStack {
                reason: format!("profile column lengths {:?} differ from {} layers", lengths, n),
            });
        }

        let mut columns = LayerColumns::with_capacity(kind, n);
        for i in 0..n {
            let common = CommonParams {
                rho: profile.rho[i],
                qp: profile.qp[i],
                qs: profile.qs[i],
                etap: defaults.etap,
                etas: defaults.etas,
                frefp: defaults.frefp,
                frefs: defaults.frefs,
            };
            let (vp, vs) = (profile.vp[i], profile.vs[i]);
            let params = match kind {
                ModelKind::Isotropic => LayerParams::isotropic(vp, vs, common),
                ModelKind::TransverseIsotropic => {
                    let vpf = super::params::f_modulus_velocity(vp, vs)
                        .ok_or(ModelError::UndefinedFModulus { vpv: vp, vsv: vs })?;
                    LayerParams::transverse_isotropic(vp, vs, vp, vs, vpf, common)
                }
            };
            columns.push(profile.thickness[i], &params)?;
        }
        Self::from_columns(columns)
    }

    /// Validate `columns` and make them the current state
    ///
    /// On error the stack is left exactly as it was.
    pub(crate) fn commit(&mut self, columns: LayerColumns) -> Result<()> {
        if columns.kind() != self.kind() {
            return Err(ModelError::InvalidLayerStack {
                reason: format!("cannot replace {} layers with {}", self.kind(), columns.kind()),
            });
        }
        columns.validate()?;
        let depth: Vec<f64> = columns
            .thickness
            .iter()
            .scan(0.0, |acc, h| {
                *acc += h;
                Some(*acc)
            })
            .collect();
        // A thickness below the float resolution of the running sum
        // leaves two layers with the same bottom
        let mut previous = 0.0;
        for (i, &bottom) in depth.iter().enumerate() {
            if bottom <= previous {
                return Err(ModelError::InvalidLayerStack {
                    reason: format!(
                        "depth not strictly increasing at layer {} ({} km after {} km)",
                        i, bottom, previous
                    ),
                });
            }
            previous = bottom;
        }
        self.depth = depth;
        self.columns = columns;
        Ok(())
    }

    pub fn kind(&self) -> ModelKind {
        self.columns.kind()
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column-wise view of every layer
    pub fn columns(&self) -> &LayerColumns {
        &self.columns
    }

    pub fn into_columns(self) -> LayerColumns {
        self.columns
    }

    pub fn thickness(&self) -> &[f64] {
        &self.columns.thickness
    }

    /// Bottom depth of every layer
    pub fn depths(&self) -> &[f64] {
        &self.depth
    }

    /// Bottom depth of layer `index`
    pub fn depth_of(&self, index: usize) -> Option<f64> {
        self.depth.get(index).copied()
    }

    /// Top depth of layer `index`
    pub fn top_of(&self, index: usize) -> Option<f64> {
        match index {
            0 if !self.depth.is_empty() => Some(0.0),
            _ => index.checked_sub(1).and_then(|prev| self.depth_of(prev)),
        }
    }

    /// Bottom of the last layer, 0 for an empty stack
    pub fn total_depth(&self) -> f64 {
        self.depth.last().copied().unwrap_or(0.0)
    }

    /// Parameters of layer `index`
    pub fn layer(&self, index: usize) -> Option<LayerParams> {
        self.columns.params_at(index)
    }

    /// Values of one parameter for every layer
    ///
    /// # Errors
    /// `IncompatibleParameter` if the parameter does not exist for this kind
    pub fn column(&self, param: Parameter) -> Result<&[f64]> {
        param.check(self.kind())?;
        self.columns
            .column(param)
            .map(Vec::as_slice)
            .ok_or(ModelError::IncompatibleParameter {
                parameter: param.name().to_string(),
                kind: self.kind(),
            })
    }

    /// Replace one parameter column wholesale
    ///
    /// # Errors
    /// `InvalidLayerStack` if `values` does not have one entry per layer
    pub fn replace_column(&mut self, param: Parameter, values: Vec<f64>) -> Result<()> {
        param.check(self.kind())?;
        if values.len() != self.len() {
            return Err(ModelError::InvalidLayerStack {
                reason: format!(
                    "replacement column '{}' has {} values for {} layers",
                    param,
                    values.len(),
                    self.len()
                ),
            });
        }
        if let Some(column) = self.columns.column_mut(param) {
            *column = values;
        }
        Ok(())
    }

    /// Index of the layer containing depth `z` (top inclusive, bottom exclusive)
    pub fn layer_index_at(&self, z: f64) -> Option<usize> {
        if z < 0.0 {
            return None;
        }
        let index = self.depth.partition_point(|&bottom| bottom <= z);
        (index < self.len()).then_some(index)
    }

    /// Whether `z` coincides with the top or bottom of some layer
    pub fn is_boundary(&self, z: f64) -> bool {
        z.abs() <= DEPTH_EPSILON || self.depth.iter().any(|d| (d - z).abs() <= DEPTH_EPSILON)
    }

    /// Layers whose depth range intersects `[zmin, zmax)`
    ///
    /// A layer whose top equals `zmax` or whose bottom equals `zmin` is
    /// excluded.
    pub fn select_range(&self, zmin: f64, zmax: f64) -> Range<usize> {
        let start = self.depth.partition_point(|&bottom| bottom <= zmin + DEPTH_EPSILON);
        let end = (0..self.len())
            .find(|&i| self.top_of(i).map_or(true, |top| top >= zmax - DEPTH_EPSILON))
            .unwrap_or(self.len());
        start..end.max(start)
    }

    /// Layers lying entirely inside `[zmin, zmax)`
    pub fn interior_range(&self, zmin: f64, zmax: f64) -> Range<usize> {
        let start = (0..self.len())
            .find(|&i| self.top_of(i).map_or(false, |top| top >= zmin - DEPTH_EPSILON))
            .unwrap_or(self.len());
        let end = self.depth.partition_point(|&bottom| bottom <= zmax + DEPTH_EPSILON);
        start..end.max(start)
    }

    /// Add a layer below the current bottom
    pub fn append_layer(&mut self, thickness: f64, params: &LayerParams) -> Result<()> {
        let mut columns = self.columns.clone();
        columns.push(thickness, params)?;
        self.commit(columns)
    }

    /// Add a layer above the current surface, pushing everything down
    pub fn prepend_layer(&mut self, thickness: f64, params: &LayerParams) -> Result<()> {
        let mut columns = self.columns.clone();
        columns.insert(0, thickness, params)?;
        self.commit(columns)
    }

    /// Discard every layer whose bottom depth is at or above `threshold`
    ///
    /// Returns the number of layers removed. Surviving layers keep their
    /// thickness, so the remaining stack starts at depth 0 again.
    pub fn remove_layers_below(&mut self, threshold: f64) -> Result<usize> {
        let count = self
            .depth
            .partition_point(|&bottom| bottom <= threshold + DEPTH_EPSILON);
        if count == 0 {
            return Ok(0);
        }
        let mut columns = self.columns.clone();
        columns.drain_front(count);
        self.commit(columns)?;
        debug!("Removed {} layers above {} km", count, threshold);
        Ok(count)
    }
}
