//! Parallel column storage
//!
//! `LayerColumns` is the column-wise view of a layer stack: one thickness
//! column plus one column per parameter. It is also the interface format
//! adapters use to get all layers out of, or build a stack from, explicit
//! columns.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::params::{CommonParams, LayerParams, ModelKind, Parameter, Velocity};
use crate::error::{ModelError, Result};

/// Velocity columns, tagged by parameterization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VelocityColumns {
    Isotropic {
        vp: Vec<f64>,
        vs: Vec<f64>,
    },
    TransverseIsotropic {
        vpv: Vec<f64>,
        vsv: Vec<f64>,
        vph: Vec<f64>,
        vsh: Vec<f64>,
        vpf: Vec<f64>,
    },
}

impl VelocityColumns {
    pub fn empty(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Isotropic => VelocityColumns::Isotropic {
                vp: Vec::new(),
                vs: Vec::new(),
            },
            ModelKind::TransverseIsotropic => VelocityColumns::TransverseIsotropic {
                vpv: Vec::new(),
                vsv: Vec::new(),
                vph: Vec::new(),
                vsh: Vec::new(),
                vpf: Vec::new(),
            },
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            VelocityColumns::Isotropic { .. } => ModelKind::Isotropic,
            VelocityColumns::TransverseIsotropic { .. } => ModelKind::TransverseIsotropic,
        }
    }
}

/// Columns shared by both parameterizations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonColumns {
    pub rho: Vec<f64>,
    pub qp: Vec<f64>,
    pub qs: Vec<f64>,
    pub etap: Vec<f64>,
    pub etas: Vec<f64>,
    pub frefp: Vec<f64>,
    pub frefs: Vec<f64>,
}

/// All layers of a stack, stored column-wise
///
/// Index `i` refers to the same layer in every column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerColumns {
    /// Layer thickness (km)
    pub thickness: Vec<f64>,
    pub velocity: VelocityColumns,
    pub common: CommonColumns,
}

impl LayerColumns {
    /// Columns with no layers
    pub fn empty(kind: ModelKind) -> Self {
        Self {
            thickness: Vec::new(),
            velocity: VelocityColumns::empty(kind),
            common: CommonColumns::default(),
        }
    }

    /// Empty columns with room for `capacity` layers in every column
    pub fn with_capacity(kind: ModelKind, capacity: usize) -> Self {
        let mut columns = Self::empty(kind);
        for column in columns.all_columns_mut() {
            column.reserve(capacity);
        }
        columns
    }

    pub fn kind(&self) -> ModelKind {
        self.velocity.kind()
    }

    /// Number of layers (length of the thickness column)
    pub fn len(&self) -> usize {
        self.thickness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thickness.is_empty()
    }

    /// Column of a named parameter, `None` if the kind lacks it
    pub fn column(&self, param: Parameter) -> Option<&Vec<f64>> {
        let common = &self.common;
        match param {
            Parameter::Rho => return Some(&common.rho),
            Parameter::Qp => return Some(&common.qp),
            Parameter::Qs => return Some(&common.qs),
            Parameter::Etap => return Some(&common.etap),
            Parameter::Etas => return Some(&common.etas),
            Parameter::Frefp => return Some(&common.frefp),
            Parameter::Frefs => return Some(&common.frefs),
            _ => {}
        }
        match (&self.velocity, param) {
            (VelocityColumns::Isotropic { vp, .. }, Parameter::Vp) => Some(vp),
            (VelocityColumns::Isotropic { vs, .. }, Parameter::Vs) => Some(vs),
            (VelocityColumns::TransverseIsotropic { vpv, .. }, Parameter::Vpv) => Some(vpv),
            (VelocityColumns::TransverseIsotropic { vsv, .. }, Parameter::Vsv) => Some(vsv),
            (VelocityColumns::TransverseIsotropic { vph, .. }, Parameter::Vph) => Some(vph),
            (VelocityColumns::TransverseIsotropic { vsh, .. }, Parameter::Vsh) => Some(vsh),
            (VelocityColumns::TransverseIsotropic { vpf, .. }, Parameter::Vpf) => Some(vpf),
            _ => None,
        }
    }

    pub fn column_mut(&mut self, param: Parameter) -> Option<&mut Vec<f64>> {
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
            (VelocityColumns::Isotropic { vp, .. }, Parameter::Vp) => Some(vp),
            (VelocityColumns::Isotropic { vs, .. }, Parameter::Vs) => Some(vs),
            (VelocityColumns::TransverseIsotropic { vpv, .. }, Parameter::Vpv) => Some(vpv),
            (VelocityColumns::TransverseIsotropic { vsv, .. }, Parameter::Vsv) => Some(vsv),
            (VelocityColumns::TransverseIsotropic { vph, .. }, Parameter::Vph) => Some(vph),
            (VelocityColumns::TransverseIsotropic { vsh, .. }, Parameter::Vsh) => Some(vsh),
            (VelocityColumns::TransverseIsotropic { vpf, .. }, Parameter::Vpf) => Some(vpf),
            _ => None,
        }
    }

    /// Thickness followed by every parameter column, in `ModelKind::parameters` order
    fn all_columns(&self) -> Vec<&Vec<f64>> {
        let mut out = vec![&self.thickness];
        match &self.velocity {
            VelocityColumns::Isotropic { vp, vs } => out.extend([vp, vs]),
            VelocityColumns::TransverseIsotropic {
                vpv,
                vsv,
                vph,
                vsh,
                vpf,
            } => out.extend([vpv, vsv, vph, vsh, vpf]),
        }
        let c = &self.common;
        out.extend([&c.rho, &c.qp, &c.qs, &c.etap, &c.etas, &c.frefp, &c.frefs]);
        out
    }

    fn all_columns_mut(&mut self) -> Vec<&mut Vec<f64>> {
        let mut out = vec![&mut self.thickness];
        match &mut self.velocity {
            VelocityColumns::Isotropic { vp, vs } => out.extend([vp, vs]),
            VelocityColumns::TransverseIsotropic {
                vpv,
                vsv,
                vph,
                vsh,
                vpf,
            } => out.extend([vpv, vsv, vph, vsh, vpf]),
        }
        let c = &mut self.common;
        out.extend([
            &mut c.rho,
            &mut c.qp,
            &mut c.qs,
            &mut c.etap,
            &mut c.etas,
            &mut c.frefp,
            &mut c.frefs,
        ]);
        out
    }

    /// One layer's values laid out in `all_columns` order
    fn row(&self, thickness: f64, params: &LayerParams) -> Result<Vec<f64>> {
        if params.kind() != self.kind() {
            return Err(ModelError::IncompatibleParameter {
                parameter: format!("{} layer", params.kind()),
                kind: self.kind(),
            });
        }
        let mut row = vec![thickness];
        match params.velocity {
            Velocity::Isotropic { vp, vs } => row.extend([vp, vs]),
            Velocity::TransverseIsotropic {
                vpv,
                vsv,
                vph,
                vsh,
                vpf,
            } => row.extend([vpv, vsv, vph, vsh, vpf]),
        }
        let c = &params.common;
        row.extend([c.rho, c.qp, c.qs, c.etap, c.etas, c.frefp, c.frefs]);
        Ok(row)
    }

    /// Parameters of layer `index`
    pub fn params_at(&self, index: usize) -> Option<LayerParams> {
        if index >= self.len() {
            return None;
        }
        let velocity = match &self.velocity {
            VelocityColumns::Isotropic { vp, vs } => Velocity::Isotropic {
                vp: *vp.get(index)?,
                vs: *vs.get(index)?,
            },
            VelocityColumns::TransverseIsotropic {
                vpv,
                vsv,
                vph,
                vsh,
                vpf,
            } => Velocity::TransverseIsotropic {
                vpv: *vpv.get(index)?,
                vsv: *vsv.get(index)?,
                vph: *vph.get(index)?,
                vsh: *vsh.get(index)?,
                vpf: *vpf.get(index)?,
            },
        };
        let c = &self.common;
        let common = CommonParams {
            rho: *c.rho.get(index)?,
            qp: *c.qp.get(index)?,
            qs: *c.qs.get(index)?,
            etap: *c.etap.get(index)?,
            etas: *c.etas.get(index)?,
            frefp: *c.frefp.get(index)?,
            frefs: *c.frefs.get(index)?,
        };
        Some(LayerParams { velocity, common })
    }

    /// Append one layer to every column
    pub fn push(&mut self, thickness: f64, params: &LayerParams) -> Result<()> {
        let row = self.row(thickness, params)?;
        for (column, value) in self.all_columns_mut().into_iter().zip(row) {
            column.push(value);
        }
        Ok(())
    }

    /// Insert one layer at `index` in every column
    pub fn insert(&mut self, index: usize, thickness: f64, params: &LayerParams) -> Result<()> {
        if index > self.len() {
            return Err(ModelError::InvalidLayerStack {
                reason: format!("insert index {} beyond {} layers", index, self.len()),
            });
        }
        let row = self.row(thickness, params)?;
        for (column, value) in self.all_columns_mut().into_iter().zip(row) {
            column.insert(index, value);
        }
        Ok(())
    }

    /// Append layers `range` of `other`, which must have the same kind
    pub fn extend_from(&mut self, other: &LayerColumns, range: Range<usize>) -> Result<()> {
        if other.kind() != self.kind() {
            return Err(ModelError::InvalidLayerStack {
                reason: format!("cannot combine {} and {} columns", self.kind(), other.kind()),
            });
        }
        if range.end > other.len() || range.start > range.end {
            return Err(ModelError::InvalidLayerStack {
                reason: format!("layer range {:?} outside {} layers", range, other.len()),
            });
        }
        for (dst, src) in self.all_columns_mut().into_iter().zip(other.all_columns()) {
            dst.extend_from_slice(&src[range.clone()]);
        }
        Ok(())
    }

    /// Remove the first `count` layers from every column
    pub fn drain_front(&mut self, count: usize) {
        let count = count.min(self.len());
        for column in self.all_columns_mut() {
            column.drain(..count);
        }
    }

    /// Keep only the first `len` layers
    pub fn truncate(&mut self, len: usize) {
        for column in self.all_columns_mut() {
            column.truncate(len);
        }
    }

    /// Check the structural invariants
    ///
    /// Every column must have the same length as the thickness column and
    /// every thickness must be finite and positive. Strictly increasing
    /// cumulative depth is checked by the stack when it commits.
    pub fn validate(&self) -> Result<()> {
        let n = self.len();
        let kind = self.kind();
        for param in kind.parameters() {
            let len = self.column(param).map_or(0, Vec::len);
            if len != n {
                return Err(ModelError::InvalidLayerStack {
                    reason: format!("column '{}' has {} values for {} layers", param, len, n),
                });
            }
        }
        if let Some((i, h)) = self
            .thickness
            .iter()
            .enumerate()
            .find(|(_, h)| !(h.is_finite() && **h > 0.0))
        {
            return Err(ModelError::InvalidLayerStack {
                reason: format!("layer {} has non-positive thickness {}", i, h),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(vs: f64) -> LayerParams {
        LayerParams::isotropic(vs * 1.75, vs, CommonParams::new(2.7, 600.0, 300.0))
    }

    #[test]
    fn test_push_and_params_at() {
        let mut columns = LayerColumns::empty(ModelKind::Isotropic);
        columns.push(2.0, &iso(3.0)).unwrap();
        columns.push(5.0, &iso(3.5)).unwrap();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns.params_at(1), Some(iso(3.5)));
        assert_eq!(columns.params_at(2), None);
        assert_eq!(columns.column(Parameter::Vs).unwrap(), &vec![3.0, 3.5]);
        assert!(columns.column(Parameter::Vsv).is_none());
        columns.validate().unwrap();
    }

    #[test]
    fn test_push_rejects_other_kind() {
        let mut columns = LayerColumns::empty(ModelKind::TransverseIsotropic);
        let err = columns.push(1.0, &iso(3.0)).unwrap_err();
        assert_eq!(err.error_code(), "INCOMPATIBLE_PARAMETER");
        assert!(columns.is_empty());
    }

    #[test]
    fn test_insert_extend_drain() {
        let mut columns = LayerColumns::empty(ModelKind::Isotropic);
        columns.push(1.0, &iso(1.0)).unwrap();
        columns.push(3.0, &iso(3.0)).unwrap();
        columns.insert(1, 2.0, &iso(2.0)).unwrap();
        assert_eq!(columns.thickness, vec![1.0, 2.0, 3.0]);

        let mut other = LayerColumns::with_capacity(ModelKind::Isotropic, 4);
        other.extend_from(&columns, 1..3).unwrap();
        assert_eq!(other.thickness, vec![2.0, 3.0]);
        assert_eq!(other.column(Parameter::Vs).unwrap(), &vec![2.0, 3.0]);

        other.drain_front(1);
        assert_eq!(other.thickness, vec![3.0]);
        assert_eq!(other.params_at(0), Some(iso(3.0)));

        assert!(other.extend_from(&columns, 2..5).is_err());
    }

    #[test]
    fn test_validate_detects_mismatch() {
        let mut columns = LayerColumns::empty(ModelKind::Isotropic);
        columns.push(1.0, &iso(1.0)).unwrap();
        columns.common.qp.push(100.0);

        let err = columns.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_LAYER_STACK");
    }

    #[test]
    fn test_validate_detects_bad_thickness() {
        let mut columns = LayerColumns::empty(ModelKind::Isotropic);
        columns.push(1.0, &iso(1.0)).unwrap();
        columns.push(0.0, &iso(1.0)).unwrap();
        assert!(columns.validate().is_err());

        columns.thickness[1] = f64::NAN;
        assert!(columns.validate().is_err());
    }
}
