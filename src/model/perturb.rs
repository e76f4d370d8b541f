//! Perturbation Operator
//!
//! Multiplies one parameter by `1 + fraction` over a depth range. Layers
//! entirely inside the range are scaled in place; layers cut by either edge
//! are split with the layer editor so that the perturbed region starts and
//! ends exactly on layer boundaries.

use log::{info, warn};

use super::editor::Placement;
use super::params::{LayerParams, Parameter};
use super::stack::{LayerStack, DEPTH_EPSILON};
use crate::error::{ModelError, Result};

/// What a perturbation changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerturbationReport {
    /// Existing layers scaled in place
    pub scaled_layers: usize,
    /// Boundary layers synthesized where the range cut a layer
    pub boundary_layers: usize,
}

/// A piece of a straddled layer that lies inside the perturbed range
#[derive(Debug, Clone, Copy)]
struct Fragment {
    top: f64,
    thickness: f64,
    params: LayerParams,
}

impl LayerStack {
    /// Scale `param` by `1 + fraction` over `[zmin, zmax)`
    ///
    /// The range is clipped to the model. A fraction of exactly 0 leaves
    /// values unchanged but still splits layers at unaligned range edges.
    ///
    /// # Errors
    /// - `OutOfRangePerturbation` if `fraction` is outside `[-1, 1]`
    /// - `IncompatibleParameter` if `param` does not exist for this kind
    /// - `InvalidDepthRange` if `zmax <= zmin`
    ///
    /// On error the stack is unchanged.
    pub fn perturb(
        &mut self,
        param: Parameter,
        fraction: f64,
        zmin: f64,
        zmax: f64,
    ) -> Result<PerturbationReport> {
        if !(fraction.is_finite() && (-1.0..=1.0).contains(&fraction)) {
            return Err(ModelError::OutOfRangePerturbation { fraction });
        }
        param.check(self.kind())?;
        if zmin.is_nan() || zmax.is_nan() || zmax <= zmin {
            return Err(ModelError::InvalidDepthRange { zmin, zmax });
        }

        let lo = zmin.max(0.0);
        let hi = zmax.min(self.total_depth());
        if hi - lo <= DEPTH_EPSILON {
            warn!(
                "Perturbation range [{}, {}) lies outside the model (0 to {} km)",
                zmin,
                zmax,
                self.total_depth()
            );
            return Ok(PerturbationReport::default());
        }

        let factor = 1.0 + fraction;
        let fragments = self.boundary_fragments(param, factor, lo, hi)?;
        let interior = self.interior_range(lo, hi);

        let mut work = self.clone();
        let mut column = work.column(param)?.to_vec();
        for value in &mut column[interior.clone()] {
            *value *= factor;
        }
        work.replace_column(param, column)?;

        // Deepest first; each insert replaces an existing depth range so
        // earlier inserts do not move later ones
        for fragment in fragments.iter().rev() {
            work.insert_layer(
                fragment.thickness,
                &fragment.params,
                Placement::Top(fragment.top),
            )?;
        }

        *self = work;
        let report = PerturbationReport {
            scaled_layers: interior.len(),
            boundary_layers: fragments.len(),
        };
        info!(
            "Perturbed {} by {:+.2}% over [{}, {}) km: {} layers scaled, {} boundary layers added",
            param,
            fraction * 100.0,
            lo,
            hi,
            report.scaled_layers,
            report.boundary_layers
        );
        Ok(report)
    }

    /// Perturbed copy of this stack, leaving `self` untouched
    pub fn perturbed(
        &self,
        param: Parameter,
        fraction: f64,
        zmin: f64,
        zmax: f64,
    ) -> Result<LayerStack> {
        let mut copy = self.clone();
        copy.perturb(param, fraction, zmin, zmax)?;
        Ok(copy)
    }

    /// Pieces of layers cut by `lo` or `hi`, ordered top to bottom, with
    /// only `param` scaled
    fn boundary_fragments(
        &self,
        param: Parameter,
        factor: f64,
        lo: f64,
        hi: f64,
    ) -> Result<Vec<Fragment>> {
        let upper = (!self.is_boundary(lo))
            .then(|| self.layer_index_at(lo))
            .flatten();
        let lower = (!self.is_boundary(hi))
            .then(|| self.layer_index_at(hi))
            .flatten();

        let mut fragments = Vec::with_capacity(2);
        let mut push = |top: f64, bottom: f64, index: usize| -> Result<()> {
            let original = self.layer(index).ok_or_else(|| ModelError::InvalidLayerStack {
                reason: format!("layer {} missing from {} layers", index, self.len()),
            })?;
            fragments.push(Fragment {
                top,
                thickness: bottom - top,
                params: original.scaled(param, factor)?,
            });
            Ok(())
        };

        match (upper, lower) {
            // The whole range sits inside one layer
            (Some(i), Some(j)) if i == j => push(lo, hi, i)?,
            (upper, lower) => {
                if let Some(i) = upper {
                    let bottom = self.depth_of(i).unwrap_or(hi).min(hi);
                    push(lo, bottom, i)?;
                }
                if let Some(j) = lower {
                    let top = self.top_of(j).unwrap_or(lo).max(lo);
                    push(top, hi, j)?;
                }
            }
        }
        Ok(fragments)
    }
}
