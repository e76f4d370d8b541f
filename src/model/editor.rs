//! Layer Editor
//!
//! Inserts a new layer at an arbitrary depth, splitting whatever existing
//! layers straddle its top and bottom. An interior insert is assembled as
//! three segments (layers above, the new layer, layers below) into a single
//! fresh column set. Append and surface inserts run the stack primitives on
//! a staged copy. Either way the edit is committed atomically.

use log::debug;

use super::columns::LayerColumns;
use super::params::{LayerParams, LayerSpec};
use super::stack::{LayerStack, DEPTH_EPSILON};
use crate::error::{ModelError, Result};

/// Where a new layer goes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Placement {
    /// Below the current bottom of the stack
    #[default]
    Append,
    /// With its top at the given depth (km)
    Top(f64),
}

impl Placement {
    /// `Top(z)` for `Some(z)`, `Append` otherwise
    pub fn from_top(top: Option<f64>) -> Self {
        top.map_or(Placement::Append, Placement::Top)
    }
}

/// Which insertion path was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionCase {
    /// New layer added below the previous bottom
    Append,
    /// New layer placed at the surface; `discarded` layers were covered by it
    Surface { discarded: usize },
    /// New layer placed inside the stack
    Interior {
        /// A fragment of the layer straddling the new top was kept
        upper_fragment: bool,
        /// A fragment of the layer straddling the new bottom was kept
        lower_fragment: bool,
    },
}

impl LayerStack {
    /// Insert a layer of `thickness` with `params` at `placement`
    ///
    /// - `Append`, or a top at/below the current bottom: the layer becomes
    ///   the last one, flush with the previous bottom.
    /// - A top at or above the surface: the layer occupies
    ///   `[0, thickness)`; layers ending inside it are discarded and the
    ///   first survivor is shortened.
    /// - Otherwise the layer replaces `[top, top + thickness)`; layers cut
    ///   by either edge keep a fragment with their original parameters.
    ///
    /// # Errors
    /// - `InvalidInsertion` if `thickness` is not positive
    /// - `IncompatibleParameter` if `params` is the other parameterization
    pub fn insert_layer(
        &mut self,
        thickness: f64,
        params: &LayerParams,
        placement: Placement,
    ) -> Result<InsertionCase> {
        if !(thickness.is_finite() && thickness > 0.0) {
            return Err(ModelError::InvalidInsertion { thickness });
        }
        if params.kind() != self.kind() {
            return Err(ModelError::IncompatibleParameter {
                parameter: format!("{} layer", params.kind()),
                kind: self.kind(),
            });
        }

        let total = self.total_depth();
        let top = match placement {
            Placement::Append => total,
            Placement::Top(z) if z.is_nan() => {
                return Err(ModelError::InvalidDepthRange {
                    zmin: z,
                    zmax: z + thickness,
                })
            }
            Placement::Top(z) => z,
        };

        let (columns, case) = if top >= total - DEPTH_EPSILON {
            self.appended(thickness, params)?
        } else if top <= DEPTH_EPSILON {
            self.resurfaced(thickness, params)?
        } else {
            self.spliced(top, thickness, params)?
        };

        self.commit(columns)?;
        debug!(
            "Inserted {:.3} km layer ({:?}); stack now {} layers, {:.3} km",
            thickness,
            case,
            self.len(),
            self.total_depth()
        );
        Ok(case)
    }

    /// Insert a layer described by a `LayerSpec`, filling in defaults
    pub fn insert_spec(
        &mut self,
        thickness: f64,
        spec: &LayerSpec,
        placement: Placement,
    ) -> Result<InsertionCase> {
        let params = spec.resolve(self.kind())?;
        self.insert_layer(thickness, &params, placement)
    }

    fn appended(&self, thickness: f64, params: &LayerParams) -> Result<(LayerColumns, InsertionCase)> {
        let mut staged = self.clone();
        staged.append_layer(thickness, params)?;
        Ok((staged.into_columns(), InsertionCase::Append))
    }

    fn resurfaced(
        &self,
        thickness: f64,
        params: &LayerParams,
    ) -> Result<(LayerColumns, InsertionCase)> {
        let mut staged = self.clone();
        // Layers ending inside the new layer are covered by it
        let discarded = staged.remove_layers_below(thickness)?;
        if let Some(bottom) = self.depth_of(discarded) {
            let mut columns = staged.into_columns();
            columns.thickness[0] = bottom - thickness;
            staged = LayerStack::from_columns(columns)?;
        }
        staged.prepend_layer(thickness, params)?;
        Ok((staged.into_columns(), InsertionCase::Surface { discarded }))
    }

    fn spliced(
        &self,
        top: f64,
        thickness: f64,
        params: &LayerParams,
    ) -> Result<(LayerColumns, InsertionCase)> {
        let n = self.len();
        let bottom = top + thickness;
        let depths = self.depths();

        // Layers 0..above end at or above the new top; layer `above` is cut by it
        let above = depths.partition_point(|&d| d <= top + DEPTH_EPSILON);
        let upper = self.top_of(above).map(|t| top - t).filter(|h| *h > DEPTH_EPSILON);

        // Layer `cut` is the first one reaching down to the new bottom
        let cut = depths.partition_point(|&d| d < bottom - DEPTH_EPSILON);
        let lower = self
            .depth_of(cut)
            .map(|d| d - bottom)
            .filter(|h| *h > DEPTH_EPSILON);
        let below = (cut + 1).min(n);

        let mut columns = LayerColumns::with_capacity(self.kind(), n + 3);
        columns.extend_from(self.columns(), 0..above)?;
        if let Some(h) = upper {
            columns.push(h, &self.layer_params(above)?)?;
        }
        columns.push(thickness, params)?;
        if let Some(h) = lower {
            columns.push(h, &self.layer_params(cut)?)?;
        }
        columns.extend_from(self.columns(), below..n)?;

        Ok((
            columns,
            InsertionCase::Interior {
                upper_fragment: upper.is_some(),
                lower_fragment: lower.is_some(),
            },
        ))
    }

    fn layer_params(&self, index: usize) -> Result<LayerParams> {
        self.layer(index).ok_or_else(|| ModelError::InvalidLayerStack {
            reason: format!("layer {} missing from {} layers", index, self.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::params::{CommonParams, ModelKind, Parameter};
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use test_case::test_case;

    fn iso(vs: f64) -> LayerParams {
        LayerParams::isotropic(vs * 1.75, vs, CommonParams::new(2.7, 600.0, 300.0))
    }

    fn stack_of(layers: &[(f64, f64)]) -> LayerStack {
        let mut stack = LayerStack::new(ModelKind::Isotropic);
        for &(h, vs) in layers {
            stack.insert_layer(h, &iso(vs), Placement::Append).unwrap();
        }
        stack
    }

    fn assert_invariants(stack: &LayerStack) {
        stack.columns().validate().unwrap();
        let mut prev = 0.0;
        for (i, &d) in stack.depths().iter().enumerate() {
            assert!(d > prev, "depth not increasing at {}", i);
            assert_abs_diff_eq!(d - prev, stack.thickness()[i], epsilon = 1e-9);
            prev = d;
        }
    }

    #[test]
    fn test_split_single_layer() {
        let mut stack = stack_of(&[(10.0, 3.0)]);

        let case = stack.insert_layer(2.0, &iso(4.0), Placement::Top(5.0)).unwrap();

        assert_eq!(
            case,
            InsertionCase::Interior {
                upper_fragment: true,
                lower_fragment: true
            }
        );
        assert_eq!(stack.thickness(), &[5.0, 2.0, 3.0]);
        assert_eq!(stack.layer(0), Some(iso(3.0)));
        assert_eq!(stack.layer(1), Some(iso(4.0)));
        assert_eq!(stack.layer(2), Some(iso(3.0)));
        assert_eq!(stack.total_depth(), 10.0);
        assert_invariants(&stack);
    }

    #[test]
    fn test_boundary_aligned_insert_creates_no_fragment() {
        let mut stack = stack_of(&[(2.0, 1.0), (3.0, 2.0), (5.0, 3.0)]);

        let case = stack.insert_layer(3.0, &iso(9.0), Placement::Top(2.0)).unwrap();

        assert_eq!(
            case,
            InsertionCase::Interior {
                upper_fragment: false,
                lower_fragment: false
            }
        );
        assert_eq!(stack.thickness(), &[2.0, 3.0, 5.0]);
        assert_eq!(stack.column(Parameter::Vs).unwrap(), &[1.0, 9.0, 3.0]);
        assert_invariants(&stack);
    }

    #[test]
    fn test_insert_spanning_several_layers() {
        let mut stack = stack_of(&[(2.0, 1.0), (3.0, 2.0), (5.0, 3.0)]);

        // [1, 8) replaces the bottom half of layer 0, all of layer 1 and
        // the top of layer 2
        stack.insert_layer(7.0, &iso(9.0), Placement::Top(1.0)).unwrap();

        assert_eq!(stack.thickness(), &[1.0, 7.0, 2.0]);
        assert_eq!(stack.column(Parameter::Vs).unwrap(), &[1.0, 9.0, 3.0]);
        assert_eq!(stack.total_depth(), 10.0);
        assert_invariants(&stack);
    }

    #[test]
    fn test_insert_past_bottom_extends_stack() {
        let mut stack = stack_of(&[(2.0, 1.0), (3.0, 2.0)]);

        let case = stack.insert_layer(4.0, &iso(9.0), Placement::Top(3.0)).unwrap();

        assert_eq!(
            case,
            InsertionCase::Interior {
                upper_fragment: true,
                lower_fragment: false
            }
        );
        assert_eq!(stack.thickness(), &[2.0, 1.0, 4.0]);
        assert_eq!(stack.total_depth(), 7.0);
        assert_invariants(&stack);
    }

    #[test_case(Placement::Append ; "append")]
    #[test_case(Placement::Top(10.0) ; "at bottom")]
    #[test_case(Placement::Top(25.0) ; "below bottom")]
    fn test_append_places_layer_last(placement: Placement) {
        let mut stack = stack_of(&[(4.0, 1.0), (6.0, 2.0)]);

        let case = stack.insert_layer(1.5, &iso(7.0), placement).unwrap();

        assert_eq!(case, InsertionCase::Append);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.layer(2), Some(iso(7.0)));
        assert_eq!(stack.total_depth(), 11.5);
    }

    #[test]
    fn test_append_to_empty_stack() {
        let mut stack = LayerStack::new(ModelKind::Isotropic);
        stack.insert_layer(3.0, &iso(3.0), Placement::Top(0.0)).unwrap();
        stack.insert_layer(2.0, &iso(4.0), Placement::Append).unwrap();

        assert_eq!(stack.thickness(), &[3.0, 2.0]);
    }

    #[test]
    fn test_surface_insert_discards_covered_layers() {
        let mut stack = stack_of(&[(1.0, 1.0), (2.0, 2.0), (4.0, 3.0)]);

        let case = stack.insert_layer(4.0, &iso(9.0), Placement::Top(0.0)).unwrap();

        assert_eq!(case, InsertionCase::Surface { discarded: 2 });
        assert_eq!(stack.thickness(), &[4.0, 3.0]);
        assert_eq!(stack.column(Parameter::Vs).unwrap(), &[9.0, 3.0]);
        assert_eq!(stack.total_depth(), 7.0);
        assert_invariants(&stack);
    }

    #[test]
    fn test_surface_insert_with_negative_top() {
        let mut stack = stack_of(&[(5.0, 1.0)]);

        stack.insert_layer(2.0, &iso(9.0), Placement::Top(-3.0)).unwrap();

        assert_eq!(stack.thickness(), &[2.0, 3.0]);
        assert_eq!(stack.total_depth(), 5.0);
    }

    #[test]
    fn test_surface_insert_covering_whole_stack() {
        let mut stack = stack_of(&[(1.0, 1.0), (2.0, 2.0)]);

        let case = stack.insert_layer(5.0, &iso(9.0), Placement::Top(-1.0)).unwrap();

        assert_eq!(case, InsertionCase::Surface { discarded: 2 });
        assert_eq!(stack.thickness(), &[5.0]);
        assert_eq!(stack.layer(0), Some(iso(9.0)));
    }

    #[test_case(0.0 ; "zero")]
    #[test_case(-2.0 ; "negative")]
    #[test_case(f64::NAN ; "nan")]
    fn test_invalid_thickness_rejected(thickness: f64) {
        let mut stack = stack_of(&[(5.0, 1.0)]);
        let before = stack.clone();

        let err = stack
            .insert_layer(thickness, &iso(2.0), Placement::Top(1.0))
            .unwrap_err();

        assert_eq!(err.error_code(), "INVALID_INSERTION");
        assert_eq!(stack, before);
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let mut stack = stack_of(&[(5.0, 1.0)]);
        let ti = LayerParams::transverse_isotropic(6.0, 3.0, 6.0, 3.0, 4.2, CommonParams::new(2.7, 1.0, 1.0));

        let err = stack.insert_layer(1.0, &ti, Placement::Append).unwrap_err();
        assert_eq!(err.error_code(), "INCOMPATIBLE_PARAMETER");
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_insert_spec_uses_defaults() {
        let mut stack = LayerStack::new(ModelKind::TransverseIsotropic);
        stack
            .insert_spec(2.0, &LayerSpec::new(3.5), Placement::Append)
            .unwrap();

        let layer = stack.layer(0).unwrap();
        assert_eq!(layer.get(Parameter::Vsh), Some(3.5));
        assert_eq!(layer.get(Parameter::Vph), layer.get(Parameter::Vpv));
        assert_eq!(layer.common.qp, 310.0);
    }

    #[test]
    fn test_append_below_float_resolution_rejected() {
        let mut stack = stack_of(&[(10.0, 3.0)]);
        let before = stack.clone();

        let err = stack.insert_layer(1e-20, &iso(1.0), Placement::Append).unwrap_err();

        assert_eq!(err.error_code(), "INVALID_LAYER_STACK");
        assert_eq!(stack, before);
        assert_eq!(stack.depths(), &[10.0]);
    }

    #[test]
    fn test_random_edits_preserve_invariants() {
        let mut stack = stack_of(&[(3.0, 1.0), (4.0, 2.0), (10.0, 3.0)]);

        let mut rng = StdRng::seed_from_u64(0x2545_f491_4f6c_dd1d);

        for step in 0..200 {
            let before = stack.total_depth();
            let top = rng.random_range(-2.0..before + 3.0);
            let thickness = rng.random_range(0.1..6.1);
            let placement = if step % 7 == 0 {
                Placement::Append
            } else {
                Placement::Top(top)
            };

            let vs = rng.random_range(1.0..2.0);
            stack.insert_layer(thickness, &iso(vs), placement).unwrap();
            assert_invariants(&stack);

            if let Placement::Top(z) = placement {
                if z > DEPTH_EPSILON && z < before {
                    assert_abs_diff_eq!(
                        stack.total_depth(),
                        before.max(z + thickness),
                        epsilon = 1e-6
                    );
                }
            }
        }
    }
}
