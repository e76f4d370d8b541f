//! Thin-layer merging for simplified isotropic models

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::columns::LayerColumns;
use super::params::{LayerParams, ModelKind};
use super::stack::LayerStack;
use crate::error::{ModelError, Result};

/// Tunables for [`LayerStack::merge_thin_layers`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Layers thinner than this (km) are merged in pairs
    pub thin_threshold_km: f64,
    /// Keep at most this many layers after merging
    pub max_layers: Option<usize>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            thin_threshold_km: 1.0,
            max_layers: Some(200),
        }
    }
}

/// What a merge changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
    pub merged_pairs: usize,
    /// Layers dropped from the bottom to honour `max_layers`
    pub truncated: usize,
}

impl LayerStack {
    /// Merge sub-threshold layers pairwise
    ///
    /// Thin layers are taken in stack order and paired first with second,
    /// third with fourth, and so on. Each pair becomes one layer at the
    /// position of its first member, with the summed thickness and the
    /// arithmetic mean of every parameter.
    ///
    /// Pairing ignores adjacency: when thick layers separate the two
    /// members, the merged layer sits at the first member's depth, so the
    /// deeper member's material moves up and every layer in between shifts
    /// down by its thickness. Total depth is unchanged.
    ///
    /// # Errors
    /// - `UnsupportedModelKind` for transverse-isotropic stacks
    /// - `UnpairedThinLayer` if the number of thin layers is odd
    pub fn merge_thin_layers(&mut self, options: &MergeOptions) -> Result<MergeReport> {
        if self.kind() != ModelKind::Isotropic {
            return Err(ModelError::UnsupportedModelKind {
                operation: "merge thin layers",
                kind: self.kind(),
            });
        }

        let thin: Vec<usize> = self
            .thickness()
            .iter()
            .enumerate()
            .filter(|(_, h)| **h < options.thin_threshold_km)
            .map(|(i, _)| i)
            .collect();
        if thin.len() % 2 != 0 {
            return Err(ModelError::UnpairedThinLayer { count: thin.len() });
        }

        // partner[i] = Some(j) for the first member of a pair, None for the second
        let mut partner: Vec<Option<Option<usize>>> = vec![None; self.len()];
        for pair in thin.chunks_exact(2) {
            partner[pair[0]] = Some(Some(pair[1]));
            partner[pair[1]] = Some(None);
        }

        let mut columns = LayerColumns::with_capacity(self.kind(), self.len() - thin.len() / 2);
        for (i, role) in partner.iter().enumerate() {
            let params = self.merge_params_at(i)?;
            match role {
                None => columns.push(self.thickness()[i], &params)?,
                Some(Some(j)) => {
                    let other = self.merge_params_at(*j)?;
                    let thickness = self.thickness()[i] + self.thickness()[*j];
                    columns.push(thickness, &mean_params(&params, &other))?;
                }
                Some(None) => {}
            }
        }

        let mut truncated = 0;
        if let Some(max) = options.max_layers {
            if columns.len() > max {
                truncated = columns.len() - max;
                warn!("Merged model has {} layers; keeping the top {}", columns.len(), max);
                columns.truncate(max);
            }
        }

        self.commit(columns)?;
        let report = MergeReport {
            merged_pairs: thin.len() / 2,
            truncated,
        };
        info!(
            "Merged {} thin layer pairs (threshold {} km); {} layers remain",
            report.merged_pairs,
            options.thin_threshold_km,
            self.len()
        );
        Ok(report)
    }

    fn merge_params_at(&self, index: usize) -> Result<LayerParams> {
        self.layer(index).ok_or_else(|| ModelError::InvalidLayerStack {
            reason: format!("layer {} missing from {} layers", index, self.len()),
        })
    }
}

/// Arithmetic mean of two layers of the same kind
fn mean_params(a: &LayerParams, b: &LayerParams) -> LayerParams {
    let mut out = *a;
    for param in a.kind().parameters() {
        if let (Some(x), Some(y), Some(slot)) = (a.get(param), b.get(param), out.get_mut(param)) {
            *slot = (x + y) / 2.0;
        }
    }
    out
}
