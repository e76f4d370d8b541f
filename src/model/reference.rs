//! Reference earth models
//!
//! A built-in layered rendition of the AK135 continental model down to the
//! 410 km discontinuity, and a loader for 10-column reference databases
//! (`H VP VS RHO QP QS ETAP ETAS FREFP FREFS`).

use std::fs;
use std::path::Path;

use log::info;

use super::columns::LayerColumns;
use super::params::{f_modulus_velocity, CommonParams, LayerParams, ModelKind};
use super::stack::LayerStack;
use crate::error::{ModelError, Result};
use crate::io::parse_fields;

/// Name given to models built from the AK135 table
pub const AK135_NAME: &str = "AK135 CONTINENTAL MODEL";

/// Bulk quality factor used for every AK135 layer
const AK135_QKAPPA: f64 = 57822.0;

/// (thickness km, vp km/s, vs km/s, rho g/cm^3, Q_mu)
const AK135_LAYERS: [(f64, f64, f64, f64, f64); 10] = [
    (20.0, 5.8000, 3.4600, 2.7200, 600.0),
    (15.0, 6.5000, 3.8500, 2.9200, 600.0),
    (42.5, 8.0400, 4.4800, 3.3198, 600.0),
    (42.5, 8.0450, 4.4900, 3.3455, 80.0),
    (45.0, 8.0500, 4.5000, 3.3713, 80.0),
    (45.0, 8.1750, 4.5090, 3.3985, 80.0),
    (50.0, 8.3007, 4.5184, 3.4258, 143.0),
    (50.0, 8.4822, 4.6094, 3.4561, 143.0),
    (50.0, 8.6650, 4.6964, 3.4864, 143.0),
    (50.0, 8.8476, 4.7832, 3.5167, 143.0),
];

/// P quality factor from shear and bulk quality factors
///
/// `1/Qp = L/Qmu + (1 - L)/Qkappa` with `L = 4/3 (vs/vp)^2`.
pub fn qp_from_qmu(vp: f64, vs: f64, qmu: f64, qkappa: f64) -> f64 {
    let l = 4.0 / 3.0 * (vs / vp).powi(2);
    1.0 / (l / qmu + (1.0 - l) / qkappa)
}

/// Isotropic or transverse-isotropic layer from isotropic velocities
fn layer_params(kind: ModelKind, vp: f64, vs: f64, common: CommonParams) -> Result<LayerParams> {
    match kind {
        ModelKind::Isotropic => Ok(LayerParams::isotropic(vp, vs, common)),
        ModelKind::TransverseIsotropic => {
            let vpf = f_modulus_velocity(vp, vs).ok_or(ModelError::UndefinedFModulus { vpv: vp, vsv: vs })?;
            Ok(LayerParams::transverse_isotropic(vp, vs, vp, vs, vpf, common))
        }
    }
}

/// The built-in AK135 layering
pub fn ak135(kind: ModelKind) -> Result<LayerStack> {
    let mut columns = LayerColumns::with_capacity(kind, AK135_LAYERS.len());
    for &(h, vp, vs, rho, qmu) in AK135_LAYERS.iter() {
        let common = CommonParams::new(rho, qp_from_qmu(vp, vs, qmu, AK135_QKAPPA), qmu);
        columns.push(h, &layer_params(kind, vp, vs, common)?)?;
    }
    LayerStack::from_columns(columns)
}

/// Parse a 10-column reference database
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_database(text: &str, kind: ModelKind) -> Result<LayerStack> {
    let mut columns = LayerColumns::empty(kind);
    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let v = parse_fields(trimmed, i + 1, 10)?;
        let common = CommonParams {
            rho: v[3],
            qp: v[4],
            qs: v[5],
            etap: v[6],
            etas: v[7],
            frefp: v[8],
            frefs: v[9],
        };
        columns.push(v[0], &layer_params(kind, v[1], v[2], common)?)?;
    }
    LayerStack::from_columns(columns)
}

/// Load a reference database file
pub fn load_database(path: &Path, kind: ModelKind) -> Result<LayerStack> {
    if !path.exists() {
        return Err(ModelError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let stack = parse_database(&fs::read_to_string(path)?, kind)?;
    info!(
        "Loaded reference model {} ({} layers, {:.1} km)",
        path.display(),
        stack.len(),
        stack.total_depth()
    );
    Ok(stack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::params::Parameter;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ak135_isotropic() {
        let stack = ak135(ModelKind::Isotropic).unwrap();

        assert_eq!(stack.len(), 10);
        assert_abs_diff_eq!(stack.total_depth(), 410.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stack.depth_of(1).unwrap(), 35.0, epsilon = 1e-9);
        assert_eq!(stack.column(Parameter::Vs).unwrap()[0], 3.46);
        assert_eq!(stack.column(Parameter::Qs).unwrap()[3], 80.0);
    }

    #[test]
    fn test_ak135_ti() {
        let stack = ak135(ModelKind::TransverseIsotropic).unwrap();

        assert_eq!(stack.column(Parameter::Vph).unwrap(), stack.column(Parameter::Vpv).unwrap());
        assert_eq!(stack.column(Parameter::Vsh).unwrap(), stack.column(Parameter::Vsv).unwrap());
        let vpf = stack.column(Parameter::Vpf).unwrap()[0];
        assert_abs_diff_eq!(vpf, (5.8_f64.powi(2) - 2.0 * 3.46_f64.powi(2)).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_qp_from_qmu() {
        // A Poisson solid with an infinite bulk Q gives Qp = 9/4 Qmu
        let vs = 1.0;
        let vp = 3.0_f64.sqrt();
        assert_abs_diff_eq!(qp_from_qmu(vp, vs, 100.0, f64::INFINITY), 225.0, epsilon = 1e-9);
    }

    #[test]
    fn test_parse_database() {
        let text = "# H VP VS RHO QP QS ETAP ETAS FREFP FREFS\n\
                    10 6.0 3.5 2.7 600 300 0 0 1 1\n\
                    \n\
                    20 8.0 4.5 3.3 800 400 0 0 1 1\n";
        let stack = parse_database(text, ModelKind::Isotropic).unwrap();

        assert_eq!(stack.thickness(), &[10.0, 20.0]);
        assert_eq!(stack.column(Parameter::Qp).unwrap(), &[600.0, 800.0]);
    }

    #[test]
    fn test_parse_database_short_row() {
        let err = parse_database("10 6.0 3.5\n", ModelKind::Isotropic).unwrap_err();
        match err {
            ModelError::Parse { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
