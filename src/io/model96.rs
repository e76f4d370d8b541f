//! Layered model text format
//!
//! ```text
//! MODEL.01
//! <model name>
//! ISOTROPIC | TRANSVERSE ISOTROPIC
//! KGS
//! FLAT EARTH
//! 1-D
//! CONSTANT VELOCITY
//! LINE08
//! LINE09
//! LINE10
//! LINE11
//! <column header, one line (isotropic) or two lines (TI)>
//! <one row per layer, TI layers continue with VPH VSH VPF on a second row>
//! ```
//!
//! Values are tab separated with six decimals.

use std::fs;
use std::path::Path;

use log::info;

use super::{at_line, parse_fields};
use crate::error::{ModelError, Result};
use crate::model::{
    CommonParams, LayerColumns, LayerParams, LayerStack, ModelHeader, ModelKind, Velocity,
    VelocityModel,
};

const PLACEHOLDER_LINES: [&str; 4] = ["LINE08", "LINE09", "LINE10", "LINE11"];

const ISOTROPIC_HEADER: &str =
    "\tH(KM)\tVP(KM/S)\tVS(KM/S)\tRHO(GM/CC)\tQP\tQS\tETAP\tETAS\tFREFP\tFREFS";
const TI_HEADER: [&str; 2] = [
    "\tH(KM)\tVPV(KM/S)\tVSV(KM/S)\tRHO(GM/CC)\tQP\tQS\tETAP\tETAS\tFREFP\tFREFS",
    "\tVPH(KM/S)\tVSH(KM/S)\tVPF(KM/S)",
];

fn row(values: &[f64]) -> String {
    let cells: Vec<String> = values.iter().map(|v| format!("{:.6}", v)).collect();
    cells.join("\t")
}

/// Render a model as text
///
/// Every value is rounded to six decimals, so reading the text back
/// reproduces each value to within 5e-7 (exactly only when it has at most
/// six decimals). Use a JSON snapshot for a lossless copy.
pub fn format_model(model: &VelocityModel) -> String {
    let header = &model.header;
    let stack = &model.stack;

    let mut lines = vec![
        header.version.clone(),
        header.name.clone(),
        stack.kind().to_string(),
        header.unit.clone(),
        header.earth.to_string(),
        header.boundary.to_string(),
        header.velocity.to_string(),
    ];
    lines.extend(PLACEHOLDER_LINES.iter().map(|s| s.to_string()));
    match stack.kind() {
        ModelKind::Isotropic => lines.push(ISOTROPIC_HEADER.to_string()),
        ModelKind::TransverseIsotropic => lines.extend(TI_HEADER.iter().map(|s| s.to_string())),
    }

    for (i, params) in (0..stack.len()).filter_map(|i| stack.layer(i).map(|p| (i, p))) {
        let c = &params.common;
        let common = [c.rho, c.qp, c.qs, c.etap, c.etas, c.frefp, c.frefs];
        let h = stack.thickness()[i];
        match params.velocity {
            Velocity::Isotropic { vp, vs } => {
                let mut values = vec![h, vp, vs];
                values.extend_from_slice(&common);
                lines.push(row(&values));
            }
            Velocity::TransverseIsotropic {
                vpv,
                vsv,
                vph,
                vsh,
                vpf,
            } => {
                let mut values = vec![h, vpv, vsv];
                values.extend_from_slice(&common);
                lines.push(row(&values));
                lines.push(row(&[vph, vsh, vpf]));
            }
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Parse model text
///
/// # Errors
/// `Parse` with the 1-based line number for a truncated header, an unknown
/// layer kind or flag, a malformed row, or a TI layer missing its second
/// row. Structural problems in the values (e.g. a zero thickness) surface
/// as `InvalidLayerStack`.
pub fn parse_model(text: &str) -> Result<VelocityModel> {
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end()).collect();
    let line = |n: usize| line_at(&lines, n);

    let kind: ModelKind = line(3)?.parse().map_err(|e| at_line(e, 3))?;
    let header = ModelHeader {
        version: line(1)?.trim().to_string(),
        name: line(2)?.trim().to_string(),
        unit: line(4)?.trim().to_string(),
        earth: line(5)?.parse().map_err(|e| at_line(e, 5))?,
        boundary: line(6)?.parse().map_err(|e| at_line(e, 6))?,
        velocity: line(7)?.parse().map_err(|e| at_line(e, 7))?,
    };

    let header_lines = match kind {
        ModelKind::Isotropic => 1,
        ModelKind::TransverseIsotropic => 2,
    };
    let first_row = 7 + PLACEHOLDER_LINES.len() + header_lines + 1;
    line(first_row - 1)?;

    let rows: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .skip(first_row - 1)
        .map(|(i, l)| (i + 1, *l))
        .filter(|(_, l)| !l.trim().is_empty())
        .collect();

    let mut columns = LayerColumns::with_capacity(kind, rows.len());
    match kind {
        ModelKind::Isotropic => {
            for (n, text) in rows {
                let v = parse_fields(text, n, 10)?;
                let params = LayerParams::isotropic(v[1], v[2], common_from(&v));
                columns.push(v[0], &params)?;
            }
        }
        ModelKind::TransverseIsotropic => {
            for pair in rows.chunks(2) {
                let (n, first) = pair[0];
                let (n2, second) = pair.get(1).copied().ok_or_else(|| ModelError::Parse {
                    line: n,
                    reason: "transverse-isotropic layer is missing its VPH VSH VPF row".to_string(),
                })?;
                let v = parse_fields(first, n, 10)?;
                let h = parse_fields(second, n2, 3)?;
                let params =
                    LayerParams::transverse_isotropic(v[1], v[2], h[0], h[1], h[2], common_from(&v));
                columns.push(v[0], &params)?;
            }
        }
    }

    Ok(VelocityModel::with_stack(header, LayerStack::from_columns(columns)?))
}

/// 1-based line lookup
fn line_at<'a>(lines: &[&'a str], n: usize) -> Result<&'a str> {
    lines.get(n - 1).copied().ok_or_else(|| ModelError::Parse {
        line: n,
        reason: "unexpected end of file".to_string(),
    })
}

fn common_from(v: &[f64]) -> CommonParams {
    CommonParams {
        rho: v[3],
        qp: v[4],
        qs: v[5],
        etap: v[6],
        etas: v[7],
        frefp: v[8],
        frefs: v[9],
    }
}

/// Write a model file
pub fn write_model(model: &VelocityModel, path: &Path) -> Result<()> {
    fs::write(path, format_model(model))?;
    info!(
        "Wrote {} model '{}' ({} layers) to {}",
        model.kind(),
        model.name(),
        model.stack.len(),
        path.display()
    );
    Ok(())
}

/// Read a model file
pub fn read_model(path: &Path) -> Result<VelocityModel> {
    if !path.exists() {
        return Err(ModelError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let model = parse_model(&fs::read_to_string(path)?)?;
    info!(
        "Read {} model '{}' ({} layers, {:.3} km) from {}",
        model.kind(),
        model.name(),
        model.stack.len(),
        model.stack.total_depth(),
        path.display()
    );
    Ok(model)
}
