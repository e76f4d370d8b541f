//! Layer insertion tables
//!
//! A whitespace table whose first line names the columns:
//!
//! ```text
//! # z0 H vs vp rho
//! 0.0  2.0  1.8  3.4  2.1
//! 10.0 5.0  3.2
//! ```
//!
//! `z0`, `H` and `vs` are required, `vp` and `rho` are optional and default
//! through the empirical crustal relations. Columns may come in any order.
//! Every row is applied as one layer insertion at top depth `z0`.

use std::fs;
use std::path::Path;

use log::{debug, info};

use super::parse_fields;
use crate::error::{ModelError, Result};
use crate::model::{InsertionCase, LayerSpec, LayerStack, Placement};

/// One row of a layer table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRow {
    /// Top depth of the new layer (km)
    pub z0: f64,
    pub thickness: f64,
    pub vs: f64,
    pub vp: Option<f64>,
    pub rho: Option<f64>,
}

impl TableRow {
    pub fn spec(&self) -> LayerSpec {
        let mut spec = LayerSpec::new(self.vs);
        if let Some(vp) = self.vp {
            spec = spec.with_vp(vp);
        }
        if let Some(rho) = self.rho {
            spec = spec.with_rho(rho);
        }
        spec
    }
}

/// Column positions named by the table header
struct Columns {
    z0: usize,
    thickness: usize,
    vs: usize,
    vp: Option<usize>,
    rho: Option<usize>,
    count: usize,
}

fn parse_header(line: &str, line_no: usize) -> Result<Columns> {
    let names: Vec<String> = line
        .strip_prefix('#')
        .ok_or_else(|| ModelError::Parse {
            line: line_no,
            reason: "layer table must start with a '# z0 H vs' header".to_string(),
        })?
        .split_whitespace()
        .map(|name| name.to_ascii_lowercase())
        .collect();

    let find = |name: &str| names.iter().position(|n| n == name);
    let required = |name: &str| {
        find(name).ok_or_else(|| ModelError::Parse {
            line: line_no,
            reason: format!("layer table header has no '{}' column", name),
        })
    };

    Ok(Columns {
        z0: required("z0")?,
        thickness: required("h")?,
        vs: required("vs")?,
        vp: find("vp"),
        rho: find("rho"),
        count: names.len(),
    })
}

/// Parse a layer table
pub fn parse_layer_table(text: &str) -> Result<Vec<TableRow>> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (header_no, header) = lines.next().ok_or_else(|| ModelError::Parse {
        line: 1,
        reason: "empty layer table".to_string(),
    })?;
    let columns = parse_header(header, header_no)?;

    let mut rows = Vec::new();
    for (n, line) in lines {
        if line.starts_with('#') {
            continue;
        }
        let v = parse_fields(line, n, columns.count)?;
        rows.push(TableRow {
            z0: v[columns.z0],
            thickness: v[columns.thickness],
            vs: v[columns.vs],
            vp: columns.vp.map(|i| v[i]),
            rho: columns.rho.map(|i| v[i]),
        });
    }
    Ok(rows)
}

/// Read a layer table file
pub fn read_layer_table(path: &Path) -> Result<Vec<TableRow>> {
    if !path.exists() {
        return Err(ModelError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    parse_layer_table(&fs::read_to_string(path)?)
}

/// Insert every row into `stack`, in table order
///
/// Rows are applied to a copy first; if any insertion fails the stack is
/// left unchanged.
pub fn apply_layer_table(stack: &mut LayerStack, rows: &[TableRow]) -> Result<Vec<InsertionCase>> {
    let mut work = stack.clone();
    let mut cases = Vec::with_capacity(rows.len());
    for row in rows {
        let case = work.insert_spec(row.thickness, &row.spec(), Placement::Top(row.z0))?;
        debug!("Table row at z0 = {} km: {:?}", row.z0, case);
        cases.push(case);
    }
    *stack = work;
    info!(
        "Applied {} table layers; model now has {} layers over {:.3} km",
        rows.len(),
        stack.len(),
        stack.total_depth()
    );
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{brocher_rho, brocher_vp, CommonParams, LayerParams, ModelKind, Parameter};
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_any_column_order() {
        let rows = parse_layer_table("# vs H z0 rho\n3.2 5.0 10.0 2.6\n\n1.8 2 0 2.1\n").unwrap();

        assert_eq!(
            rows,
            vec![
                TableRow {
                    z0: 10.0,
                    thickness: 5.0,
                    vs: 3.2,
                    vp: None,
                    rho: Some(2.6)
                },
                TableRow {
                    z0: 0.0,
                    thickness: 2.0,
                    vs: 1.8,
                    vp: None,
                    rho: Some(2.1)
                },
            ]
        );
    }

    #[test]
    fn test_parse_missing_required_column() {
        match parse_layer_table("# z0 vs\n0 3.0\n").unwrap_err() {
            ModelError::Parse { line, reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("'h'"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_requires_header() {
        assert!(parse_layer_table("0 2 3.0\n").is_err());
    }

    #[test]
    fn test_apply_defaults_missing_values() {
        let mut stack = LayerStack::new(ModelKind::Isotropic);
        stack
            .append_layer(20.0, &LayerParams::isotropic(6.0, 3.5, CommonParams::new(2.7, 600.0, 300.0)))
            .unwrap();
        let rows = parse_layer_table("# z0 H vs\n5 2 3.0\n").unwrap();

        let cases = apply_layer_table(&mut stack, &rows).unwrap();

        assert_eq!(cases.len(), 1);
        assert_eq!(stack.thickness(), &[5.0, 2.0, 13.0]);
        let vp = brocher_vp(3.0);
        assert_abs_diff_eq!(stack.column(Parameter::Vp).unwrap()[1], vp, epsilon = 1e-12);
        assert_abs_diff_eq!(stack.column(Parameter::Rho).unwrap()[1], brocher_rho(vp), epsilon = 1e-12);
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut stack = LayerStack::new(ModelKind::Isotropic);
        stack
            .append_layer(20.0, &LayerParams::isotropic(6.0, 3.5, CommonParams::new(2.7, 600.0, 300.0)))
            .unwrap();
        let before = stack.clone();
        let rows = parse_layer_table("# z0 H vs\n5 2 3.0\n8 -1 3.0\n").unwrap();

        let err = apply_layer_table(&mut stack, &rows).unwrap_err();

        assert_eq!(err.error_code(), "INVALID_INSERTION");
        assert_eq!(stack, before);
    }
}
