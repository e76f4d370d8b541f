//! File adapters
//!
//! Text and JSON formats that move models in and out of the core. The core
//! never parses or formats text itself; these adapters go through the
//! column-wise `LayerColumns` interface.

pub mod layer_table;
pub mod model96;
pub mod snapshot;

pub use layer_table::{apply_layer_table, parse_layer_table, TableRow};
pub use model96::{format_model, parse_model, read_model, write_model};
pub use snapshot::ModelSnapshot;

use crate::error::{ModelError, Result};

/// Parse the first `expected` whitespace-separated numbers of a line
///
/// `line_no` is 1-based and only used for error reporting.
pub(crate) fn parse_fields(line: &str, line_no: usize, expected: usize) -> Result<Vec<f64>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < expected {
        return Err(ModelError::Parse {
            line: line_no,
            reason: format!("expected {} columns, found {}", expected, fields.len()),
        });
    }
    fields[..expected]
        .iter()
        .map(|field| {
            field.parse::<f64>().map_err(|_| ModelError::Parse {
                line: line_no,
                reason: format!("'{}' is not a number", field),
            })
        })
        .collect()
}

/// Attach a line number to a parse error raised without one
pub(crate) fn at_line(err: ModelError, line_no: usize) -> ModelError {
    match err {
        ModelError::Parse { line: 0, reason } => ModelError::Parse {
            line: line_no,
            reason,
        },
        other => other,
    }
}
