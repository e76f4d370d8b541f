//! Error handling for vmodel
//!
//! Every structural edit either applies completely or fails with one of
//! these errors and leaves the stack untouched.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ModelKind;

/// Result type alias for vmodel operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Main error type for vmodel operations
#[derive(Error, Debug)]
pub enum ModelError {
    // Structural Errors
    #[error("Invalid layer stack: {reason}")]
    InvalidLayerStack { reason: String },

    #[error("Invalid insertion: layer thickness must be positive (got {thickness})")]
    InvalidInsertion { thickness: f64 },

    #[error("Invalid depth range: [{zmin}, {zmax})")]
    InvalidDepthRange { zmin: f64, zmax: f64 },

    // Parameter Errors
    #[error("Parameter '{parameter}' is not valid for a {kind} model")]
    IncompatibleParameter { parameter: String, kind: ModelKind },

    #[error("Unknown model parameter: {name}")]
    UnknownParameter { name: String },

    #[error("Perturbation {fraction} is outside [-1, 1]")]
    OutOfRangePerturbation { fraction: f64 },

    #[error("F-modulus velocity undefined for vpv={vpv}, vsv={vsv} (vpv < sqrt(2)*vsv)")]
    UndefinedFModulus { vpv: f64, vsv: f64 },

    #[error("Operation '{operation}' is not supported for a {kind} model")]
    UnsupportedModelKind {
        operation: &'static str,
        kind: ModelKind,
    },

    #[error("Found {count} thin layers; thin layers must come in pairs")]
    UnpairedThinLayer { count: usize },

    // Format Errors
    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Snapshot checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    // File Errors
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ModelError::InvalidLayerStack { .. } => "INVALID_LAYER_STACK",
            ModelError::InvalidInsertion { .. } => "INVALID_INSERTION",
            ModelError::InvalidDepthRange { .. } => "INVALID_DEPTH_RANGE",
            ModelError::IncompatibleParameter { .. } => "INCOMPATIBLE_PARAMETER",
            ModelError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            ModelError::OutOfRangePerturbation { .. } => "OUT_OF_RANGE_PERTURBATION",
            ModelError::UndefinedFModulus { .. } => "UNDEFINED_F_MODULUS",
            ModelError::UnsupportedModelKind { .. } => "UNSUPPORTED_MODEL_KIND",
            ModelError::UnpairedThinLayer { .. } => "UNPAIRED_THIN_LAYER",
            ModelError::Parse { .. } => "PARSE_ERROR",
            ModelError::ChecksumMismatch { .. } => "CHECKSUM_MISMATCH",
            ModelError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ModelError::Io(_) => "IO_ERROR",
            ModelError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ModelError::IncompatibleParameter { .. } => vec![
                "Isotropic models use vp and vs",
                "Transverse-isotropic models use vpv, vsv, vph, vsh and vpf",
            ],
            ModelError::UnknownParameter { .. } => vec![
                "Valid names: vp, vs, vpv, vsv, vph, vsh, vpf, rho, qp, qs, etap, etas, frefp, frefs",
            ],
            ModelError::OutOfRangePerturbation { .. } => vec![
                "Perturbations are fractional: 0.1 means +10%",
                "Use a value between -1 and 1",
            ],
            ModelError::UndefinedFModulus { .. } => vec![
                "Provide vpf explicitly",
                "Check that vpv >= sqrt(2) * vsv",
            ],
            ModelError::UnpairedThinLayer { .. } => vec![
                "Lower the thinness threshold",
                "Split or thicken one of the thin layers so they pair up",
            ],
            ModelError::Parse { .. } => vec![
                "Check the file was written in model96 layout",
                "Transverse-isotropic models need two lines per layer",
            ],
            ModelError::ChecksumMismatch { .. } => vec![
                "The snapshot was edited or corrupted after it was saved",
                "Re-create the snapshot from the source model",
            ],
            ModelError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            _ => vec![],
        }
    }
}
