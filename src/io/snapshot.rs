//! JSON model snapshots
//!
//! A snapshot stores the header and the full column set of a model together
//! with a SHA-256 checksum of the serialized columns, so a tampered or
//! truncated file is rejected on load instead of producing a wrong model.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{ModelError, Result};
use crate::model::{LayerColumns, LayerStack, ModelHeader, VelocityModel};

/// Current snapshot document version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized model with integrity metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub id: String,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub header: ModelHeader,
    pub columns: LayerColumns,
    /// Hex SHA-256 of the JSON-serialized columns
    pub checksum: String,
}

fn columns_checksum(columns: &LayerColumns) -> Result<String> {
    let bytes = serde_json::to_vec(columns)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

impl ModelSnapshot {
    /// Snapshot the current state of a model
    pub fn capture(model: &VelocityModel) -> Result<Self> {
        let columns = model.stack.columns().clone();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            header: model.header.clone(),
            checksum: columns_checksum(&columns)?,
            columns,
        })
    }

    /// Check the stored checksum against the columns
    ///
    /// # Errors
    /// `ChecksumMismatch` if the columns were altered after capture
    pub fn verify(&self) -> Result<()> {
        let actual = columns_checksum(&self.columns)?;
        if actual != self.checksum {
            return Err(ModelError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Rebuild the model, re-validating the layer stack
    pub fn restore(&self) -> Result<VelocityModel> {
        self.verify()?;
        let stack = LayerStack::from_columns(self.columns.clone())?;
        Ok(VelocityModel::with_stack(self.header.clone(), stack))
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!("Saved snapshot {} to {}", self.id, path.display());
        Ok(())
    }

    /// Load a snapshot and verify its checksum
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ModelError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let reader = BufReader::new(File::open(path)?);
        let snapshot: ModelSnapshot = serde_json::from_reader(reader)?;
        snapshot.verify()?;
        info!(
            "Loaded snapshot {} of '{}' taken {}",
            snapshot.id,
            snapshot.header.name,
            snapshot.created_at.to_rfc3339()
        );
        Ok(snapshot)
    }
}
