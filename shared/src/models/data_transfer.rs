//! Import/export wire types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reconciliation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Create or update matched rows, never delete
    #[default]
    Smart,
    /// Smart, then delete stored products whose part number is absent from the file
    Strict,
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smart" => Ok(Self::Smart),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown import mode '{other}'")),
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Smart => "smart",
            Self::Strict => "strict",
        })
    }
}

/// Uploaded file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl FromStr for ImportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xls" => Ok(Self::Xlsx),
            other => Err(format!("unsupported import format '{other}'")),
        }
    }
}

/// Failure of a single input row (1-based data row number)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// Import outcome. `success + updated + failed` equals the row count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Newly created products
    pub success: usize,
    pub updated: usize,
    pub failed: usize,
    /// Only present in strict mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<usize>,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    pub fn processed(&self) -> usize {
        self.success + self.updated + self.failed
    }
}

/// Product that a strict import would remove
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionCandidate {
    pub id: i64,
    pub part_number: String,
    pub name: String,
}

/// Dry-run result for a strict import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportPreview {
    pub rows: usize,
    pub to_create: usize,
    pub to_update: usize,
    pub invalid: usize,
    pub to_delete: Vec<DeletionCandidate>,
}
