//! Data-driven pool configuration.
//!
//! Pools can be declared in data instead of code: a JSON array of rows, each
//! naming a kind and how many instances to pre-allocate:
//!
//! ```json
//! [
//!     { "type": "Bullet", "amountOfObjects": 32 },
//!     { "type": "MuzzleFlash", "amountOfObjects": 8 }
//! ]
//! ```
//!
//! The table is loaded before session start and converted into the
//! [`PoolSpec`] list [`SessionConfig`](crate::session::SessionConfig)
//! consumes. Wire names are camelCase to match the tables the original
//! tooling exports.

use std::path::Path;

use serde::{Deserialize, Serialize};

use roost_pool::registry::PoolSpec;

// ---------------------------------------------------------------------------
// PoolTable
// ---------------------------------------------------------------------------

/// One row of the pool table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTableRow {
    /// The kind to pool.
    #[serde(rename = "type")]
    pub kind: String,
    /// How many instances the pool pre-allocates.
    #[serde(rename = "amountOfObjects")]
    pub amount_of_objects: usize,
}

/// The loaded pool table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolTable {
    pub rows: Vec<PoolTableRow>,
}

impl PoolTable {
    /// Parse a table from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, anyhow::Error> {
        serde_json::from_str(json).map_err(|e| anyhow::anyhow!("failed to parse pool table: {e}"))
    }

    /// Load a table from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("failed to read pool table '{}': {e}", path.display())
        })?;
        Self::from_json_str(&text)
    }

    /// Convert into the spec list the registry consumes.
    pub fn into_specs(self) -> Vec<PoolSpec> {
        self.rows
            .into_iter()
            .map(|row| PoolSpec::new(row.kind, row.amount_of_objects))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
