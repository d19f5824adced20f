//! Exchange session configuration

use std::time::Duration;

use uuid::Uuid;

use crate::types::{Catalog, DedupKey, RecordIndex, DEFAULT_ROSTER};

// ----------------------------------------------------------------------------
// Fixed Identifiers
// ----------------------------------------------------------------------------

/// GATT service the storage unit exposes
pub const EXCHANGE_SERVICE_UUID: Uuid = Uuid::from_u128(0xD78A31FE_E14F_4F6A_A107_790AB0D58F27);

/// The single bidirectional exchange characteristic
pub const EXCHANGE_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0xEBE6204C_C1EE_4D09_97B8_F77F360F7372);

/// Advertised-name marker identifying a storage unit
pub const DEFAULT_UNIT_MARKER: &str = "Bill's PC";

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for one exchange session
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExchangeConfig {
    /// Substring a peripheral's advertised name must contain to surface
    pub unit_marker: String,
    /// Which field deduplicates repeat sightings
    pub dedup_key: DedupKey,
    /// Maximum time to wait for a connection
    pub connection_timeout: Duration,
    /// Valid record index range
    pub catalog: Catalog,
    /// Starting party roster, in display order
    pub roster: Vec<RecordIndex>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            unit_marker: DEFAULT_UNIT_MARKER.to_string(),
            dedup_key: DedupKey::default(),
            connection_timeout: Duration::from_secs(5),
            catalog: Catalog::default(),
            roster: DEFAULT_ROSTER.map(RecordIndex::new).to_vec(),
        }
    }
}

impl ExchangeConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage-unit name marker
    pub fn with_unit_marker(mut self, marker: impl Into<String>) -> Self {
        self.unit_marker = marker.into();
        self
    }

    /// Set the dedup key
    pub fn with_dedup_key(mut self, key: DedupKey) -> Self {
        self.dedup_key = key;
        self
    }

    /// Set the connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the catalog bound
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set the starting party roster
    pub fn with_roster(mut self, roster: Vec<RecordIndex>) -> Self {
        self.roster = roster;
        self
    }
}
