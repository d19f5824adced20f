//! Peripheral sighting filter and deduplication
//!
//! Scanning surfaces a monotonically growing, append-only list of
//! storage units for one scan session: sightings whose advertised name
//! lacks the unit marker are silently dropped, and repeat sightings of an
//! already-surfaced unit are discarded without updating the entry.

use smallvec::SmallVec;
use tracing::debug;

use crate::types::{DedupKey, PeripheralHandle};

// ----------------------------------------------------------------------------
// Peripheral Scanner
// ----------------------------------------------------------------------------

/// Filters and deduplicates scan sightings into a surfaced list
#[derive(Debug, Clone)]
pub struct PeripheralScanner {
    unit_marker: String,
    dedup_key: DedupKey,
    surfaced: Vec<PeripheralHandle>,
}

impl PeripheralScanner {
    /// Create a scanner for one session
    pub fn new(unit_marker: impl Into<String>, dedup_key: DedupKey) -> Self {
        Self {
            unit_marker: unit_marker.into(),
            dedup_key,
            surfaced: Vec::new(),
        }
    }

    /// Process one sighting, returning the handle if newly surfaced
    pub fn observe(&mut self, handle: PeripheralHandle) -> Option<&PeripheralHandle> {
        if !handle.name.contains(&self.unit_marker) {
            return None;
        }

        if self.is_duplicate(&handle) {
            return None;
        }

        debug!("surfaced storage unit: {}", handle);
        self.surfaced.push(handle);
        self.surfaced.last()
    }

    fn is_duplicate(&self, handle: &PeripheralHandle) -> bool {
        self.surfaced.iter().any(|known| match self.dedup_key {
            DedupKey::Name => known.name == handle.name,
            DedupKey::Id => known.id == handle.id,
        })
    }

    /// Surfaced peripherals, in sighting order
    pub fn peripherals(&self) -> SmallVec<[PeripheralHandle; 8]> {
        self.surfaced.iter().cloned().collect()
    }

    /// Look up a surfaced peripheral by advertised name
    pub fn find_by_name(&self, name: &str) -> Option<&PeripheralHandle> {
        self.surfaced.iter().find(|handle| handle.name == name)
    }

    /// Discard the session's surfaced list before a new scan
    pub fn reset(&mut self) {
        self.surfaced.clear();
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
