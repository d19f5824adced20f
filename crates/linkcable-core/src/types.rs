//! Core types for the linkcable exchange protocol
//!
//! This module defines the fundamental types used throughout the exchange
//! logic, using newtype patterns for semantic validation and type safety.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;

// ----------------------------------------------------------------------------
// Record Identity
// ----------------------------------------------------------------------------

/// Index of an exchangeable creature record within the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordIndex(u16);

impl RecordIndex {
    /// Create a new record index
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Get the raw index value
    pub const fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for RecordIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:03}", self.0)
    }
}

impl From<u16> for RecordIndex {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// One exchangeable creature record
///
/// Records are immutable value types. A move never mutates a record in
/// place; it removes the record from one collection and appends it to the
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub index: RecordIndex,
}

impl Record {
    /// Create a record for the given catalog index
    pub const fn new(index: RecordIndex) -> Self {
        Self { index }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}

// ----------------------------------------------------------------------------
// Operation Codes
// ----------------------------------------------------------------------------

/// Exchange direction carried in every wire frame
///
/// The wire values come from the peripheral's original enumeration
/// (trainer side = 1, storage side = 2). `ToParty` moves a record from
/// storage into the party; `ToStorage` moves it the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OpCode {
    ToParty = 1,
    ToStorage = 2,
}

impl OpCode {
    /// Wire value of this opcode
    pub const fn value(&self) -> u8 {
        *self as u8
    }

    /// The opposite exchange direction
    pub const fn inverse(&self) -> Self {
        match self {
            OpCode::ToParty => OpCode::ToStorage,
            OpCode::ToStorage => OpCode::ToParty,
        }
    }
}

impl TryFrom<u8> for OpCode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(OpCode::ToParty),
            2 => Ok(OpCode::ToStorage),
            other => Err(ProtocolError::UnknownOpCode { value: other }),
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpCode::ToParty => write!(f, "to-party"),
            OpCode::ToStorage => write!(f, "to-storage"),
        }
    }
}

// ----------------------------------------------------------------------------
// Catalog
// ----------------------------------------------------------------------------

/// Highest record index in the first-generation catalog
pub const DEFAULT_CATALOG_MAX: u16 = 151;

/// Default party roster, in display order
pub const DEFAULT_ROSTER: [u16; 6] = [151, 150, 149, 145, 143, 130];

/// The fixed set of valid record indices
///
/// Indices outside the catalog are rejected at the protocol boundary,
/// never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    max_index: u16,
}

impl Catalog {
    /// Create a catalog bounded by `max_index` (inclusive)
    pub const fn new(max_index: u16) -> Self {
        Self { max_index }
    }

    /// Inclusive upper bound of the catalog
    pub const fn max_index(&self) -> u16 {
        self.max_index
    }

    /// Check whether an index is a valid catalog entry
    pub const fn contains(&self, index: RecordIndex) -> bool {
        index.value() >= 1 && index.value() <= self.max_index
    }

    /// Validate an index, rejecting out-of-range values
    pub fn validate(&self, index: RecordIndex) -> Result<RecordIndex, ProtocolError> {
        if self.contains(index) {
            Ok(index)
        } else {
            Err(ProtocolError::IndexOutOfRange {
                index: index.value(),
                max: self.max_index,
            })
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG_MAX)
    }
}

// ----------------------------------------------------------------------------
// Peripheral Identity
// ----------------------------------------------------------------------------

/// Stable transport-level identifier for a sighted peripheral
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeripheralId(String);

impl PeripheralId {
    /// Create a peripheral identifier from its transport representation
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeripheralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptor for a discovered peripheral
///
/// Created on first sighting, retained for the scan session, discarded
/// when scanning restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeripheralHandle {
    /// Stable transport identifier
    pub id: PeripheralId,
    /// Advertised local name
    pub name: String,
    /// Signal strength at last sighting, if reported
    pub rssi: Option<i16>,
}

impl PeripheralHandle {
    /// Create a handle for a sighted peripheral
    pub fn new(id: PeripheralId, name: impl Into<String>, rssi: Option<i16>) -> Self {
        Self {
            id,
            name: name.into(),
            rssi,
        }
    }
}

impl fmt::Display for PeripheralHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Which field identifies a peripheral for deduplication
///
/// The original client deduplicated by advertised name, which collapses
/// two distinct same-named units into one entry. Both behaviors are
/// supported; name remains the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DedupKey {
    /// Deduplicate by advertised local name
    Name,
    /// Deduplicate by stable peripheral identifier
    Id,
}

impl Default for DedupKey {
    fn default() -> Self {
        DedupKey::Name
    }
}
