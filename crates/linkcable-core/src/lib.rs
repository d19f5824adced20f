//! Core exchange logic for linkcable
//!
//! linkcable connects a client to one nearby storage unit over a
//! short-range radio link and exchanges creature records between the
//! client-held party and the unit-held storage collection.
//!
//! ## Architecture
//!
//! - [`types`] - Record, opcode, catalog, and peripheral identity types
//! - [`errors`] - Error taxonomy and the crate `Result` alias
//! - [`codec`] - The fixed three-byte exchange frame
//! - [`store`] - The two-collection model and atomic moves
//! - [`scanner`] - Sighting filter and deduplication
//! - [`manager`] - The connection lifecycle state machine and event pump
//! - [`transport`] - The abstract peripheral transport boundary
//! - [`permission`] - The radio permission boundary
//! - [`config`] - Session configuration and fixed identifiers
//!
//! Radio specifics live in transport implementations such as
//! `linkcable-ble`; this crate is platform-agnostic and fully testable
//! against an in-memory transport.

pub mod codec;
pub mod config;
pub mod errors;
pub mod manager;
pub mod permission;
pub mod scanner;
pub mod store;
pub mod transport;
pub mod types;

// Public API exports
pub use codec::{ExchangeFrame, FRAME_LEN};
pub use config::{
    ExchangeConfig, DEFAULT_UNIT_MARKER, EXCHANGE_CHARACTERISTIC_UUID, EXCHANGE_SERVICE_UUID,
};
pub use errors::{LinkcableError, ProtocolError, Result, TransportError};
pub use manager::{ConnectionManager, LinkState};
pub use permission::{AlwaysGranted, PermissionGate};
pub use scanner::PeripheralScanner;
pub use store::{CollectionSnapshot, CollectionStore, MoveOutcome};
pub use transport::{
    event_channel, PeripheralTransport, TransportEvent, TransportEventReceiver,
    TransportEventSender,
};
pub use types::{
    Catalog, DedupKey, OpCode, PeripheralHandle, PeripheralId, Record, RecordIndex,
    DEFAULT_CATALOG_MAX, DEFAULT_ROSTER,
};
