//! Bluetooth Low Energy transport for linkcable
//!
//! This crate implements the `PeripheralTransport` boundary from
//! `linkcable-core` over btleplug, so the exchange core can talk to a
//! real storage unit.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use linkcable_ble::BleTransport;
//! use linkcable_core::{event_channel, AlwaysGranted, ConnectionManager, ExchangeConfig};
//!
//! # async fn example() {
//! let config = ExchangeConfig::default();
//! let (event_tx, event_rx) = event_channel();
//! let transport = BleTransport::new(config.clone(), event_tx);
//! let manager = ConnectionManager::new(
//!     config,
//!     Box::new(transport),
//!     Box::new(AlwaysGranted),
//!     event_rx,
//! );
//! # let _ = manager;
//! # }
//! ```
//!
//! The transport forwards scan sightings, notification frames, and link
//! drops onto the manager's event channel; the manager drains them in
//! order.

mod error;
mod transport;

// Public API exports
pub use error::BleTransportError;
pub use transport::BleTransport;

// Re-export the boundary trait for convenience
pub use linkcable_core::PeripheralTransport;
