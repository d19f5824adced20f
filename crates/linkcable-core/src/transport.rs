//! Peripheral transport abstraction
//!
//! The core never talks to a radio stack directly. A transport
//! implementation is injected into the [`ConnectionManager`] at
//! construction and pushes typed events onto an unbounded channel whose
//! receiver the manager drains in delivery order.
//!
//! [`ConnectionManager`]: crate::manager::ConnectionManager

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::Result;
use crate::types::{PeripheralHandle, PeripheralId};

// ----------------------------------------------------------------------------
// Transport Events
// ----------------------------------------------------------------------------

/// Events pushed by the transport into the core loop
///
/// Frame events are delivered in transport order; moves are not
/// commutative, so the core never reorders or batches them.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A peripheral was sighted while scanning
    Sighting(PeripheralHandle),
    /// A notification payload arrived on the exchange characteristic
    Frame(Vec<u8>),
    /// The scan hit a transient transport error; scanning continues
    ScanError(String),
    /// The transport reported the active connection dropped
    Disconnected(String),
}

/// Sender half handed to a transport at construction
pub type TransportEventSender = mpsc::UnboundedSender<TransportEvent>;

/// Receiver half owned by the connection manager
pub type TransportEventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// Create the event channel connecting a transport to the core loop
pub fn event_channel() -> (TransportEventSender, TransportEventReceiver) {
    mpsc::unbounded_channel()
}

// ----------------------------------------------------------------------------
// Transport Trait
// ----------------------------------------------------------------------------

/// Abstract peripheral transport capability
///
/// Implementations own the radio-stack specifics (adapter handling, GATT
/// plumbing) and surface sightings and frames through the event channel.
/// All methods are the only suspension points in the core; `stop_scan`
/// and `disconnect` must be safe to call at any time, including
/// mid-connect.
#[async_trait]
pub trait PeripheralTransport: Send {
    /// Begin an unbounded discovery stream; sightings arrive as events
    async fn start_scan(&mut self) -> Result<()>;

    /// Halt the discovery stream without touching surfaced handles
    async fn stop_scan(&mut self) -> Result<()>;

    /// Establish a connection to the identified peripheral
    async fn connect(&mut self, id: &PeripheralId) -> Result<()>;

    /// Run full service and characteristic discovery on the connection
    async fn discover_services(&mut self) -> Result<()>;

    /// Subscribe to the exchange characteristic's notification stream
    async fn subscribe(&mut self) -> Result<()>;

    /// Write one encoded frame to the exchange characteristic
    async fn send_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Tear down the active connection; a no-op when none exists
    async fn disconnect(&mut self) -> Result<()>;
}
