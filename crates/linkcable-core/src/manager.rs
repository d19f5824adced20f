//! Connection lifecycle management
//!
//! [`ConnectionManager`] owns the single active link to a storage unit
//! and drives it through the lifecycle state machine:
//!
//! ```text
//! Idle -> Scanning -> Connecting -> Discovering -> Subscribing -> Ready
//! Connecting/Discovering/Subscribing -> Idle   [failure, surfaced]
//! any -> Idle                                  [disconnect()]
//! ```
//!
//! It is also the single consumer of the transport event channel: scan
//! sightings feed the scanner, inbound frames are decoded and applied to
//! the collection store in delivery order, and transport drops return the
//! manager to idle.

use tracing::{debug, info, warn};

use crate::codec::ExchangeFrame;
use crate::config::ExchangeConfig;
use crate::errors::{LinkcableError, Result};
use crate::permission::PermissionGate;
use crate::scanner::PeripheralScanner;
use crate::store::{CollectionSnapshot, CollectionStore, MoveOutcome};
use crate::transport::{PeripheralTransport, TransportEvent, TransportEventReceiver};
use crate::types::{OpCode, PeripheralHandle, RecordIndex};

use smallvec::SmallVec;

// ----------------------------------------------------------------------------
// Link State
// ----------------------------------------------------------------------------

/// Lifecycle state of the single link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No scan, no connection
    Idle,
    /// Discovery stream running
    Scanning,
    /// Connection attempt in flight
    Connecting,
    /// Service and characteristic discovery in flight
    Discovering,
    /// Subscribing to the exchange characteristic
    Subscribing,
    /// Subscribed; frames flow
    Ready,
}

impl LinkState {
    /// State name for logging
    pub fn name(&self) -> &'static str {
        match self {
            LinkState::Idle => "Idle",
            LinkState::Scanning => "Scanning",
            LinkState::Connecting => "Connecting",
            LinkState::Discovering => "Discovering",
            LinkState::Subscribing => "Subscribing",
            LinkState::Ready => "Ready",
        }
    }

    fn has_link(&self) -> bool {
        matches!(
            self,
            LinkState::Connecting
                | LinkState::Discovering
                | LinkState::Subscribing
                | LinkState::Ready
        )
    }
}

// ----------------------------------------------------------------------------
// Connection Manager
// ----------------------------------------------------------------------------

/// Owns the transport, the scanner, and the collection store
///
/// The transport and permission gate are injected at construction so
/// tests can substitute fakes; the manager is the single owner of all
/// mutable exchange state and requires no locking of its own.
pub struct ConnectionManager {
    config: ExchangeConfig,
    transport: Box<dyn PeripheralTransport>,
    permission: Box<dyn PermissionGate>,
    events: TransportEventReceiver,
    scanner: PeripheralScanner,
    store: CollectionStore,
    state: LinkState,
    connected: Option<PeripheralHandle>,
    scan_active: bool,
    /// Attempt generation; bumped by every connect and disconnect so a
    /// cancelled attempt resuming late cannot mutate newer state.
    attempt: u64,
}

impl ConnectionManager {
    /// Create a manager over an injected transport and permission gate
    pub fn new(
        config: ExchangeConfig,
        transport: Box<dyn PeripheralTransport>,
        permission: Box<dyn PermissionGate>,
        events: TransportEventReceiver,
    ) -> Self {
        let scanner = PeripheralScanner::new(config.unit_marker.clone(), config.dedup_key);
        let store = CollectionStore::new(config.roster.iter().copied());
        Self {
            config,
            transport,
            permission,
            events,
            scanner,
            store,
            state: LinkState::Idle,
            connected: None,
            scan_active: false,
            attempt: 0,
        }
    }

    // ------------------------------------------------------------------
    // Display boundary accessors
    // ------------------------------------------------------------------

    /// Current lifecycle state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// The unit currently linked, if any
    pub fn connected_unit(&self) -> Option<&PeripheralHandle> {
        self.connected.as_ref()
    }

    /// Read-only snapshot of both collections
    pub fn snapshot(&self) -> CollectionSnapshot {
        self.store.snapshot()
    }

    /// Surfaced storage units, in sighting order
    pub fn peripherals(&self) -> SmallVec<[PeripheralHandle; 8]> {
        self.scanner.peripherals()
    }

    /// Look up a surfaced unit by advertised name
    pub fn find_unit(&self, name: &str) -> Option<PeripheralHandle> {
        self.scanner.find_by_name(name).cloned()
    }

    // ------------------------------------------------------------------
    // Scanning
    // ------------------------------------------------------------------

    /// Check permission and start the discovery stream
    ///
    /// Denied permission surfaces as [`LinkcableError::PermissionDenied`]
    /// and the scan never starts. Already scanning is a no-op.
    pub async fn start_scan(&mut self) -> Result<()> {
        match self.state {
            LinkState::Scanning => return Ok(()),
            LinkState::Idle => {}
            other => return Err(LinkcableError::invalid_state("start_scan", other.name())),
        }

        if !self.permission.request().await {
            warn!("radio permission denied; scan not started");
            return Err(LinkcableError::PermissionDenied);
        }

        self.scanner.reset();
        self.transport.start_scan().await?;
        self.scan_active = true;
        self.state = LinkState::Scanning;
        info!("scanning for storage units matching {:?}", self.config.unit_marker);
        Ok(())
    }

    /// Halt the discovery stream, keeping already-surfaced handles
    pub async fn stop_scan(&mut self) -> Result<()> {
        if self.scan_active {
            self.transport.stop_scan().await?;
            self.scan_active = false;
        }
        if self.state == LinkState::Scanning {
            self.state = LinkState::Idle;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Connection lifecycle
    // ------------------------------------------------------------------

    /// Connect to a surfaced storage unit
    ///
    /// Any existing link is fully torn down first; exactly one connection
    /// exists at a time. On success the manager is `Ready` and inbound
    /// frames mutate the collections. Failures tear down, surface to the
    /// caller, and are never retried automatically.
    pub async fn connect(&mut self, handle: &PeripheralHandle) -> Result<()> {
        if self.state.has_link() {
            info!("tearing down existing link before connecting to {}", handle);
            self.teardown().await;
        }

        self.attempt += 1;
        let attempt = self.attempt;

        self.state = LinkState::Connecting;
        info!("connecting to {}", handle);

        if let Err(e) = self.transport.connect(&handle.id).await {
            self.fail_attempt(attempt).await;
            return Err(e);
        }
        if self.stale(attempt) {
            return Ok(());
        }

        self.state = LinkState::Discovering;
        if let Err(e) = self.transport.discover_services().await {
            self.fail_attempt(attempt).await;
            return Err(e);
        }
        if self.stale(attempt) {
            return Ok(());
        }

        // Scanning and an active link are mutually exclusive on the radio
        if self.scan_active {
            if let Err(e) = self.transport.stop_scan().await {
                warn!("failed to stop scan after connect: {}", e);
            }
            self.scan_active = false;
        }

        self.state = LinkState::Subscribing;
        if let Err(e) = self.transport.subscribe().await {
            self.fail_attempt(attempt).await;
            return Err(e);
        }
        if self.stale(attempt) {
            return Ok(());
        }

        self.connected = Some(handle.clone());
        self.state = LinkState::Ready;
        info!("link ready: {}", handle);
        Ok(())
    }

    /// Tear down any link and return to idle
    ///
    /// Valid from every state and idempotent: repeated calls, or a call
    /// with nothing connected, are no-ops.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.attempt += 1;
        if self.state == LinkState::Idle && !self.scan_active {
            return Ok(());
        }
        self.teardown().await;
        Ok(())
    }

    /// Send one move frame to the connected unit
    pub async fn send_move(&mut self, op_code: OpCode, index: RecordIndex) -> Result<()> {
        if self.state != LinkState::Ready {
            return Err(LinkcableError::invalid_state("send_move", self.state.name()));
        }
        self.config.catalog.validate(index)?;
        let frame = ExchangeFrame::new(op_code, index);
        self.transport.send_frame(&frame.encode()).await?;
        Ok(())
    }

    async fn teardown(&mut self) {
        if let Err(e) = self.transport.disconnect().await {
            warn!("transport disconnect reported: {}", e);
        }
        if self.scan_active {
            if let Err(e) = self.transport.stop_scan().await {
                warn!("failed to stop scan during teardown: {}", e);
            }
            self.scan_active = false;
        }
        self.connected = None;
        self.state = LinkState::Idle;
    }

    async fn fail_attempt(&mut self, attempt: u64) {
        if self.stale(attempt) {
            return;
        }
        self.teardown().await;
    }

    fn stale(&self, attempt: u64) -> bool {
        self.attempt != attempt
    }

    // ------------------------------------------------------------------
    // Event pump
    // ------------------------------------------------------------------

    /// Wait for the next transport event, apply it, and hand it back
    ///
    /// Returns `None` once the transport has dropped its sender.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        let event = self.events.recv().await?;
        self.handle_event(event.clone());
        Some(event)
    }

    /// Apply one transport event
    ///
    /// Events are handled strictly in delivery order; moves do not
    /// commute.
    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Sighting(handle) => {
                self.scanner.observe(handle);
            }
            TransportEvent::Frame(bytes) => {
                self.handle_frame(&bytes);
            }
            TransportEvent::ScanError(reason) => {
                // Radio noise is transient; scanning keeps running
                warn!("scan transport error (non-fatal): {}", reason);
            }
            TransportEvent::Disconnected(reason) => {
                // A drop notice while scanning or idle is stale noise
                // from a link already torn down
                if self.state.has_link() {
                    info!("transport reported link drop: {}", reason);
                    self.connected = None;
                    self.state = LinkState::Idle;
                }
            }
        }
    }

    fn handle_frame(&mut self, bytes: &[u8]) {
        if self.state != LinkState::Ready {
            debug!("frame received in state {}; dropped", self.state.name());
            return;
        }

        // A single bad frame never tears the link down
        let frame = match ExchangeFrame::decode(bytes, &self.config.catalog) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("dropping undecodable frame: {}", e);
                return;
            }
        };

        match self.store.apply_move(frame.op_code, frame.index) {
            MoveOutcome::Moved(_) => {
                info!("applied move {} {}", frame.op_code, frame.index);
            }
            MoveOutcome::RecordNotInSource { op_code, index } => {
                info!("refused move {} {}: record not in source", op_code, index);
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
