//! End-to-end exchange session tests against a scripted transport
//!
//! Drives the full flow the way the application does: permission check,
//! scan, unit selection, connect, and frame traffic, with the transport
//! replaced by an in-memory fake that emits scripted events.

use async_trait::async_trait;

use linkcable_core::{
    event_channel, AlwaysGranted, ConnectionManager, ExchangeConfig, ExchangeFrame, LinkState,
    OpCode, PeripheralHandle, PeripheralId, PeripheralTransport, RecordIndex, Result,
    TransportEvent, TransportEventSender,
};

// ----------------------------------------------------------------------------
// Scripted Transport
// ----------------------------------------------------------------------------

/// Transport whose sightings and frames are injected through the event
/// sender; radio calls always succeed.
struct ScriptedTransport;

#[async_trait]
impl PeripheralTransport for ScriptedTransport {
    async fn start_scan(&mut self) -> Result<()> {
        Ok(())
    }

    async fn stop_scan(&mut self) -> Result<()> {
        Ok(())
    }

    async fn connect(&mut self, _id: &PeripheralId) -> Result<()> {
        Ok(())
    }

    async fn discover_services(&mut self) -> Result<()> {
        Ok(())
    }

    async fn subscribe(&mut self) -> Result<()> {
        Ok(())
    }

    async fn send_frame(&mut self, _frame: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }
}

fn session() -> (ConnectionManager, TransportEventSender) {
    let (tx, rx) = event_channel();
    let manager = ConnectionManager::new(
        ExchangeConfig::default(),
        Box::new(ScriptedTransport),
        Box::new(AlwaysGranted),
        rx,
    );
    (manager, tx)
}

fn unit(id: &str, name: &str) -> PeripheralHandle {
    PeripheralHandle::new(PeripheralId::new(id), name, Some(-48))
}

fn frame(op: OpCode, index: u16) -> TransportEvent {
    TransportEvent::Frame(
        ExchangeFrame::new(op, RecordIndex::new(index))
            .encode()
            .to_vec(),
    )
}

fn party_indices(manager: &ConnectionManager) -> Vec<u16> {
    manager
        .snapshot()
        .party
        .iter()
        .map(|r| r.index.value())
        .collect()
}

fn storage_indices(manager: &ConnectionManager) -> Vec<u16> {
    manager
        .snapshot()
        .storage
        .iter()
        .map(|r| r.index.value())
        .collect()
}

// ----------------------------------------------------------------------------
// Scenarios
// ----------------------------------------------------------------------------

#[tokio::test]
async fn full_session_scan_connect_exchange() {
    let (mut manager, tx) = session();

    manager.start_scan().await.unwrap();

    // Sightings: two units, one repeated, one unrelated device
    tx.send(TransportEvent::Sighting(unit("aa", "Bill's PC"))).unwrap();
    tx.send(TransportEvent::Sighting(unit("bb", "Fitness Tracker"))).unwrap();
    tx.send(TransportEvent::Sighting(unit("aa", "Bill's PC"))).unwrap();
    for _ in 0..3 {
        manager.next_event().await.unwrap();
    }

    let surfaced = manager.peripherals();
    assert_eq!(surfaced.len(), 1);

    let chosen = surfaced[0].clone();
    manager.connect(&chosen).await.unwrap();
    assert_eq!(manager.state(), LinkState::Ready);

    // The unit sends a move out, then the same record back
    tx.send(frame(OpCode::ToStorage, 151)).unwrap();
    manager.next_event().await.unwrap();
    assert_eq!(party_indices(&manager), vec![150, 149, 145, 143, 130]);
    assert_eq!(storage_indices(&manager), vec![151]);

    tx.send(frame(OpCode::ToParty, 151)).unwrap();
    manager.next_event().await.unwrap();
    assert_eq!(party_indices(&manager), vec![150, 149, 145, 143, 130, 151]);
    assert!(storage_indices(&manager).is_empty());

    manager.disconnect().await.unwrap();
    assert_eq!(manager.state(), LinkState::Idle);
}

#[tokio::test]
async fn unknown_record_is_refused_without_state_change() {
    let (mut manager, tx) = session();
    manager.connect(&unit("aa", "Bill's PC")).await.unwrap();

    let before = manager.snapshot();

    // 999 is outside the catalog: rejected at the decode boundary
    tx.send(TransportEvent::Frame(vec![2, 0x03, 0xE7])).unwrap();
    // 140 is in the catalog but not in the party: refused by the store
    tx.send(frame(OpCode::ToStorage, 140)).unwrap();
    manager.next_event().await.unwrap();
    manager.next_event().await.unwrap();

    assert_eq!(manager.snapshot(), before);
    assert_eq!(manager.state(), LinkState::Ready);
}

#[tokio::test]
async fn malformed_frames_are_dropped_mid_stream() {
    let (mut manager, tx) = session();
    manager.connect(&unit("aa", "Bill's PC")).await.unwrap();

    tx.send(frame(OpCode::ToStorage, 151)).unwrap();
    tx.send(TransportEvent::Frame(vec![1])).unwrap();
    tx.send(TransportEvent::Frame(vec![0, 0, 151])).unwrap();
    tx.send(frame(OpCode::ToStorage, 130)).unwrap();
    for _ in 0..4 {
        manager.next_event().await.unwrap();
    }

    // Valid moves around the noise applied, in order
    assert_eq!(storage_indices(&manager), vec![151, 130]);
    assert_eq!(manager.state(), LinkState::Ready);
}

#[tokio::test]
async fn link_drop_mid_exchange_returns_to_idle() {
    let (mut manager, tx) = session();
    manager.start_scan().await.unwrap();
    manager.connect(&unit("aa", "Bill's PC")).await.unwrap();

    tx.send(frame(OpCode::ToStorage, 143)).unwrap();
    tx.send(TransportEvent::Disconnected("unit powered off".into())).unwrap();
    manager.next_event().await.unwrap();
    manager.next_event().await.unwrap();

    assert_eq!(manager.state(), LinkState::Idle);
    // The applied move survives the drop; collections are session-scoped
    assert_eq!(storage_indices(&manager), vec![143]);
}

#[tokio::test]
async fn scan_errors_do_not_stop_discovery() {
    let (mut manager, tx) = session();
    manager.start_scan().await.unwrap();

    tx.send(TransportEvent::ScanError("adapter glitch".into())).unwrap();
    tx.send(TransportEvent::Sighting(unit("aa", "Bill's PC"))).unwrap();
    manager.next_event().await.unwrap();
    manager.next_event().await.unwrap();

    assert_eq!(manager.state(), LinkState::Scanning);
    assert_eq!(manager.peripherals().len(), 1);
}
