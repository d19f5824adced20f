//! btleplug-backed peripheral transport
//!
//! Implements the core `PeripheralTransport` boundary over a real BLE
//! central. Sightings, inbound frames, and link drops are forwarded on
//! the event channel handed in at construction; the core loop drains
//! them in delivery order.

use std::sync::Arc;

use async_trait::async_trait;
use btleplug::api::{
    Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::stream::StreamExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use linkcable_core::{
    ExchangeConfig, PeripheralHandle, PeripheralId, PeripheralTransport, Result, TransportEvent,
    TransportEventSender, EXCHANGE_CHARACTERISTIC_UUID, EXCHANGE_SERVICE_UUID,
};

use crate::error::BleTransportError;

// ----------------------------------------------------------------------------
// BLE Transport
// ----------------------------------------------------------------------------

/// BLE implementation of the peripheral transport capability
pub struct BleTransport {
    config: ExchangeConfig,
    events: TransportEventSender,
    adapter: Option<Adapter>,
    connected: Option<Peripheral>,
    exchange_char: Option<Characteristic>,
    /// Identifier of the active link, shared with the central event pump
    /// so it can tell a relevant drop from unrelated radio traffic
    active_id: Arc<RwLock<Option<btleplug::platform::PeripheralId>>>,
    event_pump: Option<JoinHandle<()>>,
    notify_task: Option<JoinHandle<()>>,
}

impl BleTransport {
    /// Create a transport pushing events to the given sender
    pub fn new(config: ExchangeConfig, events: TransportEventSender) -> Self {
        Self {
            config,
            events,
            adapter: None,
            connected: None,
            exchange_char: None,
            active_id: Arc::new(RwLock::new(None)),
            event_pump: None,
            notify_task: None,
        }
    }

    /// Initialize the BLE adapter and start the central event pump
    async fn ensure_adapter(&mut self) -> Result<Adapter> {
        if let Some(adapter) = &self.adapter {
            return Ok(adapter.clone());
        }

        let manager = Manager::new()
            .await
            .map_err(|e| BleTransportError::AdapterNotAvailable(e.to_string()))?;
        let adapters = manager
            .adapters()
            .await
            .map_err(|e| BleTransportError::AdapterNotAvailable(e.to_string()))?;
        let adapter = adapters
            .first()
            .ok_or_else(|| BleTransportError::AdapterNotAvailable("no adapters found".into()))?
            .clone();

        self.spawn_event_pump(adapter.clone()).await?;
        self.adapter = Some(adapter.clone());
        info!("BLE adapter initialized");
        Ok(adapter)
    }

    /// Forward central events (sightings, drops) onto the core channel
    async fn spawn_event_pump(&mut self, adapter: Adapter) -> Result<()> {
        let mut central_events = adapter
            .events()
            .await
            .map_err(|e| BleTransportError::ScanFailed(e.to_string()))?;
        let sender = self.events.clone();
        let active_id = Arc::clone(&self.active_id);

        let pump = tokio::spawn(async move {
            while let Some(event) = central_events.next().await {
                match event {
                    CentralEvent::DeviceDiscovered(id) => {
                        let peripheral = match adapter.peripheral(&id).await {
                            Ok(p) => p,
                            Err(e) => {
                                let _ = sender
                                    .send(TransportEvent::ScanError(e.to_string()));
                                continue;
                            }
                        };
                        let properties = match peripheral.properties().await {
                            Ok(Some(props)) => props,
                            Ok(None) => continue,
                            Err(e) => {
                                let _ = sender
                                    .send(TransportEvent::ScanError(e.to_string()));
                                continue;
                            }
                        };
                        // Nameless advertisements can never match the
                        // unit marker; drop them here
                        let Some(name) = properties.local_name else {
                            continue;
                        };
                        let handle = PeripheralHandle::new(
                            PeripheralId::new(id.to_string()),
                            name,
                            properties.rssi,
                        );
                        if sender.send(TransportEvent::Sighting(handle)).is_err() {
                            break;
                        }
                    }
                    CentralEvent::DeviceDisconnected(id) => {
                        let is_active = active_id
                            .read()
                            .await
                            .as_ref()
                            .is_some_and(|active| *active == id);
                        if is_active {
                            active_id.write().await.take();
                            if sender
                                .send(TransportEvent::Disconnected(
                                    "peripheral disconnected".into(),
                                ))
                                .is_err()
                            {
                                break;
                            }
                        }
                    }
                    _ => {}
                }
            }
            debug!("central event pump ended");
        });

        self.event_pump = Some(pump);
        Ok(())
    }

    fn connected_peripheral(&self) -> Result<&Peripheral> {
        self.connected
            .as_ref()
            .ok_or_else(|| BleTransportError::NotConnected.into())
    }

    fn exchange_characteristic(&self) -> Result<&Characteristic> {
        self.exchange_char
            .as_ref()
            .ok_or_else(|| BleTransportError::CharacteristicNotFound.into())
    }
}

#[async_trait]
impl PeripheralTransport for BleTransport {
    async fn start_scan(&mut self) -> Result<()> {
        let adapter = self.ensure_adapter().await?;

        // The storage unit does not advertise its service UUID, so the
        // scan is unfiltered and name matching happens in the core
        adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| BleTransportError::ScanFailed(e.to_string()))?;
        info!("started BLE scan");
        Ok(())
    }

    async fn stop_scan(&mut self) -> Result<()> {
        if let Some(adapter) = &self.adapter {
            adapter
                .stop_scan()
                .await
                .map_err(|e| BleTransportError::ScanFailed(e.to_string()))?;
            info!("stopped BLE scan");
        }
        Ok(())
    }

    async fn connect(&mut self, id: &PeripheralId) -> Result<()> {
        let adapter = self.ensure_adapter().await?;

        let peripherals = adapter
            .peripherals()
            .await
            .map_err(|e| BleTransportError::ConnectionFailed {
                peripheral: id.to_string(),
                reason: e.to_string(),
            })?;
        let peripheral = peripherals
            .into_iter()
            .find(|p| p.id().to_string() == id.as_str())
            .ok_or_else(|| BleTransportError::PeripheralNotFound(id.to_string()))?;

        match timeout(self.config.connection_timeout, peripheral.connect()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(BleTransportError::ConnectionFailed {
                    peripheral: id.to_string(),
                    reason: e.to_string(),
                }
                .into());
            }
            Err(_) => {
                return Err(BleTransportError::ConnectionTimeout(id.to_string()).into());
            }
        }

        *self.active_id.write().await = Some(peripheral.id());
        self.connected = Some(peripheral);
        info!("connected to {}", id);
        Ok(())
    }

    async fn discover_services(&mut self) -> Result<()> {
        let peripheral = self.connected_peripheral()?;

        peripheral
            .discover_services()
            .await
            .map_err(|e| BleTransportError::ServiceDiscoveryFailed(e.to_string()))?;

        let service = peripheral
            .services()
            .into_iter()
            .find(|s| s.uuid == EXCHANGE_SERVICE_UUID)
            .ok_or_else(|| {
                BleTransportError::ServiceDiscoveryFailed("exchange service not present".into())
            })?;
        let exchange_char = service
            .characteristics
            .into_iter()
            .find(|c| c.uuid == EXCHANGE_CHARACTERISTIC_UUID)
            .ok_or(BleTransportError::CharacteristicNotFound)?;

        debug!("found exchange characteristic {}", exchange_char.uuid);
        self.exchange_char = Some(exchange_char);
        Ok(())
    }

    async fn subscribe(&mut self) -> Result<()> {
        let characteristic = self.exchange_characteristic()?.clone();
        let peripheral = self.connected_peripheral()?;

        peripheral
            .subscribe(&characteristic)
            .await
            .map_err(|e| BleTransportError::SubscriptionFailed(e.to_string()))?;

        let mut notifications = peripheral
            .notifications()
            .await
            .map_err(|e| BleTransportError::SubscriptionFailed(e.to_string()))?;

        let sender = self.events.clone();
        let notify_task = tokio::spawn(async move {
            while let Some(notification) = notifications.next().await {
                if notification.uuid != EXCHANGE_CHARACTERISTIC_UUID {
                    continue;
                }
                if sender
                    .send(TransportEvent::Frame(notification.value))
                    .is_err()
                {
                    break;
                }
            }
            debug!("notification stream ended");
        });
        self.notify_task = Some(notify_task);

        info!("subscribed to exchange characteristic");
        Ok(())
    }

    async fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        let characteristic = self.exchange_characteristic()?.clone();
        let peripheral = self.connected_peripheral()?;

        peripheral
            .write(&characteristic, frame, WriteType::WithoutResponse)
            .await
            .map_err(|e| BleTransportError::WriteFailed(e.to_string()))?;
        debug!("wrote {} byte frame", frame.len());
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(task) = self.notify_task.take() {
            task.abort();
        }
        self.exchange_char = None;
        self.active_id.write().await.take();

        if let Some(peripheral) = self.connected.take() {
            if let Err(e) = peripheral.disconnect().await {
                warn!("BLE disconnect reported: {}", e);
            }
            info!("disconnected from peripheral");
        }
        Ok(())
    }
}

impl Drop for BleTransport {
    fn drop(&mut self) {
        if let Some(task) = self.event_pump.take() {
            task.abort();
        }
        if let Some(task) = self.notify_task.take() {
            task.abort();
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
