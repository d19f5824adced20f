//! Error types for the BLE transport

use linkcable_core::{LinkcableError, TransportError};
use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors specific to the BLE transport
#[derive(Error, Debug)]
pub enum BleTransportError {
    #[error("BLE adapter not available: {0}")]
    AdapterNotAvailable(String),

    #[error("Failed to start BLE scan: {0}")]
    ScanFailed(String),

    #[error("Failed to connect to {peripheral}: {reason}")]
    ConnectionFailed { peripheral: String, reason: String },

    #[error("Connection to {0} timed out")]
    ConnectionTimeout(String),

    #[error("Peripheral not found: {0}")]
    PeripheralNotFound(String),

    #[error("Failed to discover services: {0}")]
    ServiceDiscoveryFailed(String),

    #[error("Exchange characteristic not found")]
    CharacteristicNotFound,

    #[error("Failed to subscribe to notifications: {0}")]
    SubscriptionFailed(String),

    #[error("Failed to write to characteristic: {0}")]
    WriteFailed(String),

    #[error("No peripheral connected")]
    NotConnected,
}

impl From<BleTransportError> for LinkcableError {
    fn from(err: BleTransportError) -> Self {
        let transport = match err {
            BleTransportError::AdapterNotAvailable(reason) => {
                TransportError::AdapterUnavailable { reason }
            }
            BleTransportError::ScanFailed(reason) => TransportError::ScanFailed { reason },
            BleTransportError::ConnectionFailed { peripheral, reason } => {
                TransportError::ConnectFailed { peripheral, reason }
            }
            BleTransportError::ConnectionTimeout(peripheral) => {
                TransportError::ConnectTimeout { peripheral }
            }
            BleTransportError::PeripheralNotFound(peripheral) => TransportError::ConnectFailed {
                peripheral,
                reason: "peripheral not found by adapter".into(),
            },
            BleTransportError::ServiceDiscoveryFailed(reason) => {
                TransportError::DiscoveryFailed { reason }
            }
            BleTransportError::CharacteristicNotFound => TransportError::CharacteristicNotFound,
            BleTransportError::SubscriptionFailed(reason) => {
                TransportError::SubscribeFailed { reason }
            }
            BleTransportError::WriteFailed(reason) => TransportError::WriteFailed { reason },
            BleTransportError::NotConnected => TransportError::NotConnected,
        };
        LinkcableError::Transport(transport)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn core(err: BleTransportError) -> TransportError {
        match LinkcableError::from(err) {
            LinkcableError::Transport(transport) => transport,
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[test]
    fn test_adapter_and_scan_errors_map_to_core() {
        assert!(matches!(
            core(BleTransportError::AdapterNotAvailable("powered off".into())),
            TransportError::AdapterUnavailable { .. }
        ));
        assert!(matches!(
            core(BleTransportError::ScanFailed("busy".into())),
            TransportError::ScanFailed { .. }
        ));
    }

    #[test]
    fn test_connect_errors_keep_peripheral_identity() {
        let err = core(BleTransportError::ConnectionFailed {
            peripheral: "aa:bb".into(),
            reason: "gatt error".into(),
        });
        assert!(matches!(
            err,
            TransportError::ConnectFailed { ref peripheral, .. } if peripheral == "aa:bb"
        ));

        let err = core(BleTransportError::ConnectionTimeout("aa:bb".into()));
        assert!(matches!(
            err,
            TransportError::ConnectTimeout { ref peripheral } if peripheral == "aa:bb"
        ));
    }

    #[test]
    fn test_missing_peripheral_reads_as_connect_failure() {
        let err = core(BleTransportError::PeripheralNotFound("aa:bb".into()));
        assert!(matches!(
            err,
            TransportError::ConnectFailed { ref peripheral, .. } if peripheral == "aa:bb"
        ));
    }

    #[test]
    fn test_link_setup_errors_map_to_core() {
        assert!(matches!(
            core(BleTransportError::ServiceDiscoveryFailed("lost".into())),
            TransportError::DiscoveryFailed { .. }
        ));
        assert!(matches!(
            core(BleTransportError::CharacteristicNotFound),
            TransportError::CharacteristicNotFound
        ));
        assert!(matches!(
            core(BleTransportError::SubscriptionFailed("cccd".into())),
            TransportError::SubscribeFailed { .. }
        ));
        assert!(matches!(
            core(BleTransportError::WriteFailed("short write".into())),
            TransportError::WriteFailed { .. }
        ));
        assert!(matches!(
            core(BleTransportError::NotConnected),
            TransportError::NotConnected
        ));
    }
}
