//! Radio permission boundary
//!
//! The core only consumes a boolean grant; prompt text and OS plumbing
//! live outside it.

use async_trait::async_trait;

// ----------------------------------------------------------------------------
// Permission Gate
// ----------------------------------------------------------------------------

/// Asynchronous capability check performed before every scan attempt
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Request permission to use the radio; `true` means granted
    async fn request(&self) -> bool;
}

/// Gate for platforms where no runtime prompt exists
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGranted;

#[async_trait]
impl PermissionGate for AlwaysGranted {
    async fn request(&self) -> bool {
        true
    }
}
