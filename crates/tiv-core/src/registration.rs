//! Registration-lookup contract (plate number to vehicle attributes)

use async_trait::async_trait;

use crate::{Result, VehicleDescriptor};

/// Trait for registration lookups against a vehicle authority
///
/// A lookup resolves a license plate to the base vehicle attributes the
/// registry publishes. Registries do not publish mileage or transmission, so
/// the returned descriptor is never complete enough to start a pipeline run
/// on its own.
#[async_trait]
pub trait RegistrationLookup: Send + Sync {
    /// Resolve a plate number to a descriptor
    ///
    /// Returns `Ok(None)` when the plate is unknown to the registry; `Err`
    /// is reserved for transport and protocol failures.
    async fn lookup(&self, plate: &str) -> Result<Option<VehicleDescriptor>>;
}
