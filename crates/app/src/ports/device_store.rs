//! Device-state store port — keyed entries with compare-and-set saves.
//!
//! The store must provide read-your-writes consistency so that the
//! dispatcher's idempotency checks observe the latest actuation state.
//! Concurrent samples for the same device are serialised through the
//! revision check in [`save`](DeviceStateStore::save).

use std::future::Future;

use farmhub_domain::device::DeviceState;
use farmhub_domain::error::FarmHubError;
use farmhub_domain::id::DeviceId;

/// Store for per-device actuation state.
pub trait DeviceStateStore {
    /// Get the state entry for a device, `None` when the device has
    /// never been seen.
    fn get(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<DeviceState>, FarmHubError>> + Send;

    /// Get all known device states.
    fn get_all(&self) -> impl Future<Output = Result<Vec<DeviceState>, FarmHubError>> + Send;

    /// Insert a fresh state entry. `state.revision` must be zero.
    fn create(
        &self,
        state: DeviceState,
    ) -> impl Future<Output = Result<DeviceState, FarmHubError>> + Send;

    /// Compare-and-set save: persists `state` only while the stored
    /// revision still equals `state.revision`, bumping the revision by
    /// one. Returns the saved state with its new revision.
    ///
    /// A lost race yields [`FarmHubError::StateConflict`]; the caller
    /// must re-run the whole evaluation cycle against fresh state.
    fn save(
        &self,
        state: DeviceState,
    ) -> impl Future<Output = Result<DeviceState, FarmHubError>> + Send;
}

impl<T: DeviceStateStore + Send + Sync> DeviceStateStore for std::sync::Arc<T> {
    fn get(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<DeviceState>, FarmHubError>> + Send {
        (**self).get(id)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<DeviceState>, FarmHubError>> + Send {
        (**self).get_all()
    }

    fn create(
        &self,
        state: DeviceState,
    ) -> impl Future<Output = Result<DeviceState, FarmHubError>> + Send {
        (**self).create(state)
    }

    fn save(
        &self,
        state: DeviceState,
    ) -> impl Future<Output = Result<DeviceState, FarmHubError>> + Send {
        (**self).save(state)
    }
}
