//! Device service — use-cases for device state and manual control.

use farmhub_domain::device::{DeviceState, IrrigationCommand};
use farmhub_domain::error::{FarmHubError, NotFoundError};
use farmhub_domain::event::{Event, EventType};
use farmhub_domain::id::DeviceId;
use farmhub_domain::time;

use crate::ports::{DeviceStateStore, EventPublisher};

/// Bounded retries for compare-and-set saves that lose a race.
const MAX_SAVE_ATTEMPTS: u32 = 3;

/// Application service for the device state machine.
pub struct DeviceService<DS, P> {
    store: DS,
    publisher: P,
}

impl<DS, P> DeviceService<DS, P>
where
    DS: DeviceStateStore,
    P: EventPublisher,
{
    /// Create a new service backed by the given store and publisher.
    pub fn new(store: DS, publisher: P) -> Self {
        Self { store, publisher }
    }

    /// Fetch a device's state, creating a default record on first contact.
    ///
    /// Fresh devices start in manual mode with the pump off.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self), fields(device_id = %device_id))]
    pub async fn get_or_create(&self, device_id: &DeviceId) -> Result<DeviceState, FarmHubError> {
        match self.store.get(device_id).await? {
            Some(state) => Ok(state),
            None => {
                tracing::info!(device_id = %device_id, "registering new device");
                self.store
                    .create(DeviceState::new(device_id.clone(), time::now()))
                    .await
            }
        }
    }

    /// Look up a device, returning an error if it was never seen.
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::NotFound`] when no device with `device_id`
    /// exists, or a storage error from the store.
    #[tracing::instrument(skip(self), fields(device_id = %device_id))]
    pub async fn get_device(&self, device_id: &DeviceId) -> Result<DeviceState, FarmHubError> {
        self.store.get(device_id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: device_id.to_string(),
            }
            .into()
        })
    }

    /// List all known devices.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_devices(&self) -> Result<Vec<DeviceState>, FarmHubError> {
        self.store.get_all().await
    }

    /// Switch a device between automatic and manual mode.
    ///
    /// Toggling the mode never touches the pump. A no-op toggle (already
    /// in the requested mode) skips the state write.
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::NotFound`] when the device does not exist,
    /// [`FarmHubError::StateConflict`] when the save loses a race, or a
    /// storage error from the store.
    #[tracing::instrument(skip(self), fields(device_id = %device_id))]
    pub async fn set_auto_mode(
        &self,
        device_id: &DeviceId,
        enabled: bool,
    ) -> Result<DeviceState, FarmHubError> {
        let mut state = self.get_device(device_id).await?;
        if !state.set_auto_mode(enabled, time::now()) {
            return Ok(state);
        }
        state = self.store.save(state).await?;

        let _ = self
            .publisher
            .publish(Event::new(
                EventType::ModeChanged,
                Some(device_id.clone()),
                serde_json::json!({ "auto_mode": state.auto_mode }),
            ))
            .await;
        Ok(state)
    }

    /// Apply an operator-issued pump command.
    ///
    /// Rejected while the device is in automatic mode; the rule engine
    /// owns the pump there. Commanding the pump to the state it is
    /// already in skips the state write.
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::ManualOverride`] when the device is in
    /// automatic mode, [`FarmHubError::NotFound`] when the device does
    /// not exist, [`FarmHubError::StateConflict`] when the save loses a
    /// race, or a storage error from the store.
    #[tracing::instrument(skip(self), fields(device_id = %device_id, command = %command))]
    pub async fn manual_control(
        &self,
        device_id: &DeviceId,
        command: IrrigationCommand,
    ) -> Result<DeviceState, FarmHubError> {
        let mut state = self.get_device(device_id).await?;
        if !state.apply_manual(command, time::now())? {
            return Ok(state);
        }
        state = self.store.save(state).await?;

        let _ = self
            .publisher
            .publish(Event::new(
                EventType::IrrigationChanged,
                Some(device_id.clone()),
                serde_json::json!({
                    "irrigation_on": state.irrigation_on,
                    "command": command,
                }),
            ))
            .await;
        Ok(state)
    }

    /// Stop a timed irrigation run and account for the water used.
    ///
    /// Called by the stop scheduler when a rule's duration elapses. The
    /// stop only lands while the device is still in automatic mode with
    /// the pump on; an operator who flipped to manual in the meantime
    /// keeps control. Lost compare-and-set races are retried with fresh
    /// state, bounded at [`MAX_SAVE_ATTEMPTS`].
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::NotFound`] when the device does not exist,
    /// [`FarmHubError::StateConflict`] when every attempt lost its race,
    /// or a storage error from the store.
    #[tracing::instrument(skip(self), fields(device_id = %device_id, duration_minutes))]
    pub async fn complete_timed_run(
        &self,
        device_id: &DeviceId,
        duration_minutes: u32,
        liters_used: f64,
    ) -> Result<DeviceState, FarmHubError> {
        let mut attempt = 0;
        loop {
            let mut state = self.get_device(device_id).await?;
            if !state.apply_auto(IrrigationCommand::Off, time::now()) {
                return Ok(state);
            }
            state.record_run(duration_minutes, liters_used, time::now());

            match self.store.save(state).await {
                Ok(saved) => {
                    let _ = self
                        .publisher
                        .publish(Event::new(
                            EventType::IrrigationChanged,
                            Some(device_id.clone()),
                            serde_json::json!({
                                "irrigation_on": saved.irrigation_on,
                                "command": IrrigationCommand::Off,
                                "duration_minutes": duration_minutes,
                            }),
                        ))
                        .await;
                    return Ok(saved);
                }
                Err(FarmHubError::StateConflict(conflict)) => {
                    attempt += 1;
                    if attempt >= MAX_SAVE_ATTEMPTS {
                        return Err(conflict.into());
                    }
                    tracing::debug!(device_id = %device_id, attempt, "retrying timed stop after lost race");
                }
                Err(other) => return Err(other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmhub_domain::error::StateConflictError;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct InMemoryDeviceStore {
        store: Mutex<HashMap<DeviceId, DeviceState>>,
        fail_saves: AtomicUsize,
    }

    impl Default for InMemoryDeviceStore {
        fn default() -> Self {
            Self {
                store: Mutex::new(HashMap::new()),
                fail_saves: AtomicUsize::new(0),
            }
        }
    }

    impl DeviceStateStore for InMemoryDeviceStore {
        fn get(
            &self,
            id: &DeviceId,
        ) -> impl Future<Output = Result<Option<DeviceState>, FarmHubError>> + Send {
            let result = self.store.lock().unwrap().get(id).cloned();
            async { Ok(result) }
        }

        fn get_all(&self) -> impl Future<Output = Result<Vec<DeviceState>, FarmHubError>> + Send {
            let result: Vec<DeviceState> = self.store.lock().unwrap().values().cloned().collect();
            async { Ok(result) }
        }

        fn create(
            &self,
            state: DeviceState,
        ) -> impl Future<Output = Result<DeviceState, FarmHubError>> + Send {
            self.store
                .lock()
                .unwrap()
                .insert(state.device_id.clone(), state.clone());
            async { Ok(state) }
        }

        fn save(
            &self,
            mut state: DeviceState,
        ) -> impl Future<Output = Result<DeviceState, FarmHubError>> + Send {
            let result = if self.fail_saves.load(Ordering::SeqCst) > 0 {
                self.fail_saves.fetch_sub(1, Ordering::SeqCst);
                Err(StateConflictError {
                    device_id: state.device_id.clone(),
                }
                .into())
            } else {
                state.revision += 1;
                self.store
                    .lock()
                    .unwrap()
                    .insert(state.device_id.clone(), state.clone());
                Ok(state)
            };
            async move { result }
        }
    }

    struct NullPublisher;

    impl EventPublisher for NullPublisher {
        fn publish(&self, _event: Event) -> impl Future<Output = Result<(), FarmHubError>> + Send {
            async { Ok(()) }
        }
    }

    fn make_service() -> DeviceService<InMemoryDeviceStore, NullPublisher> {
        DeviceService::new(InMemoryDeviceStore::default(), NullPublisher)
    }

    fn device_id() -> DeviceId {
        DeviceId::new("ESP32_MAIN")
    }

    #[tokio::test]
    async fn should_create_default_device_on_first_contact() {
        let svc = make_service();

        let state = svc.get_or_create(&device_id()).await.unwrap();

        assert_eq!(state.device_id, device_id());
        assert!(!state.auto_mode);
        assert!(!state.irrigation_on);
        assert_eq!(state.revision, 0);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unseen_device() {
        let svc = make_service();
        let result = svc.get_device(&DeviceId::new("GHOST")).await;
        assert!(matches!(result, Err(FarmHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_toggle_auto_mode_without_touching_pump() {
        let svc = make_service();
        svc.get_or_create(&device_id()).await.unwrap();

        let state = svc.set_auto_mode(&device_id(), true).await.unwrap();

        assert!(state.auto_mode);
        assert!(!state.irrigation_on, "mode toggle must not actuate the pump");
    }

    #[tokio::test]
    async fn should_skip_write_when_mode_unchanged() {
        let svc = make_service();
        svc.get_or_create(&device_id()).await.unwrap();

        let state = svc.set_auto_mode(&device_id(), false).await.unwrap();

        assert_eq!(state.revision, 0, "no-op toggle must not bump revision");
    }

    #[tokio::test]
    async fn should_accept_manual_command_in_manual_mode() {
        let svc = make_service();
        svc.get_or_create(&device_id()).await.unwrap();

        let state = svc
            .manual_control(&device_id(), IrrigationCommand::On)
            .await
            .unwrap();

        assert!(state.irrigation_on);
    }

    #[tokio::test]
    async fn should_reject_manual_command_in_auto_mode() {
        let svc = make_service();
        svc.get_or_create(&device_id()).await.unwrap();
        svc.set_auto_mode(&device_id(), true).await.unwrap();

        let result = svc.manual_control(&device_id(), IrrigationCommand::On).await;

        assert!(matches!(result, Err(FarmHubError::ManualOverride(_))));
        let state = svc.get_device(&device_id()).await.unwrap();
        assert!(!state.irrigation_on, "rejected command must leave state untouched");
    }

    #[tokio::test]
    async fn should_skip_write_when_pump_already_at_target() {
        let svc = make_service();
        svc.get_or_create(&device_id()).await.unwrap();

        let state = svc
            .manual_control(&device_id(), IrrigationCommand::Off)
            .await
            .unwrap();

        assert_eq!(state.revision, 0);
    }

    #[tokio::test]
    async fn should_stop_pump_and_account_water_on_timed_run() {
        let svc = make_service();
        svc.get_or_create(&device_id()).await.unwrap();
        svc.set_auto_mode(&device_id(), true).await.unwrap();
        {
            let mut store = svc.store.store.lock().unwrap();
            store.get_mut(&device_id()).unwrap().irrigation_on = true;
        }

        let state = svc
            .complete_timed_run(&device_id(), 10, 25.0)
            .await
            .unwrap();

        assert!(!state.irrigation_on);
        assert_eq!(state.last_run_duration, 10);
        assert!((state.total_water_usage - 25.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_not_stop_pump_when_operator_took_manual_control() {
        let svc = make_service();
        svc.get_or_create(&device_id()).await.unwrap();
        {
            let mut store = svc.store.store.lock().unwrap();
            store.get_mut(&device_id()).unwrap().irrigation_on = true;
        }

        let state = svc
            .complete_timed_run(&device_id(), 10, 25.0)
            .await
            .unwrap();

        assert!(state.irrigation_on, "manual-mode pump stays under operator control");
        assert_eq!(state.last_run_duration, 0);
    }

    #[tokio::test]
    async fn should_retry_timed_stop_after_lost_race() {
        let svc = make_service();
        svc.get_or_create(&device_id()).await.unwrap();
        svc.set_auto_mode(&device_id(), true).await.unwrap();
        {
            let mut store = svc.store.store.lock().unwrap();
            store.get_mut(&device_id()).unwrap().irrigation_on = true;
        }
        svc.store.fail_saves.store(1, Ordering::SeqCst);

        let state = svc
            .complete_timed_run(&device_id(), 5, 12.5)
            .await
            .unwrap();

        assert!(!state.irrigation_on);
    }

    #[tokio::test]
    async fn should_give_up_timed_stop_after_bounded_retries() {
        let svc = make_service();
        svc.get_or_create(&device_id()).await.unwrap();
        svc.set_auto_mode(&device_id(), true).await.unwrap();
        {
            let mut store = svc.store.store.lock().unwrap();
            store.get_mut(&device_id()).unwrap().irrigation_on = true;
        }
        svc.store.fail_saves.store(usize::MAX, Ordering::SeqCst);

        let result = svc.complete_timed_run(&device_id(), 5, 12.5).await;

        assert!(matches!(result, Err(FarmHubError::StateConflict(_))));
    }
}
