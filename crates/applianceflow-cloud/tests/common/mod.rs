use applianceflow_cloud::mutation::{find_by, remove_by, upsert_by};
use applianceflow_cloud::{
    Aggregate, AggregateStore, Availability, CloudError, PowerState, ResourceDataSink, Result,
    SubResource,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

/// Settings entry keyed by name
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub value: String,
    pub restart: bool,
}

impl Entry {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            restart: false,
        }
    }

    #[allow(dead_code)]
    pub fn structural(name: &str, value: &str) -> Self {
        Self {
            restart: true,
            ..Self::new(name, value)
        }
    }
}

impl SubResource<Vec<Entry>> for Entry {
    const KIND: &'static str = "entry";

    fn identity_fields(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn needs_restart(&self) -> bool {
        self.restart
    }

    fn insert_into(&self, settings: &mut Vec<Entry>) {
        upsert_by(settings, self, |a, b| a.name == b.name);
    }

    fn find_in(&self, settings: &Vec<Entry>) -> Option<Self> {
        find_by(settings, self, |a, b| a.name == b.name)
    }

    fn remove_from(&self, settings: &mut Vec<Entry>) -> bool {
        remove_by(settings, self, |a, b| a.name == b.name)
    }

    fn publish(&self, sink: &mut dyn ResourceDataSink) -> Result<()> {
        sink.set_field("name", serde_json::json!(self.name))?;
        sink.set_field("value", serde_json::json!(self.value))?;
        Ok(())
    }
}

/// In-memory appliance with a simulated power state
///
/// Power transitions take one extra poll: a shutdown passes through
/// `ShuttingDown`, a boot through `Booting`.
pub struct FakeStore {
    pub exists: AtomicBool,
    pub settings: Mutex<Option<Vec<Entry>>>,
    pub power: Mutex<PowerState>,
    pub availability: Mutex<VecDeque<Availability>>,
    pub ignore_shutdown: AtomicBool,
    pub stops_to_ignore: AtomicU32,
    pub fail_apply: AtomicBool,
    pub fail_update: AtomicBool,
    pub write_delay: Duration,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeStore {
    pub fn new(power: PowerState) -> Self {
        Self {
            exists: AtomicBool::new(true),
            settings: Mutex::new(None),
            power: Mutex::new(power),
            availability: Mutex::new(VecDeque::new()),
            ignore_shutdown: AtomicBool::new(false),
            stops_to_ignore: AtomicU32::new(0),
            fail_apply: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            write_delay: Duration::from_millis(20),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    /// Calls other than reads, in order
    #[allow(dead_code)]
    pub fn writes(&self) -> Vec<&'static str> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .copied()
            .filter(|c| *c != "read" && *c != "power")
            .collect()
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.settings.lock().unwrap().clone().unwrap_or_default()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_exists(&self, appliance_id: &str) -> Result<()> {
        if self.exists.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CloudError::NotFound(appliance_id.to_string()))
        }
    }
}

#[async_trait]
impl AggregateStore for FakeStore {
    type Settings = Vec<Entry>;

    async fn read(&self, appliance_id: &str) -> Result<Aggregate<Vec<Entry>>> {
        self.record("read");
        self.check_exists(appliance_id)?;

        let availability = {
            let mut queue = self.availability.lock().unwrap();
            if queue.len() > 1 {
                queue.pop_front().unwrap_or(Availability::Available)
            } else {
                queue.front().copied().unwrap_or(Availability::Available)
            }
        };

        let settings = self.settings.lock().unwrap().clone();
        Ok(Aggregate::new(appliance_id, settings).with_availability(availability))
    }

    async fn update_settings(
        &self,
        appliance_id: &str,
        settings: &Vec<Entry>,
    ) -> Result<Aggregate<Vec<Entry>>> {
        self.record("update");
        self.check_exists(appliance_id)?;
        // widen the window between read and write
        tokio::time::sleep(self.write_delay).await;

        if self.fail_update.load(Ordering::SeqCst) {
            return Err(CloudError::ApiError("409 Conflict".into()));
        }

        *self.settings.lock().unwrap() = Some(settings.clone());
        Ok(Aggregate::new(appliance_id, Some(settings.clone())))
    }

    async fn apply_config(&self, appliance_id: &str) -> Result<bool> {
        self.record("apply");
        self.check_exists(appliance_id)?;
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(CloudError::ApiError("500 Internal Server Error".into()));
        }
        Ok(true)
    }

    async fn boot(&self, _appliance_id: &str) -> Result<bool> {
        self.record("boot");
        *self.power.lock().unwrap() = PowerState::Booting;
        Ok(true)
    }

    async fn shutdown(&self, _appliance_id: &str) -> Result<bool> {
        self.record("shutdown");
        if !self.ignore_shutdown.load(Ordering::SeqCst) {
            *self.power.lock().unwrap() = PowerState::ShuttingDown;
        }
        Ok(true)
    }

    async fn stop(&self, _appliance_id: &str) -> Result<bool> {
        self.record("stop");
        let ignored = self
            .stops_to_ignore
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !ignored {
            *self.power.lock().unwrap() = PowerState::Down;
        }
        Ok(true)
    }

    async fn read_power_state(&self, appliance_id: &str) -> Result<PowerState> {
        self.record("power");
        self.check_exists(appliance_id)?;

        let mut power = self.power.lock().unwrap();
        let current = *power;
        *power = match current {
            PowerState::ShuttingDown => PowerState::Down,
            PowerState::Booting => PowerState::Up,
            other => other,
        };
        Ok(current)
    }

    async fn delete(&self, appliance_id: &str) -> Result<()> {
        self.record("delete");
        self.check_exists(appliance_id)?;
        self.exists.store(false, Ordering::SeqCst);
        Ok(())
    }
}
