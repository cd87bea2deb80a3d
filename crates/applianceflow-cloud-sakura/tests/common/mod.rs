use applianceflow_cloud::{Aggregate, AggregateStore, CloudError, PowerState, Result};
use applianceflow_cloud_sakura::RouterSettings;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// In-memory VPC router
///
/// Shutdown and boot take one extra poll to settle, and every settings write
/// sleeps so that unserialized read-modify-write cycles would interleave.
pub struct MemoryRouterStore {
    pub exists: AtomicBool,
    pub settings: Mutex<Option<RouterSettings>>,
    pub power: Mutex<PowerState>,
    pub ignore_shutdown: AtomicBool,
    pub calls: Mutex<Vec<&'static str>>,
}

impl MemoryRouterStore {
    pub fn new(power: PowerState) -> Self {
        Self {
            exists: AtomicBool::new(true),
            settings: Mutex::new(None),
            power: Mutex::new(power),
            ignore_shutdown: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn settings(&self) -> RouterSettings {
        self.settings.lock().unwrap().clone().unwrap_or_default()
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

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_exists(&self, router_id: &str) -> Result<()> {
        if self.exists.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CloudError::NotFound(router_id.to_string()))
        }
    }
}

#[async_trait]
impl AggregateStore for MemoryRouterStore {
    type Settings = RouterSettings;

    async fn read(&self, router_id: &str) -> Result<Aggregate<RouterSettings>> {
        self.record("read");
        self.check_exists(router_id)?;
        let settings = self.settings.lock().unwrap().clone();
        Ok(Aggregate::new(router_id, settings))
    }

    async fn update_settings(
        &self,
        router_id: &str,
        settings: &RouterSettings,
    ) -> Result<Aggregate<RouterSettings>> {
        self.record("update");
        self.check_exists(router_id)?;
        tokio::time::sleep(Duration::from_millis(20)).await;
        *self.settings.lock().unwrap() = Some(settings.clone());
        Ok(Aggregate::new(router_id, Some(settings.clone())))
    }

    async fn apply_config(&self, router_id: &str) -> Result<bool> {
        self.record("apply");
        self.check_exists(router_id)?;
        Ok(true)
    }

    async fn boot(&self, _router_id: &str) -> Result<bool> {
        self.record("boot");
        *self.power.lock().unwrap() = PowerState::Booting;
        Ok(true)
    }

    async fn shutdown(&self, _router_id: &str) -> Result<bool> {
        self.record("shutdown");
        if !self.ignore_shutdown.load(Ordering::SeqCst) {
            *self.power.lock().unwrap() = PowerState::ShuttingDown;
        }
        Ok(true)
    }

    async fn stop(&self, _router_id: &str) -> Result<bool> {
        self.record("stop");
        *self.power.lock().unwrap() = PowerState::Down;
        Ok(true)
    }

    async fn read_power_state(&self, router_id: &str) -> Result<PowerState> {
        self.record("power");
        self.check_exists(router_id)?;

        let mut power = self.power.lock().unwrap();
        let current = *power;
        *power = match current {
            PowerState::ShuttingDown => PowerState::Down,
            PowerState::Booting => PowerState::Up,
            other => other,
        };
        Ok(current)
    }

    async fn delete(&self, router_id: &str) -> Result<()> {
        self.record("delete");
        self.check_exists(router_id)?;
        self.exists.store(false, Ordering::SeqCst);
        Ok(())
    }
}
