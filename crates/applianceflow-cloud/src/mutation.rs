//! Read-modify-write protocol over an appliance's settings document
//!
//! The remote side exposes one settings document per appliance rather than
//! one endpoint per sub-resource. Every create and delete therefore reads
//! the whole document, changes one entry and writes the whole document back
//! while holding the appliance's lock, so two cycles on the same appliance
//! never overwrite each other's changes. Reads take no lock.
//!
//! Writing the document and activating it are two separate remote calls; a
//! failure between them surfaces as [`CloudError::PartialApply`] and is not
//! rolled back.

use crate::config::PowerConfig;
use crate::error::{CloudError, Result, ResultExt};
use crate::identity::CompositeId;
use crate::lock::NamedMutexRegistry;
use crate::power::PowerCycleController;
use crate::provider::AggregateStore;
use crate::state::ResourceDataSink;
use std::marker::PhantomData;
use std::sync::Arc;

/// One kind of entry living inside a settings document `S`
pub trait SubResource<S>: Clone + Send + Sync {
    /// Kind name used in logs and tracked state (e.g. "port_forwarding")
    const KIND: &'static str;

    /// Fields that make up this entry's identity, in hashing order
    fn identity_fields(&self) -> Vec<String>;

    /// Whether adding or removing this entry requires the appliance to be powered off
    fn needs_restart(&self) -> bool {
        false
    }

    /// Reject values the remote side would refuse, before anything is locked or written
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Add this entry to the document, replacing an equal one
    fn insert_into(&self, settings: &mut S);

    /// Find the stored entry equal to this one
    fn find_in(&self, settings: &S) -> Option<Self>;

    /// Remove the entry equal to this one; returns whether anything was removed
    fn remove_from(&self, settings: &mut S) -> bool;

    /// Publish this entry's fields
    fn publish(&self, sink: &mut dyn ResourceDataSink) -> Result<()>;
}

/// Replace the entry matching `value` or append it
pub fn upsert_by<T: Clone, F>(entries: &mut Vec<T>, value: &T, same: F)
where
    F: Fn(&T, &T) -> bool,
{
    match entries.iter_mut().find(|e| same(e, value)) {
        Some(existing) => *existing = value.clone(),
        None => entries.push(value.clone()),
    }
}

pub fn find_by<T: Clone, F>(entries: &[T], value: &T, same: F) -> Option<T>
where
    F: Fn(&T, &T) -> bool,
{
    entries.iter().find(|e| same(e, value)).cloned()
}

pub fn remove_by<T, F>(entries: &mut Vec<T>, value: &T, same: F) -> bool
where
    F: Fn(&T, &T) -> bool,
{
    let before = entries.len();
    entries.retain(|e| !same(e, value));
    entries.len() != before
}

/// Executes create/read/delete cycles against one store
pub struct AggregateMutator<S: AggregateStore> {
    store: Arc<S>,
    locks: NamedMutexRegistry,
    power: PowerCycleController<S>,
}

impl<S: AggregateStore> Clone for AggregateMutator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            locks: self.locks.clone(),
            power: self.power.clone(),
        }
    }
}

impl<S: AggregateStore> AggregateMutator<S> {
    pub fn new(store: Arc<S>, locks: NamedMutexRegistry, config: PowerConfig) -> Self {
        let power = PowerCycleController::new(store.clone(), config);
        Self { store, locks, power }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn locks(&self) -> &NamedMutexRegistry {
        &self.locks
    }

    pub fn power(&self) -> &PowerCycleController<S> {
        &self.power
    }

    /// Add `value` to the appliance's settings and activate them.
    ///
    /// Returns the value's composite ID; a failed cycle returns no ID.
    pub async fn create<R>(&self, appliance_id: &str, value: &R) -> Result<CompositeId>
    where
        R: SubResource<S::Settings>,
    {
        value.validate()?;

        let _lock = self.locks.lock(appliance_id).await;
        tracing::debug!(appliance_id, kind = R::KIND, "Creating sub-resource");

        let aggregate = self.store.read(appliance_id).await.context("read", appliance_id)?;
        let mut settings = aggregate.settings.unwrap_or_default();
        value.insert_into(&mut settings);

        self.power
            .with_power_cycle(appliance_id, value.needs_restart(), || {
                self.persist_and_apply(appliance_id, &settings)
            })
            .await?;

        let id = CompositeId::compute(appliance_id, value.identity_fields());
        tracing::debug!(appliance_id, kind = R::KIND, composite_id = %id, "Created sub-resource");
        Ok(id)
    }

    /// Look up the stored entry equal to `value`.
    ///
    /// A missing appliance, missing settings or missing entry all read as `None`.
    pub async fn read<R>(&self, appliance_id: &str, value: &R) -> Result<Option<R>>
    where
        R: SubResource<S::Settings>,
    {
        let aggregate = match self.store.read(appliance_id).await {
            Ok(aggregate) => aggregate,
            Err(e) if e.is_not_found() => {
                tracing::debug!(appliance_id, kind = R::KIND, "Appliance gone");
                return Ok(None);
            }
            Err(e) => return Err(e.context("read", appliance_id)),
        };

        Ok(aggregate
            .settings
            .as_ref()
            .and_then(|settings| value.find_in(settings)))
    }

    /// Remove the entry equal to `value` and activate the settings.
    ///
    /// Deleting an entry (or appliance) that is already gone succeeds
    /// without writing anything.
    pub async fn delete<R>(&self, appliance_id: &str, value: &R) -> Result<()>
    where
        R: SubResource<S::Settings>,
    {
        let _lock = self.locks.lock(appliance_id).await;
        tracing::debug!(appliance_id, kind = R::KIND, "Deleting sub-resource");

        let aggregate = match self.store.read(appliance_id).await {
            Ok(aggregate) => aggregate,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e.context("read", appliance_id)),
        };

        let Some(mut settings) = aggregate.settings else {
            return Ok(());
        };

        if !value.remove_from(&mut settings) {
            tracing::debug!(appliance_id, kind = R::KIND, "Already deleted");
            return Ok(());
        }

        self.power
            .with_power_cycle(appliance_id, value.needs_restart(), || {
                self.persist_and_apply(appliance_id, &settings)
            })
            .await
    }

    async fn persist_and_apply(&self, appliance_id: &str, settings: &S::Settings) -> Result<()> {
        self.store
            .update_settings(appliance_id, settings)
            .await
            .context("update settings", appliance_id)?;

        let reason = match self.store.apply_config(appliance_id).await {
            Ok(true) => return Ok(()),
            Ok(false) => "apply request was rejected".to_string(),
            Err(e) => e.to_string(),
        };

        tracing::warn!(appliance_id, %reason, "Settings saved but not applied");
        Err(CloudError::PartialApply {
            appliance_id: appliance_id.to_string(),
            reason,
        })
    }
}

/// Create/read/delete entry points for one sub-resource kind
pub struct SubResourceController<S: AggregateStore, R> {
    mutator: AggregateMutator<S>,
    _kind: PhantomData<fn() -> R>,
}

impl<S: AggregateStore, R> Clone for SubResourceController<S, R> {
    fn clone(&self) -> Self {
        Self {
            mutator: self.mutator.clone(),
            _kind: PhantomData,
        }
    }
}

impl<S, R> SubResourceController<S, R>
where
    S: AggregateStore,
    R: SubResource<S::Settings>,
{
    pub fn new(mutator: AggregateMutator<S>) -> Self {
        Self {
            mutator,
            _kind: PhantomData,
        }
    }

    pub fn kind(&self) -> &'static str {
        R::KIND
    }

    /// Create the entry and publish its ID and fields once the whole cycle succeeded
    pub async fn create(
        &self,
        appliance_id: &str,
        value: &R,
        sink: &mut dyn ResourceDataSink,
    ) -> Result<CompositeId> {
        let id = self
            .mutator
            .create(appliance_id, value)
            .await
            .context("create", appliance_id)?;

        sink.set_id(&id);
        value.publish(sink)?;
        Ok(id)
    }

    /// Refresh the sink from the remote entry, clearing it if the entry is gone
    pub async fn read(
        &self,
        appliance_id: &str,
        value: &R,
        sink: &mut dyn ResourceDataSink,
    ) -> Result<Option<R>> {
        let found = self.mutator.read(appliance_id, value).await?;
        match &found {
            Some(stored) => {
                sink.set_id(&CompositeId::compute(appliance_id, stored.identity_fields()));
                stored.publish(sink)?;
            }
            None => sink.clear(),
        }
        Ok(found)
    }

    pub async fn exists(&self, appliance_id: &str, value: &R) -> Result<bool> {
        Ok(self.mutator.read(appliance_id, value).await?.is_some())
    }

    pub async fn delete(&self, appliance_id: &str, value: &R) -> Result<()> {
        self.mutator
            .delete(appliance_id, value)
            .await
            .context("delete", appliance_id)
    }
}
