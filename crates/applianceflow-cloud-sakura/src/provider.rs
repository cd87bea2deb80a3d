//! Sakura Cloud VPC router provider implementation

use crate::config::SakuraConfig;
use crate::model::RouterSettings;
use crate::resources::{
    DhcpStaticMappingController, FirewallController, InterfaceController, L2tpController,
    PortForwardingController, SiteToSiteVpnController, StaticNatController, StaticRouteController,
};
use crate::usacloud::{UsacloudAuth, UsacloudRouterStore};
use applianceflow_cloud::{
    AggregateMutator, AggregateStore, NamedMutexRegistry, PowerConfig, PowerCycleController,
    Result, SubResource, SubResourceController,
};
use std::sync::Arc;

/// Entry point for managing VPC routers and their sub-resources
///
/// All controllers handed out by one provider share its lock registry, so
/// concurrent changes to the same router are serialized regardless of kind.
pub struct VpcRouterProvider<S: AggregateStore<Settings = RouterSettings> = UsacloudRouterStore> {
    mutator: AggregateMutator<S>,
}

impl<S: AggregateStore<Settings = RouterSettings>> Clone for VpcRouterProvider<S> {
    fn clone(&self) -> Self {
        Self {
            mutator: self.mutator.clone(),
        }
    }
}

impl VpcRouterProvider<UsacloudRouterStore> {
    /// Provider backed by usacloud, using the process-wide lock registry
    pub fn new(config: &SakuraConfig, power: PowerConfig) -> Self {
        Self::with_store(
            Arc::new(UsacloudRouterStore::new(config)),
            NamedMutexRegistry::global().clone(),
            power,
        )
    }

    /// Provider configured entirely from the environment
    pub fn from_env() -> Result<Self> {
        let config = SakuraConfig::from_env()?;
        let power = PowerConfig::from_env()?;
        Ok(Self::new(&config, power))
    }

    pub async fn check_auth(&self) -> Result<UsacloudAuth> {
        Ok(self.mutator.store().usacloud().check_auth().await?)
    }
}

impl<S: AggregateStore<Settings = RouterSettings>> VpcRouterProvider<S> {
    pub fn with_store(store: Arc<S>, locks: NamedMutexRegistry, power: PowerConfig) -> Self {
        Self {
            mutator: AggregateMutator::new(store, locks, power),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        self.mutator.store()
    }

    pub fn power(&self) -> &PowerCycleController<S> {
        self.mutator.power()
    }

    fn controller<R: SubResource<RouterSettings>>(&self) -> SubResourceController<S, R> {
        SubResourceController::new(self.mutator.clone())
    }

    pub fn interfaces(&self) -> InterfaceController<S> {
        self.controller()
    }

    pub fn port_forwardings(&self) -> PortForwardingController<S> {
        self.controller()
    }

    pub fn static_nats(&self) -> StaticNatController<S> {
        self.controller()
    }

    pub fn dhcp_static_mappings(&self) -> DhcpStaticMappingController<S> {
        self.controller()
    }

    pub fn l2tp(&self) -> L2tpController<S> {
        self.controller()
    }

    pub fn site_to_site_vpns(&self) -> SiteToSiteVpnController<S> {
        self.controller()
    }

    pub fn static_routes(&self) -> StaticRouteController<S> {
        self.controller()
    }

    pub fn firewalls(&self) -> FirewallController<S> {
        self.controller()
    }

    /// Wait for a freshly created router to finish provisioning
    pub async fn wait_available(&self, router_id: &str) -> Result<()> {
        let power = self.mutator.power();
        power.wait_available(router_id, power.timeout()).await
    }

    /// Power the router off and delete it.
    ///
    /// Holds the router's lock for the whole sequence. A router that is
    /// already gone counts as deleted.
    pub async fn delete_router(&self, router_id: &str) -> Result<()> {
        let _lock = self.mutator.locks().lock(router_id).await;
        let power = self.mutator.power();

        match power.ensure_down(router_id, power.timeout()).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::info!(router_id, "Router already deleted");
                return Ok(());
            }
            Err(e) => return Err(e.context("delete router", router_id)),
        }

        tracing::info!(router_id, "Deleting router");
        match self.mutator.store().delete(router_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e.context("delete router", router_id)),
        }
    }
}
