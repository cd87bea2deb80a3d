//! Sakura Cloud VPC router provider for ApplianceFlow
//!
//! A VPC router keeps all of its configuration (interfaces, port forwarding,
//! NAT, DHCP, VPN, routes, firewall) in one settings document. This crate
//! exposes each of those as an independent sub-resource on top of
//! `applianceflow-cloud`'s read-modify-write machinery.
//!
//! # Requirements
//!
//! - `usacloud` CLI must be installed and configured
//! - Authentication is managed through usacloud configuration
//!
//! # Example
//!
//! ```ignore
//! use applianceflow_cloud::ResourceState;
//! use applianceflow_cloud_sakura::{PortForwarding, Protocol, VpcRouterProvider};
//!
//! let provider = VpcRouterProvider::from_env()?;
//!
//! let rule = PortForwarding {
//!     protocol: Protocol::Tcp,
//!     global_port: 10022,
//!     private_address: "192.168.1.1".into(),
//!     private_port: 22,
//!     description: String::new(),
//! };
//!
//! let mut state = ResourceState::new("vpc_router_port_forwarding");
//! let id = provider
//!     .port_forwardings()
//!     .create("113000000001", &rule, &mut state)
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod resources;
pub mod usacloud;

pub use config::SakuraConfig;
pub use error::{Result, SakuraError};
pub use model::{
    DhcpStaticMapping, Direction, FirewallProtocol, FirewallRule, FirewallRuleSet, L2tpServer,
    PortForwarding, Protocol, RouterInterface, RouterSettings, SiteToSiteVpn, StaticNat,
    StaticRoute,
};
pub use provider::VpcRouterProvider;
pub use usacloud::{RouterInfo, Usacloud, UsacloudAuth, UsacloudRouterStore};
