//! VPC router sub-resources
//!
//! Each kind lives inside the router's single settings document and is
//! managed through its own [`SubResourceController`].

pub mod dhcp_static_mapping;
pub mod firewall;
pub mod interface;
pub mod l2tp;
pub mod port_forwarding;
pub mod site_to_site_vpn;
pub mod static_nat;
pub mod static_route;

use crate::model::{
    DhcpStaticMapping, FirewallRuleSet, L2tpServer, PortForwarding, RouterInterface,
    SiteToSiteVpn, StaticNat, StaticRoute,
};
use crate::usacloud::UsacloudRouterStore;
use applianceflow_cloud::SubResourceController;

pub type InterfaceController<S = UsacloudRouterStore> = SubResourceController<S, RouterInterface>;
pub type PortForwardingController<S = UsacloudRouterStore> =
    SubResourceController<S, PortForwarding>;
pub type StaticNatController<S = UsacloudRouterStore> = SubResourceController<S, StaticNat>;
pub type DhcpStaticMappingController<S = UsacloudRouterStore> =
    SubResourceController<S, DhcpStaticMapping>;
pub type L2tpController<S = UsacloudRouterStore> = SubResourceController<S, L2tpServer>;
pub type SiteToSiteVpnController<S = UsacloudRouterStore> =
    SubResourceController<S, SiteToSiteVpn>;
pub type StaticRouteController<S = UsacloudRouterStore> = SubResourceController<S, StaticRoute>;
pub type FirewallController<S = UsacloudRouterStore> = SubResourceController<S, FirewallRuleSet>;
