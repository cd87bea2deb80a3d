//! VPC router settings document
//!
//! Mirrors the `Settings` object that Sakura Cloud returns for a VPC router.
//! Every collection is optional on the wire; an absent collection reads as
//! empty.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Full settings of one VPC router
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterSettings {
    #[serde(rename = "Interfaces", default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<RouterInterface>,

    #[serde(rename = "PortForwarding", default, skip_serializing_if = "Vec::is_empty")]
    pub port_forwardings: Vec<PortForwarding>,

    #[serde(rename = "StaticNAT", default, skip_serializing_if = "Vec::is_empty")]
    pub static_nats: Vec<StaticNat>,

    #[serde(rename = "DHCPStaticMapping", default, skip_serializing_if = "Vec::is_empty")]
    pub dhcp_static_mappings: Vec<DhcpStaticMapping>,

    #[serde(rename = "L2TPIPsecServer", default, skip_serializing_if = "Option::is_none")]
    pub l2tp_server: Option<L2tpServer>,

    #[serde(rename = "SiteToSiteIPsecVPN", default, skip_serializing_if = "Vec::is_empty")]
    pub site_to_site_vpns: Vec<SiteToSiteVpn>,

    #[serde(rename = "StaticRoute", default, skip_serializing_if = "Vec::is_empty")]
    pub static_routes: Vec<StaticRoute>,

    #[serde(rename = "Firewall", default, skip_serializing_if = "Vec::is_empty")]
    pub firewalls: Vec<FirewallRuleSet>,
}

/// Private-side NIC in slot 1..=7 (slot 0 is the public side)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterInterface {
    #[serde(rename = "Index")]
    pub index: u8,

    #[serde(rename = "SwitchID")]
    pub switch_id: String,

    #[serde(rename = "VirtualIPAddress", default, skip_serializing_if = "Option::is_none")]
    pub virtual_ip: Option<String>,

    #[serde(rename = "IPAddress", default)]
    pub ip_addresses: Vec<String>,

    #[serde(rename = "NetworkMaskLen")]
    pub netmask_len: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortForwarding {
    #[serde(rename = "Protocol")]
    pub protocol: Protocol,

    #[serde(rename = "GlobalPort")]
    pub global_port: u16,

    #[serde(rename = "PrivateAddress")]
    pub private_address: String,

    #[serde(rename = "PrivatePort")]
    pub private_port: u16,

    #[serde(rename = "Description", default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticNat {
    #[serde(rename = "GlobalAddress")]
    pub global_address: String,

    #[serde(rename = "PrivateAddress")]
    pub private_address: String,

    #[serde(rename = "Description", default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpStaticMapping {
    #[serde(rename = "IPAddress")]
    pub ip_address: String,

    #[serde(rename = "MACAddress")]
    pub mac_address: String,
}

/// L2TP/IPsec remote-access server; at most one per router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2tpServer {
    #[serde(rename = "PreSharedSecret")]
    pub pre_shared_secret: String,

    #[serde(rename = "RangeStart")]
    pub range_start: String,

    #[serde(rename = "RangeStop")]
    pub range_stop: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteToSiteVpn {
    #[serde(rename = "Peer")]
    pub peer: String,

    #[serde(rename = "RemoteID")]
    pub remote_id: String,

    #[serde(rename = "PreSharedSecret")]
    pub pre_shared_secret: String,

    #[serde(rename = "Routes", default)]
    pub routes: Vec<String>,

    #[serde(rename = "LocalPrefix", default)]
    pub local_prefix: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRoute {
    #[serde(rename = "Prefix")]
    pub prefix: String,

    #[serde(rename = "NextHop")]
    pub next_hop: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Send,
    Receive,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Send => write!(f, "send"),
            Direction::Receive => write!(f, "receive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirewallProtocol {
    Tcp,
    Udp,
    Icmp,
    Ip,
}

/// Ordered firewall rules for one interface and direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRuleSet {
    #[serde(rename = "InterfaceIndex")]
    pub interface_index: u8,

    #[serde(rename = "Direction")]
    pub direction: Direction,

    #[serde(rename = "Rules", default)]
    pub rules: Vec<FirewallRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRule {
    #[serde(rename = "Protocol")]
    pub protocol: FirewallProtocol,

    #[serde(rename = "SourceNetwork", default)]
    pub source_network: String,

    #[serde(rename = "SourcePort", default)]
    pub source_port: String,

    #[serde(rename = "DestinationNetwork", default)]
    pub destination_network: String,

    #[serde(rename = "DestinationPort", default)]
    pub destination_port: String,

    #[serde(rename = "Allow")]
    pub allow: bool,

    #[serde(rename = "Logging", default)]
    pub logging: bool,

    #[serde(rename = "Description", default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collections_read_as_empty() {
        let settings: RouterSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, RouterSettings::default());
    }

    #[test]
    fn test_settings_wire_names() {
        let json = r#"{
            "PortForwarding": [{
                "Protocol": "tcp",
                "GlobalPort": 10022,
                "PrivateAddress": "192.168.1.1",
                "PrivatePort": 22
            }],
            "L2TPIPsecServer": {
                "PreSharedSecret": "secret",
                "RangeStart": "192.168.1.100",
                "RangeStop": "192.168.1.150"
            }
        }"#;

        let settings: RouterSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.port_forwardings.len(), 1);
        assert_eq!(settings.port_forwardings[0].protocol, Protocol::Tcp);
        assert_eq!(settings.port_forwardings[0].description, "");
        assert!(settings.l2tp_server.is_some());

        let out = serde_json::to_value(&settings).unwrap();
        assert!(out.get("StaticNAT").is_none());
        assert_eq!(out["PortForwarding"][0]["GlobalPort"], 10022);
    }
}
