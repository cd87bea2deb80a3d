use crate::model::{DhcpStaticMapping, RouterSettings};
use applianceflow_cloud::mutation::{find_by, remove_by, upsert_by};
use applianceflow_cloud::{CloudError, ResourceDataSink, Result, SubResource};
use serde_json::json;

/// MAC addresses are compared case-insensitively
fn same_mapping(a: &DhcpStaticMapping, b: &DhcpStaticMapping) -> bool {
    a.ip_address == b.ip_address && a.mac_address.eq_ignore_ascii_case(&b.mac_address)
}

impl SubResource<RouterSettings> for DhcpStaticMapping {
    const KIND: &'static str = "vpc_router_dhcp_static_mapping";

    fn identity_fields(&self) -> Vec<String> {
        // lowercase so the ID does not depend on which spelling was stored
        vec![self.ip_address.clone(), self.mac_address.to_ascii_lowercase()]
    }

    fn validate(&self) -> Result<()> {
        let octets: Vec<&str> = self.mac_address.split(':').collect();
        let well_formed = octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
        if !well_formed {
            return Err(CloudError::InvalidConfig(format!(
                "invalid MAC address: {}",
                self.mac_address
            )));
        }
        Ok(())
    }

    fn insert_into(&self, settings: &mut RouterSettings) {
        upsert_by(&mut settings.dhcp_static_mappings, self, same_mapping);
    }

    fn find_in(&self, settings: &RouterSettings) -> Option<Self> {
        find_by(&settings.dhcp_static_mappings, self, same_mapping)
    }

    fn remove_from(&self, settings: &mut RouterSettings) -> bool {
        remove_by(&mut settings.dhcp_static_mappings, self, same_mapping)
    }

    fn publish(&self, sink: &mut dyn ResourceDataSink) -> Result<()> {
        sink.set_field("ipaddress", json!(self.ip_address))?;
        sink.set_field("macaddress", json!(self.mac_address))?;
        Ok(())
    }
}
