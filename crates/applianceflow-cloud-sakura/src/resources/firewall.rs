//! Firewall rule lists
//!
//! One entry per interface and direction; creating it replaces the whole
//! rule list for that pair.

use crate::model::{FirewallRuleSet, RouterSettings};
use crate::resources::interface::MAX_INDEX;
use applianceflow_cloud::mutation::{find_by, remove_by, upsert_by};
use applianceflow_cloud::{CloudError, ResourceDataSink, Result, SubResource};
use serde_json::json;

fn same_target(a: &FirewallRuleSet, b: &FirewallRuleSet) -> bool {
    a.interface_index == b.interface_index && a.direction == b.direction
}

impl SubResource<RouterSettings> for FirewallRuleSet {
    const KIND: &'static str = "vpc_router_firewall";

    fn identity_fields(&self) -> Vec<String> {
        vec![self.interface_index.to_string(), self.direction.to_string()]
    }

    fn validate(&self) -> Result<()> {
        // index 0 is the public side, which also carries a firewall
        if self.interface_index > MAX_INDEX {
            return Err(CloudError::InvalidConfig(format!(
                "firewall interface index must be between 0 and {}, got {}",
                MAX_INDEX, self.interface_index
            )));
        }
        Ok(())
    }

    fn insert_into(&self, settings: &mut RouterSettings) {
        upsert_by(&mut settings.firewalls, self, same_target);
    }

    fn find_in(&self, settings: &RouterSettings) -> Option<Self> {
        find_by(&settings.firewalls, self, same_target)
    }

    fn remove_from(&self, settings: &mut RouterSettings) -> bool {
        remove_by(&mut settings.firewalls, self, same_target)
    }

    fn publish(&self, sink: &mut dyn ResourceDataSink) -> Result<()> {
        sink.set_field("vpc_router_interface_index", json!(self.interface_index))?;
        sink.set_field("direction", json!(self.direction))?;
        sink.set_field("expressions", serde_json::to_value(&self.rules)?)?;
        Ok(())
    }
}
