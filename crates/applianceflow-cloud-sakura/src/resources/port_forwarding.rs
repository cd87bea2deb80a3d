use crate::model::{PortForwarding, RouterSettings};
use applianceflow_cloud::mutation::{find_by, remove_by, upsert_by};
use applianceflow_cloud::{CloudError, ResourceDataSink, Result, SubResource};
use serde_json::json;

fn same_rule(a: &PortForwarding, b: &PortForwarding) -> bool {
    a.protocol == b.protocol
        && a.global_port == b.global_port
        && a.private_address == b.private_address
        && a.private_port == b.private_port
}

impl SubResource<RouterSettings> for PortForwarding {
    const KIND: &'static str = "vpc_router_port_forwarding";

    fn identity_fields(&self) -> Vec<String> {
        vec![
            self.protocol.to_string(),
            self.global_port.to_string(),
            self.private_address.clone(),
            self.private_port.to_string(),
        ]
    }

    fn validate(&self) -> Result<()> {
        if self.global_port == 0 || self.private_port == 0 {
            return Err(CloudError::InvalidConfig(
                "port forwarding ports must be between 1 and 65535".to_string(),
            ));
        }
        Ok(())
    }

    fn insert_into(&self, settings: &mut RouterSettings) {
        upsert_by(&mut settings.port_forwardings, self, same_rule);
    }

    fn find_in(&self, settings: &RouterSettings) -> Option<Self> {
        find_by(&settings.port_forwardings, self, same_rule)
    }

    fn remove_from(&self, settings: &mut RouterSettings) -> bool {
        remove_by(&mut settings.port_forwardings, self, same_rule)
    }

    fn publish(&self, sink: &mut dyn ResourceDataSink) -> Result<()> {
        sink.set_field("protocol", json!(self.protocol))?;
        sink.set_field("global_port", json!(self.global_port))?;
        sink.set_field("private_address", json!(self.private_address))?;
        sink.set_field("private_port", json!(self.private_port))?;
        sink.set_field("description", json!(self.description))?;
        Ok(())
    }
}
