use crate::model::{RouterSettings, StaticNat};
use applianceflow_cloud::mutation::{find_by, remove_by, upsert_by};
use applianceflow_cloud::{ResourceDataSink, Result, SubResource};
use serde_json::json;

fn same_mapping(a: &StaticNat, b: &StaticNat) -> bool {
    a.global_address == b.global_address && a.private_address == b.private_address
}

impl SubResource<RouterSettings> for StaticNat {
    const KIND: &'static str = "vpc_router_static_nat";

    fn identity_fields(&self) -> Vec<String> {
        vec![self.global_address.clone(), self.private_address.clone()]
    }

    fn insert_into(&self, settings: &mut RouterSettings) {
        upsert_by(&mut settings.static_nats, self, same_mapping);
    }

    fn find_in(&self, settings: &RouterSettings) -> Option<Self> {
        find_by(&settings.static_nats, self, same_mapping)
    }

    fn remove_from(&self, settings: &mut RouterSettings) -> bool {
        remove_by(&mut settings.static_nats, self, same_mapping)
    }

    fn publish(&self, sink: &mut dyn ResourceDataSink) -> Result<()> {
        sink.set_field("global_address", json!(self.global_address))?;
        sink.set_field("private_address", json!(self.private_address))?;
        sink.set_field("description", json!(self.description))?;
        Ok(())
    }
}
