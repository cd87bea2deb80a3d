use crate::model::{RouterSettings, StaticRoute};
use applianceflow_cloud::mutation::{find_by, remove_by, upsert_by};
use applianceflow_cloud::{ResourceDataSink, Result, SubResource};
use serde_json::json;

fn same_route(a: &StaticRoute, b: &StaticRoute) -> bool {
    a.prefix == b.prefix && a.next_hop == b.next_hop
}

impl SubResource<RouterSettings> for StaticRoute {
    const KIND: &'static str = "vpc_router_static_route";

    fn identity_fields(&self) -> Vec<String> {
        vec![self.prefix.clone(), self.next_hop.clone()]
    }

    fn insert_into(&self, settings: &mut RouterSettings) {
        upsert_by(&mut settings.static_routes, self, same_route);
    }

    fn find_in(&self, settings: &RouterSettings) -> Option<Self> {
        find_by(&settings.static_routes, self, same_route)
    }

    fn remove_from(&self, settings: &mut RouterSettings) -> bool {
        remove_by(&mut settings.static_routes, self, same_route)
    }

    fn publish(&self, sink: &mut dyn ResourceDataSink) -> Result<()> {
        sink.set_field("prefix", json!(self.prefix))?;
        sink.set_field("next_hop", json!(self.next_hop))?;
        Ok(())
    }
}
