//! L2TP/IPsec remote-access server
//!
//! A router has at most one. Lookups return whatever server is configured,
//! so a server changed out of band shows up as a different composite ID.

use crate::model::{L2tpServer, RouterSettings};
use applianceflow_cloud::{ResourceDataSink, Result, SubResource};
use serde_json::json;

impl SubResource<RouterSettings> for L2tpServer {
    const KIND: &'static str = "vpc_router_l2tp";

    fn identity_fields(&self) -> Vec<String> {
        vec![
            self.pre_shared_secret.clone(),
            self.range_start.clone(),
            self.range_stop.clone(),
        ]
    }

    fn insert_into(&self, settings: &mut RouterSettings) {
        settings.l2tp_server = Some(self.clone());
    }

    fn find_in(&self, settings: &RouterSettings) -> Option<Self> {
        settings.l2tp_server.clone()
    }

    fn remove_from(&self, settings: &mut RouterSettings) -> bool {
        settings.l2tp_server.take().is_some()
    }

    fn publish(&self, sink: &mut dyn ResourceDataSink) -> Result<()> {
        sink.set_field("pre_shared_secret", json!(self.pre_shared_secret))?;
        sink.set_field("range_start", json!(self.range_start))?;
        sink.set_field("range_stop", json!(self.range_stop))?;
        Ok(())
    }
}
