//! Private-side router interfaces
//!
//! Interfaces occupy fixed slots. Adding or removing one changes the
//! router's hardware, so the router must be powered off around the change.

use crate::model::{RouterInterface, RouterSettings};
use applianceflow_cloud::{CloudError, ResourceDataSink, Result, SubResource};
use serde_json::json;

pub const MIN_INDEX: u8 = 1;
pub const MAX_INDEX: u8 = 7;

impl SubResource<RouterSettings> for RouterInterface {
    const KIND: &'static str = "vpc_router_interface";

    fn identity_fields(&self) -> Vec<String> {
        vec![self.index.to_string()]
    }

    fn needs_restart(&self) -> bool {
        true
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_INDEX..=MAX_INDEX).contains(&self.index) {
            return Err(CloudError::InvalidConfig(format!(
                "interface index must be between {} and {}, got {}",
                MIN_INDEX, MAX_INDEX, self.index
            )));
        }
        if self.ip_addresses.is_empty() {
            return Err(CloudError::InvalidConfig(
                "interface needs at least one IP address".to_string(),
            ));
        }
        Ok(())
    }

    fn insert_into(&self, settings: &mut RouterSettings) {
        let interfaces = &mut settings.interfaces;
        match interfaces.iter_mut().find(|i| i.index == self.index) {
            Some(existing) => *existing = self.clone(),
            None => {
                interfaces.push(self.clone());
                interfaces.sort_by_key(|i| i.index);
            }
        }
    }

    fn find_in(&self, settings: &RouterSettings) -> Option<Self> {
        settings
            .interfaces
            .iter()
            .find(|i| i.index == self.index)
            .cloned()
    }

    fn remove_from(&self, settings: &mut RouterSettings) -> bool {
        let before = settings.interfaces.len();
        settings.interfaces.retain(|i| i.index != self.index);
        settings.interfaces.len() != before
    }

    fn publish(&self, sink: &mut dyn ResourceDataSink) -> Result<()> {
        sink.set_field("index", json!(self.index))?;
        sink.set_field("switch_id", json!(self.switch_id))?;
        sink.set_field("vip", json!(self.virtual_ip))?;
        sink.set_field("ip_addresses", json!(self.ip_addresses))?;
        sink.set_field("nw_mask_len", json!(self.netmask_len))?;
        Ok(())
    }
}
