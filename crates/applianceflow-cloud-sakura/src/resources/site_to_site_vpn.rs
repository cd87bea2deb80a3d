use crate::model::{RouterSettings, SiteToSiteVpn};
use applianceflow_cloud::mutation::{find_by, remove_by, upsert_by};
use applianceflow_cloud::{ResourceDataSink, Result, SubResource};
use serde_json::json;

impl SubResource<RouterSettings> for SiteToSiteVpn {
    const KIND: &'static str = "vpc_router_site_to_site_vpn";

    /// Peer, remote ID and secret, then every route and local prefix in configured order
    fn identity_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.peer.clone(),
            self.remote_id.clone(),
            self.pre_shared_secret.clone(),
        ];
        fields.extend(self.routes.iter().cloned());
        fields.extend(self.local_prefix.iter().cloned());
        fields
    }

    fn insert_into(&self, settings: &mut RouterSettings) {
        upsert_by(&mut settings.site_to_site_vpns, self, |a, b| a == b);
    }

    fn find_in(&self, settings: &RouterSettings) -> Option<Self> {
        find_by(&settings.site_to_site_vpns, self, |a, b| a == b)
    }

    fn remove_from(&self, settings: &mut RouterSettings) -> bool {
        remove_by(&mut settings.site_to_site_vpns, self, |a, b| a == b)
    }

    fn publish(&self, sink: &mut dyn ResourceDataSink) -> Result<()> {
        sink.set_field("peer", json!(self.peer))?;
        sink.set_field("remote_id", json!(self.remote_id))?;
        sink.set_field("pre_shared_secret", json!(self.pre_shared_secret))?;
        sink.set_field("routes", json!(self.routes))?;
        sink.set_field("local_prefix", json!(self.local_prefix))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tunnel(routes: &[&str]) -> SiteToSiteVpn {
        SiteToSiteVpn {
            peer: "198.51.100.1".to_string(),
            remote_id: "198.51.100.1".to_string(),
            pre_shared_secret: "secret".to_string(),
            routes: routes.iter().map(|r| r.to_string()).collect(),
            local_prefix: vec!["192.168.21.0/24".to_string()],
        }
    }

    #[test]
    fn test_routes_are_part_of_identity() {
        let a = tunnel(&["10.0.0.0/8"]);
        let b = tunnel(&["10.0.0.0/8", "172.16.0.0/12"]);

        let mut settings = RouterSettings::default();
        a.insert_into(&mut settings);
        b.insert_into(&mut settings);

        assert_eq!(settings.site_to_site_vpns.len(), 2);
        assert_ne!(a.identity_fields(), b.identity_fields());
        assert_eq!(
            b.identity_fields().last().map(String::as_str),
            Some("192.168.21.0/24")
        );
    }
}
