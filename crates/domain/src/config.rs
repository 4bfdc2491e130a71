use crate::errors::ConfigError;
use crate::fqdn;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Raw guard rule lists as they appear in configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GuardLists {
    #[serde(default)]
    pub immutable: Vec<String>,

    #[serde(default)]
    pub admin_only: Vec<String>,
}

/// Connection and zone parameters for the synchronization client.
///
/// The TSIG secret is credential material: it is carried here so the client
/// can sign messages, and must never be logged.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoneConfig {
    /// Authoritative server, `host:port`. The port defaults to 53.
    pub server_addr: String,

    /// Zone apex, normalized to a trailing dot by `validate`.
    pub zone: String,

    pub tsig_key: String,

    /// Base64-encoded shared secret.
    pub tsig_secret: String,

    /// Seconds between full AXFR re-syncs.
    #[serde(default = "default_sync_interval")]
    pub sync_interval: u64,

    /// Seconds between SOA reachability probes.
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval: u64,

    #[serde(default = "default_query_timeout")]
    pub query_timeout_ms: u64,

    #[serde(default)]
    pub guards: GuardLists,

    /// Static address hints surfaced to template rendering; not used by the
    /// client itself.
    #[serde(default)]
    pub ipv4: Option<Ipv4Addr>,

    #[serde(default)]
    pub ipv6: Option<Ipv6Addr>,
}

impl ZoneConfig {
    /// Checks required fields and normalizes the rest: default port, dotted
    /// zone, interval fallbacks. Returns the normalized config.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let (host, port) = split_host_port(&self.server_addr);
        if host.parse::<IpAddr>().is_err() && !fqdn::is_valid_domain(&host) {
            return Err(ConfigError::InvalidHost(host));
        }
        let port = match port {
            Some(raw) => raw
                .parse::<u16>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or(ConfigError::InvalidPort(raw))?,
            None => 53,
        };
        self.server_addr = if host.parse::<Ipv6Addr>().is_ok() {
            format!("[{host}]:{port}")
        } else {
            format!("{host}:{port}")
        };

        if self.zone.is_empty() {
            return Err(ConfigError::MissingZone);
        }
        if !self.zone.ends_with('.') {
            self.zone.push('.');
        }
        if !fqdn::is_valid_fqdn(&self.zone) {
            return Err(ConfigError::InvalidZone(self.zone));
        }

        if self.tsig_key.is_empty() || self.tsig_secret.is_empty() {
            return Err(ConfigError::MissingTsigCredentials);
        }

        if self.sync_interval == 0 {
            self.sync_interval = default_sync_interval();
        }
        if self.health_check_interval == 0 {
            self.health_check_interval = default_health_check_interval();
        }
        if self.query_timeout_ms == 0 {
            self.query_timeout_ms = default_query_timeout();
        }

        Ok(self)
    }
}

fn split_host_port(addr: &str) -> (String, Option<String>) {
    // Bracketed IPv6 literal, e.g. "[::1]:53".
    if let Some(rest) = addr.strip_prefix('[') {
        if let Some((host, port)) = rest.split_once(']') {
            let port = port.strip_prefix(':').map(str::to_string);
            return (host.to_string(), port);
        }
    }
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => (host.to_string(), Some(port.to_string())),
        _ => (addr.to_string(), None),
    }
}

fn default_sync_interval() -> u64 {
    30
}

fn default_health_check_interval() -> u64 {
    60
}

fn default_query_timeout() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ZoneConfig {
        ZoneConfig {
            server_addr: "192.0.2.53:53".into(),
            zone: "example.com.".into(),
            tsig_key: "zonesync-key.".into(),
            tsig_secret: "c2VjcmV0".into(),
            sync_interval: 30,
            health_check_interval: 60,
            query_timeout_ms: 5000,
            guards: GuardLists::default(),
            ipv4: None,
            ipv6: None,
        }
    }

    #[test]
    fn accepts_a_complete_config() {
        let config = base().validate().unwrap();
        assert_eq!(config.server_addr, "192.0.2.53:53");
        assert_eq!(config.zone, "example.com.");
    }

    #[test]
    fn defaults_the_port_and_dot_terminates_the_zone() {
        let mut config = base();
        config.server_addr = "ns1.example.com".into();
        config.zone = "example.com".into();
        let config = config.validate().unwrap();
        assert_eq!(config.server_addr, "ns1.example.com:53");
        assert_eq!(config.zone, "example.com.");
    }

    #[test]
    fn brackets_ipv6_hosts() {
        let mut config = base();
        config.server_addr = "[2001:db8::53]:5353".into();
        let config = config.validate().unwrap();
        assert_eq!(config.server_addr, "[2001:db8::53]:5353");

        let mut config = base();
        config.server_addr = "2001:db8::53".into();
        let config = config.validate().unwrap();
        assert_eq!(config.server_addr, "[2001:db8::53]:53");
    }

    #[test]
    fn rejects_bad_hosts_and_ports() {
        let mut config = base();
        config.server_addr = "not a host:53".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHost(_))
        ));

        let mut config = base();
        config.server_addr = "192.0.2.53:99999".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPort(_))
        ));

        let mut config = base();
        config.server_addr = "192.0.2.53:0".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPort(_))
        ));
    }

    #[test]
    fn requires_zone_and_credentials() {
        let mut config = base();
        config.zone = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::MissingZone)));

        let mut config = base();
        config.tsig_secret = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingTsigCredentials)
        ));
    }

    #[test]
    fn zero_intervals_fall_back_to_defaults() {
        let mut config = base();
        config.sync_interval = 0;
        config.health_check_interval = 0;
        config.query_timeout_ms = 0;
        let config = config.validate().unwrap();
        assert_eq!(config.sync_interval, 30);
        assert_eq!(config.health_check_interval, 60);
        assert_eq!(config.query_timeout_ms, 5000);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ZoneConfig = serde_json::from_str(
            r#"{
                "server_addr": "192.0.2.53:53",
                "zone": "example.com.",
                "tsig_key": "key.",
                "tsig_secret": "c2VjcmV0",
                "guards": { "immutable": ["NS/@"] }
            }"#,
        )
        .unwrap();
        assert_eq!(config.sync_interval, 30);
        assert_eq!(config.health_check_interval, 60);
        assert_eq!(config.guards.immutable, vec!["NS/@".to_string()]);
        assert!(config.guards.admin_only.is_empty());
    }
}
