use super::{RecordData, RecordType};
use crate::errors::RecordError;
use crate::fqdn;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// A named, TTL-bound resource record with a content digest.
///
/// Records are created once and never mutated: the hash is derived at
/// construction and can only go stale if a field changes, which the private
/// fields rule out. An "update" is modelled as remove-old + insert-new.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    name: String,
    ttl: u32,
    data: RecordData,
    hash: String,
}

impl Record {
    pub fn new(name: impl Into<String>, ttl: u32, data: RecordData) -> Self {
        let name = name.into();
        let hash = hash_record(&name, ttl, &data);
        Self {
            name,
            ttl,
            data,
            hash,
        }
    }

    /// Builds a record from the raw string fields an external caller (form
    /// input, API payload) provides. Relative host names are expanded onto
    /// the zone; `@` and the empty string mean the apex.
    pub fn from_raw(
        rtype: &str,
        host: &str,
        value: &str,
        ttl: &str,
        zone: &str,
    ) -> Result<Self, RecordError> {
        let rtype = RecordType::from_str(rtype)?;
        let ttl = ttl
            .parse::<u32>()
            .map_err(|_| RecordError::InvalidTtl(ttl.to_string()))?;
        let data = RecordData::parse(rtype, value)?;
        let name = if host.is_empty() || host == "@" {
            zone.to_string()
        } else if host.ends_with('.') {
            host.to_string()
        } else {
            fqdn::to_fqdn(host, zone)
        };
        Ok(Self::new(name, ttl, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    /// Hex SHA-256 digest of (type, name, canonical data, TTL).
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// Zone-file-fragment form, e.g. `www.example.com. 300 A 192.0.2.1`. This is
/// the canonical string the cache uses to match entries for removal.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.ttl, self.data)
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Record", 5)?;
        state.serialize_field("type", self.data.record_type().as_str())?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("value", &self.data.value())?;
        state.serialize_field("ttl", &self.ttl)?;
        state.serialize_field("hash", &self.hash)?;
        state.end()
    }
}

fn hash_record(name: &str, ttl: u32, data: &RecordData) -> String {
    let input = format!("{}{}{}{}", data.record_type(), name, data, ttl);
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: &str) -> Record {
        Record::from_raw("A", "www", value, "3600", "example.com.").unwrap()
    }

    #[test]
    fn from_raw_validates_every_field() {
        let zone = "example.com.";
        let cases: &[(&str, &str, &str, &str, bool)] = &[
            ("A", "www", "192.0.2.1", "3600", true),
            ("A", "www", "invalid-ip", "3600", false),
            ("AAAA", "www", "::1", "3600", true),
            ("AAAA", "www", "invalid-ipv6", "3600", false),
            ("MX", "mail", "10:mail.example.com.", "3600", true),
            ("MX", "mail", "invalid-format", "3600", false),
            ("NS", "ns1", "ns1.example.com.", "3600", true),
            ("NS", "ns1", "invalid-ns", "3600", false),
            ("CNAME", "www", "example.com.", "3600", true),
            ("CNAME", "www", "invalid-cname", "3600", false),
            ("TXT", "txt", "valid text", "3600", true),
            ("TXT", "txt", "", "3600", false),
            ("SRV", "_sip._tcp.www", "10:20:5060:sip.example.com.", "3600", true),
            ("SRV", "_sip._tcp.www", "invalid-srv", "3600", false),
            ("SRV", "_sip._tcp.www", "10:bad:5060:sip.example.com.", "3600", false),
            ("SRV", "_sip._tcp.www", "10:20:5060:invalid-target", "3600", false),
            ("PTR", "www", "192.0.2.1", "3600", false),
            ("A", "www", "192.0.2.1", "not-a-ttl", false),
        ];

        for (rtype, host, value, ttl, ok) in cases {
            let result = Record::from_raw(rtype, host, value, ttl, zone);
            assert_eq!(
                result.is_ok(),
                *ok,
                "from_raw({rtype}, {host}, {value:?}, {ttl}) = {result:?}"
            );
        }
    }

    #[test]
    fn expands_host_onto_zone() {
        let r = record("192.0.2.1");
        assert_eq!(r.name(), "www.example.com.");

        let apex = Record::from_raw("A", "@", "192.0.2.1", "300", "example.com.").unwrap();
        assert_eq!(apex.name(), "example.com.");

        let absolute =
            Record::from_raw("A", "www.example.com.", "192.0.2.1", "300", "example.com.").unwrap();
        assert_eq!(absolute.name(), "www.example.com.");
    }

    #[test]
    fn hash_is_pure_and_field_sensitive() {
        let a = record("192.0.2.1");
        let b = record("192.0.2.1");
        assert_eq!(a.hash(), b.hash());
        assert!(!a.hash().is_empty());

        let other_value = record("192.0.2.2");
        assert_ne!(a.hash(), other_value.hash());

        let other_ttl = Record::from_raw("A", "www", "192.0.2.1", "60", "example.com.").unwrap();
        assert_ne!(a.hash(), other_ttl.hash());

        let other_name = Record::from_raw("A", "web", "192.0.2.1", "3600", "example.com.").unwrap();
        assert_ne!(a.hash(), other_name.hash());
    }

    #[test]
    fn canonical_display() {
        let r = record("192.0.2.1");
        assert_eq!(r.to_string(), "www.example.com. 3600 A 192.0.2.1");
    }

    #[test]
    fn serializes_for_the_dashboard() {
        let r = record("192.0.2.1");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["type"], "A");
        assert_eq!(json["name"], "www.example.com.");
        assert_eq!(json["value"], "192.0.2.1");
        assert_eq!(json["ttl"], 3600);
        assert_eq!(json["hash"], r.hash());
    }
}
