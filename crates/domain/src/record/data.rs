use super::RecordType;
use crate::errors::RecordError;
use crate::fqdn;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// RDATA payload of a managed resource record, one variant per supported
/// type. Matching on this enum is exhaustive, so adding a type forces every
/// consumer to handle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    CNAME(String),
    MX { priority: u16, mail_server: String },
    TXT(String),
    NS(String),
    SRV { priority: u16, weight: u16, port: u16, target: String },
}

impl RecordData {
    /// Validates a raw value against the grammar of `rtype` and builds the
    /// typed payload. Composite values (MX, SRV) are colon-delimited.
    pub fn parse(rtype: RecordType, value: &str) -> Result<Self, RecordError> {
        match rtype {
            RecordType::A => value
                .parse::<Ipv4Addr>()
                .map(RecordData::A)
                .map_err(|_| RecordError::InvalidIpv4(value.to_string())),
            RecordType::AAAA => parse_ipv6(value),
            RecordType::CNAME => {
                validate_fqdn(value)?;
                Ok(RecordData::CNAME(value.to_string()))
            }
            RecordType::NS => {
                validate_fqdn(value)?;
                Ok(RecordData::NS(value.to_string()))
            }
            RecordType::MX => parse_mx(value),
            RecordType::TXT => {
                if value.is_empty() || value.len() > 255 {
                    return Err(RecordError::InvalidTxt);
                }
                Ok(RecordData::TXT(value.to_string()))
            }
            RecordType::SRV => parse_srv(value),
        }
    }

    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::AAAA(_) => RecordType::AAAA,
            RecordData::CNAME(_) => RecordType::CNAME,
            RecordData::MX { .. } => RecordType::MX,
            RecordData::TXT(_) => RecordType::TXT,
            RecordData::NS(_) => RecordType::NS,
            RecordData::SRV { .. } => RecordType::SRV,
        }
    }

    /// The textual RDATA, without the type tag.
    pub fn value(&self) -> String {
        match self {
            RecordData::A(ip) => ip.to_string(),
            RecordData::AAAA(ip) => ip.to_string(),
            RecordData::CNAME(alias) => alias.clone(),
            RecordData::MX { priority, mail_server } => format!("{priority} {mail_server}"),
            RecordData::TXT(text) => text.clone(),
            RecordData::NS(name_server) => name_server.clone(),
            RecordData::SRV { priority, weight, port, target } => {
                format!("{priority} {weight} {port} {target}")
            }
        }
    }
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::TXT(text) => write!(f, "TXT \"{text}\""),
            _ => write!(f, "{} {}", self.record_type(), self.value()),
        }
    }
}

fn validate_fqdn(value: &str) -> Result<(), RecordError> {
    if fqdn::is_valid_fqdn(value) {
        Ok(())
    } else {
        Err(RecordError::InvalidFqdn(value.to_string()))
    }
}

fn parse_ipv6(value: &str) -> Result<RecordData, RecordError> {
    let ip = value
        .parse::<IpAddr>()
        .map_err(|_| RecordError::InvalidIpv6(value.to_string()))?;
    match ip {
        // IPv4 and IPv4-mapped forms belong in A records.
        IpAddr::V4(_) => Err(RecordError::InvalidIpv6(value.to_string())),
        IpAddr::V6(v6) if v6.to_ipv4_mapped().is_some() => {
            Err(RecordError::InvalidIpv6(value.to_string()))
        }
        IpAddr::V6(v6) => Ok(RecordData::AAAA(v6)),
    }
}

fn parse_mx(value: &str) -> Result<RecordData, RecordError> {
    let (priority, mail_server) = value
        .split_once(':')
        .ok_or_else(|| RecordError::InvalidMx(value.to_string()))?;
    let priority = priority
        .parse::<u16>()
        .map_err(|_| RecordError::InvalidMx(value.to_string()))?;
    if !fqdn::is_valid_fqdn(mail_server) {
        return Err(RecordError::InvalidFqdn(mail_server.to_string()));
    }
    Ok(RecordData::MX {
        priority,
        mail_server: mail_server.to_string(),
    })
}

fn parse_srv(value: &str) -> Result<RecordData, RecordError> {
    let mut parts = value.splitn(4, ':');
    let (Some(priority), Some(weight), Some(port), Some(target)) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(RecordError::InvalidSrv(value.to_string()));
    };
    let priority = priority
        .parse::<u16>()
        .map_err(|_| RecordError::InvalidSrv(value.to_string()))?;
    let weight = weight
        .parse::<u16>()
        .map_err(|_| RecordError::InvalidSrv(value.to_string()))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| RecordError::InvalidSrv(value.to_string()))?;
    if !fqdn::is_valid_fqdn(target) {
        return Err(RecordError::InvalidFqdn(target.to_string()));
    }
    Ok(RecordData::SRV {
        priority,
        weight,
        port,
        target: target.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_by_type() {
        let cases: &[(RecordType, &str, bool)] = &[
            (RecordType::A, "192.0.2.1", true),
            (RecordType::A, "invalid-ip", false),
            (RecordType::A, "::1", false),
            (RecordType::AAAA, "::1", true),
            (RecordType::AAAA, "2001:db8::2", true),
            (RecordType::AAAA, "invalid-ipv6", false),
            (RecordType::AAAA, "192.0.2.1", false),
            (RecordType::AAAA, "::ffff:192.0.2.1", false),
            (RecordType::MX, "10:mail.example.com.", true),
            (RecordType::MX, "invalid-format", false),
            (RecordType::MX, "99999:mail.example.com.", false),
            (RecordType::MX, "10:not-a-domain", false),
            (RecordType::NS, "ns1.example.com.", true),
            (RecordType::NS, "invalid-ns", false),
            (RecordType::CNAME, "example.com.", true),
            (RecordType::CNAME, "invalid-cname", false),
            (RecordType::TXT, "valid text", true),
            (RecordType::TXT, "", false),
            (RecordType::SRV, "10:20:5060:sipserver.example.com.", true),
            (RecordType::SRV, "invalid-srv", false),
            (RecordType::SRV, "10:bad:5060:sipserver.example.com.", false),
            (RecordType::SRV, "10:20:5060:invalid-target", false),
        ];

        for (rtype, value, ok) in cases {
            let result = RecordData::parse(*rtype, value);
            assert_eq!(
                result.is_ok(),
                *ok,
                "RecordData::parse({rtype}, {value:?}) = {result:?}"
            );
        }
    }

    #[test]
    fn oversized_txt_is_rejected() {
        let long = "x".repeat(256);
        assert_eq!(
            RecordData::parse(RecordType::TXT, &long),
            Err(RecordError::InvalidTxt)
        );
        assert!(RecordData::parse(RecordType::TXT, &"x".repeat(255)).is_ok());
    }

    #[test]
    fn canonical_text_is_deterministic() {
        let mx = RecordData::parse(RecordType::MX, "10:mail.example.com.").unwrap();
        assert_eq!(mx.value(), "10 mail.example.com.");
        assert_eq!(mx.to_string(), "MX 10 mail.example.com.");

        let srv = RecordData::parse(RecordType::SRV, "10:20:5060:sip.example.com.").unwrap();
        assert_eq!(srv.value(), "10 20 5060 sip.example.com.");
        assert_eq!(srv.to_string(), "SRV 10 20 5060 sip.example.com.");

        let txt = RecordData::parse(RecordType::TXT, "v=spf1 -all").unwrap();
        assert_eq!(txt.value(), "v=spf1 -all");
        assert_eq!(txt.to_string(), "TXT \"v=spf1 -all\"");

        let a = RecordData::parse(RecordType::A, "192.0.2.1").unwrap();
        assert_eq!(a.to_string(), "A 192.0.2.1");
    }
}
