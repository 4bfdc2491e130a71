//! Decoding of AXFR response streams into cache records.

use crate::dns::rcode_str;
use crate::dns::record_type_map::RecordTypeMapper;
use crate::errors::ServiceError;
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{RData, Record as WireRecord};
use tracing::debug;
use zonesync_domain::{Record, RecordData};

/// Number of SOA records in the answer section. A transfer is complete once
/// two have been seen: the stream opens and closes with the zone SOA.
pub fn soa_count(message: &Message) -> usize {
    message
        .answers()
        .iter()
        .filter(|rr| matches!(rr.data(), RData::SOA(_)))
        .count()
}

/// Flattens a transfer message sequence into the records the client caches.
/// Cache order is answer order; records outside the managed set are skipped.
pub fn decode_transfer(messages: &[Message]) -> Result<Vec<Record>, ServiceError> {
    let first = messages
        .first()
        .ok_or_else(|| ServiceError::Transfer("empty transfer response".into()))?;
    if first.response_code() != ResponseCode::NoError {
        return Err(ServiceError::Transfer(format!(
            "server answered {}",
            rcode_str(first.response_code())
        )));
    }

    let answers: Vec<&WireRecord> = messages.iter().flat_map(|m| m.answers().iter()).collect();
    match answers.first() {
        Some(rr) if matches!(rr.data(), RData::SOA(_)) => {}
        _ => {
            return Err(ServiceError::Transfer(
                "transfer does not start with SOA".into(),
            ))
        }
    }

    let mut soa_seen = 0;
    let mut records = Vec::new();
    for rr in answers {
        if matches!(rr.data(), RData::SOA(_)) {
            soa_seen += 1;
            if soa_seen == 2 {
                return Ok(records);
            }
            continue;
        }
        match record_from_wire(rr) {
            Some(record) => records.push(record),
            None => debug!(
                name = %rr.name(),
                rtype = %rr.record_type(),
                "skipping unmanaged record type in transfer"
            ),
        }
    }

    Err(ServiceError::Transfer("missing terminal SOA".into()))
}

fn record_from_wire(rr: &WireRecord) -> Option<Record> {
    // Gate on the type map so a future wire type cannot slip through the
    // rdata match below unnoticed.
    RecordTypeMapper::from_wire(rr.record_type())?;

    let data = match rr.data() {
        RData::A(a) => RecordData::A(a.0),
        RData::AAAA(aaaa) => RecordData::AAAA(aaaa.0),
        RData::CNAME(cname) => RecordData::CNAME(cname.to_utf8()),
        RData::NS(ns) => RecordData::NS(ns.to_utf8()),
        RData::MX(mx) => RecordData::MX {
            priority: mx.preference(),
            mail_server: mx.exchange().to_utf8(),
        },
        RData::TXT(txt) => RecordData::TXT(
            txt.txt_data()
                .iter()
                .map(|part| String::from_utf8_lossy(part).into_owned())
                .collect::<Vec<_>>()
                .join(""),
        ),
        RData::SRV(srv) => RecordData::SRV {
            priority: srv.priority(),
            weight: srv.weight(),
            port: srv.port(),
            target: srv.target().to_utf8(),
        },
        _ => return None,
    };
    Some(Record::new(rr.name().to_utf8(), rr.ttl(), data))
}
