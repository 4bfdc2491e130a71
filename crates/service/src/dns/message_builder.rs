//! Construction of the DNS messages the client exchanges: SOA probes, AXFR
//! requests and RFC 2136 UPDATE messages, all in wire format via
//! `hickory-proto`.

use crate::errors::ServiceError;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::{CNAME, MX, NS, SRV, TXT};
use hickory_proto::rr::{DNSClass, Name, RData, Record as WireRecord, RecordType as WireType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;
use zonesync_domain::{Record, RecordData};

pub struct MessageBuilder;

impl MessageBuilder {
    /// Standard SOA query for the zone, used as the reachability probe.
    pub fn soa_query(zone: &Name) -> Message {
        let mut query = Query::new();
        query.set_name(zone.clone());
        query.set_query_type(WireType::SOA);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);
        message
    }

    /// Full zone transfer request. Sent over TCP and TSIG-signed by the
    /// caller.
    pub fn axfr_query(zone: &Name) -> Message {
        let mut query = Query::new();
        query.set_name(zone.clone());
        query.set_query_type(WireType::AXFR);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.add_query(query);
        message
    }

    /// UPDATE inserting `record` into the zone (class IN, record TTL).
    pub fn update_insert(zone: &Name, record: &Record) -> Result<Message, ServiceError> {
        let rr = Self::resource_record(record, DNSClass::IN, record.ttl())?;
        Ok(Self::update_message(zone, rr))
    }

    /// UPDATE deleting the RR that matches `record`'s rdata exactly
    /// (class NONE, TTL 0 per RFC 2136 §2.5.4).
    pub fn update_delete(zone: &Name, record: &Record) -> Result<Message, ServiceError> {
        let rr = Self::resource_record(record, DNSClass::NONE, 0)?;
        Ok(Self::update_message(zone, rr))
    }

    pub fn serialize(message: &Message) -> Result<Vec<u8>, ServiceError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        message
            .emit(&mut encoder)
            .map_err(|e| ServiceError::Encode(e.to_string()))?;
        Ok(buf)
    }

    fn update_message(zone: &Name, rr: WireRecord) -> Message {
        // The zone section of an UPDATE is carried as an SOA question.
        let mut zone_query = Query::new();
        zone_query.set_name(zone.clone());
        zone_query.set_query_type(WireType::SOA);
        zone_query.set_query_class(DNSClass::IN);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Update);
        message.add_query(zone_query);
        // The update section shares the wire position of the authority
        // section.
        message.add_name_server(rr);
        message
    }

    fn resource_record(
        record: &Record,
        class: DNSClass,
        ttl: u32,
    ) -> Result<WireRecord, ServiceError> {
        let name = parse_name(record.name())?;
        let rdata = rdata_for(record.data())?;
        let mut rr = WireRecord::from_rdata(name, ttl, rdata);
        rr.set_dns_class(class);
        Ok(rr)
    }
}

fn rdata_for(data: &RecordData) -> Result<RData, ServiceError> {
    Ok(match data {
        RecordData::A(ip) => RData::A((*ip).into()),
        RecordData::AAAA(ip) => RData::AAAA((*ip).into()),
        RecordData::CNAME(alias) => RData::CNAME(CNAME(parse_name(alias)?)),
        RecordData::NS(name_server) => RData::NS(NS(parse_name(name_server)?)),
        RecordData::MX {
            priority,
            mail_server,
        } => RData::MX(MX::new(*priority, parse_name(mail_server)?)),
        RecordData::TXT(text) => RData::TXT(TXT::new(vec![text.clone()])),
        RecordData::SRV {
            priority,
            weight,
            port,
            target,
        } => RData::SRV(SRV::new(*priority, *weight, *port, parse_name(target)?)),
    })
}

fn parse_name(name: &str) -> Result<Name, ServiceError> {
    Name::from_str(name).map_err(|e| ServiceError::Encode(format!("invalid name {name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> Name {
        Name::from_str("example.com.").unwrap()
    }

    fn a_record() -> Record {
        Record::from_raw("A", "www", "192.0.2.1", "300", "example.com.").unwrap()
    }

    fn reparse(message: &Message) -> Message {
        let bytes = MessageBuilder::serialize(message).unwrap();
        assert!(bytes.len() >= 12, "DNS header is always 12 bytes");
        Message::from_vec(&bytes).unwrap()
    }

    #[test]
    fn soa_query_shape() {
        let message = reparse(&MessageBuilder::soa_query(&zone()));
        assert_eq!(message.op_code(), OpCode::Query);
        assert_eq!(message.queries().len(), 1);
        assert_eq!(message.queries()[0].query_type(), WireType::SOA);
        assert_eq!(message.queries()[0].name(), &zone());
        assert!(message.recursion_desired());
    }

    #[test]
    fn axfr_query_shape() {
        let message = reparse(&MessageBuilder::axfr_query(&zone()));
        assert_eq!(message.queries()[0].query_type(), WireType::AXFR);
        assert!(!message.recursion_desired());
    }

    #[test]
    fn insert_carries_the_record_in_the_update_section() {
        let message = MessageBuilder::update_insert(&zone(), &a_record()).unwrap();
        let message = reparse(&message);

        assert_eq!(message.op_code(), OpCode::Update);
        assert_eq!(message.queries()[0].query_type(), WireType::SOA);
        assert_eq!(message.queries()[0].name(), &zone());

        let updates = message.name_servers();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].dns_class(), DNSClass::IN);
        assert_eq!(updates[0].ttl(), 300);
        assert_eq!(updates[0].name().to_utf8(), "www.example.com.");
    }

    #[test]
    fn delete_uses_class_none_and_zero_ttl() {
        let message = MessageBuilder::update_delete(&zone(), &a_record()).unwrap();
        let message = reparse(&message);

        let updates = message.name_servers();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].dns_class(), DNSClass::NONE);
        assert_eq!(updates[0].ttl(), 0);
    }

    #[test]
    fn builds_rdata_for_every_variant() {
        let zone = "example.com.";
        let records = [
            Record::from_raw("A", "www", "192.0.2.1", "60", zone).unwrap(),
            Record::from_raw("AAAA", "www", "2001:db8::1", "60", zone).unwrap(),
            Record::from_raw("CNAME", "alias", "www.example.com.", "60", zone).unwrap(),
            Record::from_raw("MX", "@", "10:mail.example.com.", "60", zone).unwrap(),
            Record::from_raw("TXT", "@", "v=spf1 -all", "60", zone).unwrap(),
            Record::from_raw("NS", "@", "ns1.example.com.", "60", zone).unwrap(),
            Record::from_raw("SRV", "_sip._tcp", "10:20:5060:sip.example.com.", "60", zone)
                .unwrap(),
        ];
        for record in &records {
            let message = MessageBuilder::update_insert(&Name::from_str(zone).unwrap(), record);
            assert!(message.is_ok(), "failed to build update for {record}");
        }
    }
}
