//! Mapping between the curated domain record types and `hickory-proto`
//! wire types.

use hickory_proto::rr::RecordType as WireType;
use zonesync_domain::RecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    pub fn to_wire(rtype: RecordType) -> WireType {
        match rtype {
            RecordType::A => WireType::A,
            RecordType::AAAA => WireType::AAAA,
            RecordType::CNAME => WireType::CNAME,
            RecordType::MX => WireType::MX,
            RecordType::TXT => WireType::TXT,
            RecordType::NS => WireType::NS,
            RecordType::SRV => WireType::SRV,
        }
    }

    /// `None` for wire types outside the managed set (SOA, DNSSEC, ...).
    pub fn from_wire(rtype: WireType) -> Option<RecordType> {
        match rtype {
            WireType::A => Some(RecordType::A),
            WireType::AAAA => Some(RecordType::AAAA),
            WireType::CNAME => Some(RecordType::CNAME),
            WireType::MX => Some(RecordType::MX),
            WireType::TXT => Some(RecordType::TXT),
            WireType::NS => Some(RecordType::NS),
            WireType::SRV => Some(RecordType::SRV),
            _ => None,
        }
    }
}
