//! TSIG (RFC 8945) signing for dynamic updates and zone transfers.

use crate::errors::ServiceError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use hickory_proto::dnssec::rdata::tsig::TsigAlgorithm;
use hickory_proto::dnssec::tsig::TSigner;
use hickory_proto::op::Message;
use hickory_proto::rr::Name;
use std::str::FromStr;

/// Allowed clock skew window, matching the server-side convention.
pub const TSIG_FUDGE_SECS: u16 = 300;

/// Builds an HMAC-SHA256 signer from the configured key name and
/// base64-encoded secret.
pub fn create_signer(key_name: &str, secret_b64: &str) -> Result<TSigner, ServiceError> {
    let key = BASE64
        .decode(secret_b64)
        .map_err(|e| ServiceError::Tsig(format!("failed to decode TSIG secret: {e}")))?;
    let name = Name::from_str(key_name)
        .map_err(|e| ServiceError::Tsig(format!("invalid TSIG key name {key_name}: {e}")))?;
    TSigner::new(key, TsigAlgorithm::HmacSha256, name, TSIG_FUDGE_SECS)
        .map_err(|e| ServiceError::Tsig(e.to_string()))
}

/// Appends the TSIG record for `message`, signed at the current Unix time.
pub fn sign(message: &mut Message, signer: &TSigner) -> Result<(), ServiceError> {
    let now = Utc::now().timestamp() as u32;
    message
        .finalize(signer, now)
        .map(|_| ())
        .map_err(|e| ServiceError::Tsig(e.to_string()))
}
