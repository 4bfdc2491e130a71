//! Guard policy engine: classifies (type, FQDN) pairs as immutable or
//! admin-only from raw `"TYPE/subdomain"` configuration strings.

use crate::config::GuardLists;
use crate::fqdn;
use std::collections::HashSet;
use tracing::warn;

/// Record types that may appear on the left-hand side of a guard rule,
/// besides the `*` wildcard. Deliberately wider than the set of managed
/// record types: infrastructure records (SOA, DNAME, CAA) can be guarded
/// even though the client never creates them.
const GUARDABLE_TYPES: [&str; 8] = ["SOA", "NS", "MX", "CNAME", "DNAME", "CAA", "A", "AAAA"];

/// A single guard rule key. `rtype` is either a record type or `"*"`;
/// `fqdn` is always fully expanded onto the zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordGuard {
    pub rtype: String,
    pub fqdn: String,
}

impl RecordGuard {
    pub fn new(rtype: impl Into<String>, fqdn: impl Into<String>) -> Self {
        Self {
            rtype: rtype.into(),
            fqdn: fqdn.into(),
        }
    }
}

/// Immutable and admin-only rule sets, built once at client construction.
#[derive(Debug, Clone, Default)]
pub struct GuardMap {
    pub immutable: HashSet<RecordGuard>,
    pub admin_only: HashSet<RecordGuard>,
}

impl GuardMap {
    /// Parses both guard lists against the zone. Invalid entries are skipped
    /// with a warning rather than failing construction.
    pub fn parse(lists: &GuardLists, zone: &str) -> Self {
        Self {
            immutable: parse_list(&lists.immutable, zone),
            admin_only: parse_list(&lists.admin_only, zone),
        }
    }

    /// True when the exact (type, fqdn) pair or the (`*`, fqdn) wildcard is
    /// listed as immutable. Both branches are probed; they are OR'd, not
    /// ordered.
    pub fn is_immutable(&self, rtype: &str, fqdn: &str) -> bool {
        self.immutable.contains(&RecordGuard::new(rtype, fqdn))
            || self.immutable.contains(&RecordGuard::new("*", fqdn))
    }

    pub fn is_admin_only(&self, rtype: &str, fqdn: &str) -> bool {
        self.admin_only.contains(&RecordGuard::new(rtype, fqdn))
            || self.admin_only.contains(&RecordGuard::new("*", fqdn))
    }

    pub fn is_guarded(&self, rtype: &str, fqdn: &str) -> bool {
        self.is_immutable(rtype, fqdn) || self.is_admin_only(rtype, fqdn)
    }
}

fn parse_list(raw: &[String], zone: &str) -> HashSet<RecordGuard> {
    let mut set = HashSet::new();
    for entry in raw {
        match parse_guard_string(entry, zone) {
            Some(guard) => {
                set.insert(guard);
            }
            None => warn!(guard = %entry, "skipping invalid guard entry"),
        }
    }
    set
}

fn parse_guard_string(raw: &str, zone: &str) -> Option<RecordGuard> {
    if !is_valid_guard(raw) {
        return None;
    }
    let (rtype, subdomain) = raw.split_once('/')?;
    Some(RecordGuard::new(
        rtype.to_uppercase(),
        fqdn::to_fqdn(subdomain, zone),
    ))
}

/// Grammar: `TYPE/subdomain` where TYPE is `*` or a guardable record type
/// (case-insensitive) and subdomain is dot-separated alphanumeric/hyphen
/// labels or `@` for the apex.
fn is_valid_guard(raw: &str) -> bool {
    let Some((rtype, subdomain)) = raw.split_once('/') else {
        return false;
    };
    let type_ok = rtype == "*"
        || GUARDABLE_TYPES
            .iter()
            .any(|t| t.eq_ignore_ascii_case(rtype));
    let subdomain_ok = subdomain == "@"
        || (!subdomain.is_empty()
            && subdomain.split('.').all(|label| {
                !label.is_empty()
                    && label
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-')
            }));
    type_ok && subdomain_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_grammar() {
        let cases: &[(&str, bool)] = &[
            ("A/ns1", true),
            ("NS/@", true),
            ("*/ns1", true),
            ("soa/@", true),
            ("InvalidType/ns1", false),
            ("TXT/ns1", false),
            ("A/*", false),
            ("A/..", false),
            ("A/ns1.", false),
            ("A", false),
            ("", false),
        ];
        for (input, expect) in cases {
            assert_eq!(is_valid_guard(input), *expect, "is_valid_guard({input:?})");
        }
    }

    #[test]
    fn expands_guard_strings_onto_the_zone() {
        let zone = "example.com.";
        assert_eq!(
            parse_guard_string("A/ns1", zone),
            Some(RecordGuard::new("A", "ns1.example.com."))
        );
        assert_eq!(
            parse_guard_string("NS/@", zone),
            Some(RecordGuard::new("NS", "example.com."))
        );
        assert_eq!(
            parse_guard_string("*/ns1", zone),
            Some(RecordGuard::new("*", "ns1.example.com."))
        );
        assert_eq!(
            parse_guard_string("a/ns1", zone),
            Some(RecordGuard::new("A", "ns1.example.com."))
        );
        assert_eq!(parse_guard_string("InvalidType/ns1", zone), None);
        assert_eq!(parse_guard_string("A/*", zone), None);
    }

    #[test]
    fn builds_both_sets_and_skips_invalid_entries() {
        let lists = GuardLists {
            immutable: vec!["A/ns1".into(), "NS/@".into(), "bogus".into()],
            admin_only: vec!["*/ns1".into()],
        };
        let map = GuardMap::parse(&lists, "example.com.");

        let expected_immutable: HashSet<_> = [
            RecordGuard::new("A", "ns1.example.com."),
            RecordGuard::new("NS", "example.com."),
        ]
        .into();
        let expected_admin: HashSet<_> = [RecordGuard::new("*", "ns1.example.com.")].into();

        assert_eq!(map.immutable, expected_immutable);
        assert_eq!(map.admin_only, expected_admin);
    }

    #[test]
    fn exact_and_wildcard_matches_are_independent() {
        let lists = GuardLists {
            immutable: vec!["A/exact".into(), "*/wild".into()],
            admin_only: vec!["MX/mail".into()],
        };
        let map = GuardMap::parse(&lists, "example.com.");

        assert!(map.is_immutable("A", "exact.example.com."));
        assert!(!map.is_immutable("AAAA", "exact.example.com."));
        assert!(map.is_immutable("A", "wild.example.com."));
        assert!(map.is_immutable("TXT", "wild.example.com."));
        assert!(!map.is_immutable("A", "other.example.com."));

        assert!(map.is_admin_only("MX", "mail.example.com."));
        assert!(!map.is_immutable("MX", "mail.example.com."));
        assert!(map.is_guarded("MX", "mail.example.com."));
    }
}
