//! FQDN grammar helpers shared by record validation and guard expansion.

pub const MAX_NAME_LEN: usize = 255;
const MAX_LABEL_LEN: usize = 63;

/// Checks the strict FQDN grammar used for record values: dot-terminated,
/// labels of ASCII alphanumerics and hyphens, and a purely alphabetic TLD of
/// at least two characters.
pub fn is_valid_fqdn(name: &str) -> bool {
    if name.len() > MAX_NAME_LEN || !name.ends_with('.') {
        return false;
    }
    let name = &name[..name.len() - 1];
    if name.is_empty() {
        return false;
    }
    let mut tld = "";
    for label in name.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return false;
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return false;
        }
        tld = label;
    }
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Looser check used for configured server hosts: a dotted sequence of
/// alphanumeric/hyphen labels, with or without a trailing dot.
pub fn is_valid_domain(host: &str) -> bool {
    let host = host.strip_suffix('.').unwrap_or(host);
    if host.is_empty() || host.len() > MAX_NAME_LEN {
        return false;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Expands a subdomain onto the zone; `@` means the zone apex.
pub fn to_fqdn(subdomain: &str, zone: &str) -> String {
    if subdomain == "@" {
        zone.to_string()
    } else {
        format!("{subdomain}.{zone}")
    }
}
