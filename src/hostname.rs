//! Hostname normalization and account matching.
//!
//! Saved hostnames rarely match the page hostname exactly: the vault may
//! hold `login.example.com` while the user sits on `app.example.com`.
//! Both normalize to `example.com` by stripping one generic leading
//! label.

/// Generic leading labels stripped during normalization. Matched
/// case-sensitively against lowercase hostnames.
const COMMON_PREFIXES: &[&str] = &[
    "account",
    "accounts",
    "app",
    "auth",
    "dashboard",
    "id",
    "login",
    "secure",
    "signin",
    "sso",
    "www",
];

/// Strip a single generic leading label from `hostname`, if present.
///
/// Exactly one label is stripped per call, and only when it is the
/// leftmost label. `login.app.example.com` therefore normalizes to
/// `app.example.com`; a second call strips the next label.
pub fn strip_common_prefixes(hostname: &str) -> &str {
    if let Some((label, rest)) = hostname.split_once('.') {
        if !rest.is_empty() && COMMON_PREFIXES.contains(&label) {
            return rest;
        }
    }

    hostname
}

/// Whether `candidate` and `hostname` refer to the same site after
/// normalization.
pub fn hostnames_match(candidate: &str, hostname: &str) -> bool {
    strip_common_prefixes(candidate) == strip_common_prefixes(hostname)
}

/// Filter `items` down to those whose hostname matches `hostname` after
/// normalization. The returned order is the input order (stable; no
/// further ranking heuristic).
pub fn filter_matching<'a, T>(
    items: &'a [T],
    hostname: &str,
    item_hostname: impl Fn(&T) -> &str,
) -> Vec<&'a T> {
    let search = strip_common_prefixes(hostname);
    items
        .iter()
        .filter(|item| strip_common_prefixes(item_hostname(item)) == search)
        .collect()
}
