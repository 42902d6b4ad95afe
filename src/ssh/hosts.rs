// ABOUTME: Hostname candidate expansion for domain fallback.
// ABOUTME: Joins a base hostname with each domain suffix in order.

/// Expand `base` into one candidate hostname per domain suffix.
///
/// Suffixes are appended verbatim, so callers pass them with their leading
/// dot (`".corp.example.com"`). No deduplication or syntax checks are done.
pub fn generate_hostnames<S: AsRef<str>>(base: &str, domains: &[S]) -> Vec<String> {
    domains
        .iter()
        .map(|domain| format!("{}{}", base, domain.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_each_domain_in_order() {
        let hosts = generate_hostnames("web1", &[".a.com", ".b.com"]);
        assert_eq!(hosts, vec!["web1.a.com", "web1.b.com"]);
    }

    #[test]
    fn no_domains_yields_no_candidates() {
        let hosts = generate_hostnames::<&str>("web1", &[]);
        assert!(hosts.is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let hosts = generate_hostnames("db", &[".lan", ".lan"]);
        assert_eq!(hosts, vec!["db.lan", "db.lan"]);
    }
}
