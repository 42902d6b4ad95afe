// ABOUTME: Property tests for hostname candidate expansion.
// ABOUTME: Checks count, order, and exact concatenation for arbitrary inputs.

use proptest::prelude::*;
use sshexec::ssh::generate_hostnames;

proptest! {
    #[test]
    fn one_candidate_per_domain_in_order(
        base in "[a-z0-9-]{1,16}",
        domains in prop::collection::vec("\\.[a-z]{1,8}(\\.[a-z]{2,3})?", 0..8),
    ) {
        let hosts = generate_hostnames(&base, &domains);
        prop_assert_eq!(hosts.len(), domains.len());
        for (host, domain) in hosts.iter().zip(&domains) {
            prop_assert_eq!(host, &format!("{}{}", base, domain));
        }
    }
}
