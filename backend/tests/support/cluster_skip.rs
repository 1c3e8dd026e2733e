//! Skip policy for suites that depend on the embedded cluster.
//!
//! Machines without the PostgreSQL binaries (or without network access to
//! fetch them) can opt out with `SKIP_TEST_CLUSTER`; everywhere else a failed
//! bootstrap fails the test so CI breakage is not masked.

/// Whether `SKIP_TEST_CLUSTER` is set to "1", "true" or "yes"
/// (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Report a cluster bootstrap failure.
///
/// Prints a skip marker and returns `None` when skipping is enabled;
/// otherwise panics with the reason.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
