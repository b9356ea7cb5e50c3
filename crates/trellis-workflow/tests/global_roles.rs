//! Full capability matrix conformance
//!
//! Every (role, kind, action) row runs against a fresh scope through the
//! action boundary; the observed outcome must match the declared
//! expectation, unimplemented annotations included.

use trellis_testkit::MatrixRunner;

#[test]
fn test_capability_matrix_conformance() {
    // RUST_LOG=trellis=debug surfaces per-row evaluator verdicts.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let failures = MatrixRunner::new().run_all().unwrap();
    assert!(
        failures.is_empty(),
        "{} matrix rows disagreed:\n{}",
        failures.len(),
        failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );
}
