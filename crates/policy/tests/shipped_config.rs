//! Properties the shipped policy tables must hold.

use policy::lint::{self, Finding};
use policy::{FailureCategory, GateRequest, Mode, Policy};
use std::path::PathBuf;

fn shipped() -> Policy {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config");
    Policy::load_dir(dir).expect("shipped config loads")
}

#[test]
fn shipped_config_is_lint_clean() {
    let findings = lint::lint(&shipped());
    assert!(findings.is_empty(), "findings: {findings:?}");
}

#[test]
fn every_required_capability_is_declared() {
    let policy = shipped();
    for op in policy.operations.iter() {
        for flag in &op.required_capabilities {
            assert!(
                policy.capabilities.declares(flag),
                "{} references undeclared flag {flag}",
                op.operation
            );
        }
    }
}

#[test]
fn allowed_at_a_mode_implies_allowed_at_every_higher_allowed_mode() {
    let policy = shipped();
    for op in policy.operations.iter() {
        for runtime in policy.runtimes.iter() {
            for low in &runtime.allowed_modes {
                let at = |mode: Mode| {
                    policy.check(
                        &GateRequest::new(&op.operation, &runtime.id).with_mode(mode.as_str()),
                    )
                };
                if !at(*low).is_allowed() {
                    continue;
                }
                for high in runtime.allowed_modes.iter().filter(|m| m.rank() > low.rank()) {
                    assert!(
                        at(*high).is_allowed(),
                        "{} allowed for {} at {low} but not at {high}",
                        op.operation,
                        runtime.id
                    );
                }
            }
        }
    }
}

#[test]
fn capability_matrix_is_monotonic() {
    let findings = lint::lint(&shipped());
    assert!(
        !findings
            .iter()
            .any(|f| matches!(f, Finding::NonMonotonicCapability { .. }))
    );
}

#[test]
fn example_scenarios_hold() {
    let policy = shipped();

    let sync = policy.check(&GateRequest::new("square_cache_sync", "local_cli"));
    assert!(sync.is_allowed(), "{sync}");

    let photos = policy.check(&GateRequest::new("browse_photos", "local_cli"));
    assert_eq!(photos.category(), Some(FailureCategory::InsufficientMode));
    assert_eq!(photos.exit_status().code(), 22);

    let escalated = policy.check(
        &GateRequest::new("square_cache_sync", "local_cli").with_mode("LOCAL_PRIVILEGED"),
    );
    assert_eq!(
        escalated.category(),
        Some(FailureCategory::ModeNotAllowedForRuntime)
    );

    let unknown_op =
        policy.check(&GateRequest::new("unknown_op", "local_cli").with_mode("WEB_SAFE"));
    assert_eq!(unknown_op.category(), Some(FailureCategory::UnknownOperation));

    let ghost = policy.check(
        &GateRequest::new("square_cache_sync", "ghost_runtime").with_mode("LOCAL_STANDARD"),
    );
    assert_eq!(ghost.category(), Some(FailureCategory::UnknownRuntime));
    assert_eq!(ghost.exit_status().code(), 20);
}
