//! Unit tests for worker reconciliation
//!
//! Runs the check-then-add pipeline against the in-memory coordinator.

use citus_node::coordinator::{open, CoordinatorEndpoint, MemoryCoordinator, ScriptedError};
use citus_node::worker::{reconcile_worker, Outcome, ReconcilePhase, WorkerReconciler, WorkerTarget};

fn endpoint() -> CoordinatorEndpoint {
    CoordinatorEndpoint::new("coord1", "citus").with_port(5432)
}

fn worker3() -> WorkerTarget {
    WorkerTarget::new("worker3", 5432).unwrap()
}

#[tokio::test]
async fn test_absent_worker_is_added() {
    let coordinator = MemoryCoordinator::new();

    let result = reconcile_worker(&coordinator, &endpoint(), &worker3())
        .await
        .unwrap();

    assert_eq!(
        result.outcome,
        Outcome {
            changed: true,
            success: true
        }
    );
    assert_eq!(result.branch, ReconcilePhase::Added);
    assert_eq!(coordinator.membership_check_count(), 1);
    assert_eq!(coordinator.add_node_count(), 1);
    assert_eq!(coordinator.members().await, vec![worker3()]);
}

#[tokio::test]
async fn test_present_worker_skips_add() {
    let coordinator = MemoryCoordinator::new().with_member(worker3()).await;

    let result = reconcile_worker(&coordinator, &endpoint(), &worker3())
        .await
        .unwrap();

    assert_eq!(
        result.outcome,
        Outcome {
            changed: false,
            success: true
        }
    );
    assert_eq!(result.branch, ReconcilePhase::AlreadyMember);
    assert_eq!(coordinator.add_node_count(), 0, "add must not run for a member");
}

#[tokio::test]
async fn test_second_run_is_noop() {
    let coordinator = MemoryCoordinator::new();

    let first = reconcile_worker(&coordinator, &endpoint(), &worker3())
        .await
        .unwrap();
    let members_after_first = coordinator.members().await;
    let second = reconcile_worker(&coordinator, &endpoint(), &worker3())
        .await
        .unwrap();

    assert!(first.outcome.changed);
    assert!(!second.outcome.changed);
    assert!(second.outcome.success);
    assert_eq!(coordinator.members().await, members_after_first);
    assert_eq!(coordinator.record_count(&worker3()).await, 1);
    assert_eq!(coordinator.add_node_count(), 1);
}

#[tokio::test]
async fn test_add_rejected_reports_failure() {
    let coordinator = MemoryCoordinator::new();
    coordinator.ignore_adds().await;

    let result = reconcile_worker(&coordinator, &endpoint(), &worker3())
        .await
        .unwrap();

    assert_eq!(
        result.outcome,
        Outcome {
            changed: false,
            success: false
        }
    );
    assert_eq!(result.branch, ReconcilePhase::AddFailed);
    // single add call, never repeated to compute `success`
    assert_eq!(coordinator.add_node_count(), 1);
    assert!(coordinator.members().await.is_empty());
}

#[tokio::test]
async fn test_other_port_is_not_a_member() {
    let coordinator = MemoryCoordinator::new()
        .with_member(WorkerTarget::new("worker3", 5433).unwrap())
        .await;

    let result = reconcile_worker(&coordinator, &endpoint(), &worker3())
        .await
        .unwrap();

    assert!(result.outcome.changed);
    assert_eq!(coordinator.members().await.len(), 2);
}

#[tokio::test]
async fn test_membership_check_error_stops_run() {
    let coordinator = MemoryCoordinator::new();
    coordinator
        .fail_membership_check(ScriptedError::new("42501", "permission denied for function"))
        .await;

    let err = reconcile_worker(&coordinator, &endpoint(), &worker3())
        .await
        .unwrap_err();

    assert!(!err.is_connection_error());
    assert_eq!(err.code(), Some("42501"));
    assert!(err.to_string().contains("permission denied for function"));
    assert_eq!(coordinator.add_node_count(), 0);
}

#[tokio::test]
async fn test_add_error_propagates() {
    let coordinator = MemoryCoordinator::new();
    coordinator
        .fail_add(ScriptedError::new("XX000", "connection to the remote node worker3:5432 failed"))
        .await;

    let err = reconcile_worker(&coordinator, &endpoint(), &worker3())
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some("XX000"));
    assert!(err.to_string().starts_with("Coordinator add node failed"));
    assert_eq!(coordinator.add_node_count(), 1);
}

#[tokio::test]
async fn test_reconciler_on_open_session() {
    let coordinator = MemoryCoordinator::new();
    let session = open(&coordinator, &endpoint()).await.unwrap();

    let reconciler = WorkerReconciler::new(&session);
    assert_eq!(reconciler.phase(), ReconcilePhase::Start);
    let result = reconciler.reconcile(&worker3()).await.unwrap();
    assert_eq!(result.branch, ReconcilePhase::Added);

    // same session, second target
    let other = WorkerTarget::new("worker4", 5432).unwrap();
    let result = WorkerReconciler::new(&session).reconcile(&other).await.unwrap();
    assert!(result.outcome.changed);
    assert_eq!(coordinator.connect_count(), 1);
}
