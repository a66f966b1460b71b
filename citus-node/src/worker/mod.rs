//! Worker reconciliation
//!
//! Worker target model and the check-then-add reconciler.

pub mod reconciler;
pub mod target;

pub use reconciler::{reconcile_worker, Outcome, ReconcilePhase, Reconciliation, WorkerReconciler};
pub use target::WorkerTarget;
