//! Worker reconciler
//!
//! Checks whether the coordinator already lists a worker and registers it
//! when it does not. The check and the add run in that order on one session
//! with no lock held in between, so two concurrent runs for the same target
//! can both see it absent.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::target::WorkerTarget;
use crate::coordinator::{self, CoordinatorConnector, CoordinatorEndpoint, CoordinatorSession};
use crate::error::Result;

/// Result of one reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// A new membership record was created
    pub changed: bool,
    /// The worker is a member after this run
    pub success: bool,
}

/// Per-run reconciliation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    /// Nothing queried yet
    Start,
    /// Membership query answered
    Checked,
    /// Worker was already listed; nothing added
    AlreadyMember,
    /// Add call registered the worker
    Added,
    /// Add call reported zero rows
    AddFailed,
    /// Outcome handed back
    Done,
}

impl ReconcilePhase {
    /// Whether `self -> next` is a legal step
    pub fn can_transition_to(self, next: ReconcilePhase) -> bool {
        use ReconcilePhase::*;
        matches!(
            (self, next),
            (Start, Checked)
                | (Checked, AlreadyMember)
                | (Checked, Added)
                | (Checked, AddFailed)
                | (AlreadyMember, Done)
                | (Added, Done)
                | (AddFailed, Done)
        )
    }

    /// Outcome implied by a branch phase
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            ReconcilePhase::AlreadyMember => Some(Outcome {
                changed: false,
                success: true,
            }),
            ReconcilePhase::Added => Some(Outcome {
                changed: true,
                success: true,
            }),
            ReconcilePhase::AddFailed => Some(Outcome {
                changed: false,
                success: false,
            }),
            _ => None,
        }
    }
}

/// Outcome plus the branch that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub outcome: Outcome,
    /// One of `AlreadyMember`, `Added` or `AddFailed`
    pub branch: ReconcilePhase,
}

/// Reconciles one worker target against an open session
pub struct WorkerReconciler<'a, S: ?Sized> {
    session: &'a S,
    phase: ReconcilePhase,
}

impl<'a, S> WorkerReconciler<'a, S>
where
    S: CoordinatorSession + ?Sized,
{
    pub fn new(session: &'a S) -> Self {
        Self {
            session,
            phase: ReconcilePhase::Start,
        }
    }

    /// Current phase
    pub fn phase(&self) -> ReconcilePhase {
        self.phase
    }

    fn advance(&mut self, next: ReconcilePhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal reconcile transition {:?} -> {:?}",
            self.phase,
            next
        );
        debug!("Reconcile phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    /// Bring membership in line with `worker`.
    ///
    /// The add call is issued at most once and its row count decides both
    /// `changed` and `success`.
    pub async fn reconcile(mut self, worker: &WorkerTarget) -> Result<Reconciliation> {
        let count = self.session.active_worker_count(worker).await?;
        self.advance(ReconcilePhase::Checked);

        let branch = if count > 0 {
            info!("Worker {} already active on coordinator", worker);
            ReconcilePhase::AlreadyMember
        } else {
            debug!("Worker {} not listed, adding", worker);
            let affected = self.session.add_node(worker).await?;
            if affected > 0 {
                info!("Worker {} added to cluster", worker);
                ReconcilePhase::Added
            } else {
                warn!("Coordinator reported no rows when adding worker {}", worker);
                ReconcilePhase::AddFailed
            }
        };
        self.advance(branch);

        // branch phases always map to an outcome
        let outcome = branch.outcome().unwrap_or(Outcome {
            changed: false,
            success: false,
        });
        self.advance(ReconcilePhase::Done);

        Ok(Reconciliation { outcome, branch })
    }
}

/// Open a session, reconcile `worker`, then release the session.
///
/// Errors from either step are scrubbed of the endpoint's password.
pub async fn reconcile_worker<C>(
    connector: &C,
    endpoint: &CoordinatorEndpoint,
    worker: &WorkerTarget,
) -> Result<Reconciliation>
where
    C: CoordinatorConnector + ?Sized,
{
    let session = coordinator::open(connector, endpoint).await?;
    let result = WorkerReconciler::new(&session).reconcile(worker).await;
    drop(session);
    result.map_err(|e| e.scrubbed(endpoint.password()))
}
