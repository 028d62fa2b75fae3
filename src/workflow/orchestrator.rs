//! The workflow orchestrator: loads a record, runs the state machine,
//! persists the outcome through a compare-and-swap, and triggers side
//! effects. Every external call is bounded by a timeout so no operation
//! hangs; a timeout surfaces as a retryable `Unavailable` error.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use actix_web::rt;
use chrono::{NaiveDate, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::model::leave_request::{
    AbsenceType, ApprovalFlow, LeaveRequest, LeaveStatus, inclusive_day_count,
};
use crate::model::role::{Actor, Role};
use crate::notify::Notifier;
use crate::store::{LeaveQuery, LeaveStore, StoreError, VersionedLeave};
use crate::workflow::error::WorkflowError;
use crate::workflow::machine::{self, ApprovalPolicy, Decision};

/// Everything a submission needs, as validated input.
#[derive(Debug, Clone)]
pub struct NewLeave {
    pub supervisor_id: String,
    pub absence_type: AbsenceType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub signature: String,
}

pub struct LeaveService {
    store: Arc<dyn LeaveStore>,
    notifier: Arc<dyn Notifier>,
    policy: ApprovalPolicy,
    op_timeout: Duration,
}

impl LeaveService {
    pub fn new(
        store: Arc<dyn LeaveStore>,
        notifier: Arc<dyn Notifier>,
        policy: ApprovalPolicy,
        op_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            policy,
            op_timeout,
        }
    }

    /// Run one store call under the operation timeout.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, WorkflowError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match rt::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(WorkflowError::from),
            Err(_) => Err(WorkflowError::Unavailable(
                "store operation timed out".into(),
            )),
        }
    }

    /// Create a new leave request for `actor` and kick off the supervisor
    /// notification. The record starts with both approval stages pending.
    #[instrument(name = "leave_submit", skip_all, fields(employee_id = %actor.id))]
    pub async fn submit(
        &self,
        actor: &Actor,
        input: NewLeave,
    ) -> Result<LeaveRequest, WorkflowError> {
        // 1. Shape validation, before any store traffic.
        if input.supervisor_id.trim().is_empty() {
            return Err(WorkflowError::Validation("supervisor is required".into()));
        }
        if input.supervisor_id == actor.id {
            return Err(WorkflowError::Validation(
                "supervisor must be a different person than the employee".into(),
            ));
        }
        if input.start_date > input.end_date {
            return Err(WorkflowError::Validation(
                "start_date cannot be after end_date".into(),
            ));
        }
        if input.reason.trim().is_empty() {
            return Err(WorkflowError::Validation("reason is required".into()));
        }
        if input.signature.trim().is_empty() {
            return Err(WorkflowError::MissingSignature);
        }

        // 2. Build the record; status always derives from the flow.
        let now = Utc::now();
        let mut record = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: actor.id.clone(),
            supervisor_id: input.supervisor_id,
            absence_type: input.absence_type,
            start_date: input.start_date,
            end_date: input.end_date,
            days_requested: inclusive_day_count(input.start_date, input.end_date),
            reason: input.reason,
            employee_signature: input.signature,
            employee_signature_date: now,
            approval_flow: ApprovalFlow::pending(),
            status: LeaveStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        record.recompute_status();

        // 3. Persist, then notify. The notification runs detached so its
        //    outcome cannot affect the already-persisted record.
        self.bounded(self.store.insert(&record)).await?;
        info!(leave_id = %record.id, days = record.days_requested, "Leave request submitted");
        self.spawn_notification(&record);
        Ok(record)
    }

    /// Apply one approve/reject decision. Read-evaluate-CAS: if the CAS
    /// loses a race, re-read once and re-evaluate so the loser gets the
    /// accurate state error rather than silently overwriting the winner.
    #[instrument(name = "leave_decide", skip_all, fields(leave_id = %leave_id, actor_id = %actor.id, action = %decision.action))]
    pub async fn decide(
        &self,
        leave_id: Uuid,
        actor: &Actor,
        decision: Decision,
    ) -> Result<LeaveRequest, WorkflowError> {
        let VersionedLeave { version, record } = self.bounded(self.store.get(leave_id)).await?;
        let updated = machine::evaluate(&record, actor, &decision, &self.policy, Utc::now())?;

        match self
            .bounded(self.store.compare_and_set(leave_id, version, &updated))
            .await
        {
            Ok(_) => {
                info!(status = %updated.status, "Leave request transitioned");
                Ok(updated)
            }
            Err(WorkflowError::Conflict) => {
                let VersionedLeave { version, record } =
                    self.bounded(self.store.get(leave_id)).await?;
                // usually fails here with AlreadyFinalized / InvalidStateTransition
                let updated =
                    machine::evaluate(&record, actor, &decision, &self.policy, Utc::now())?;
                self.bounded(self.store.compare_and_set(leave_id, version, &updated))
                    .await?;
                info!(status = %updated.status, "Leave request transitioned after retry");
                Ok(updated)
            }
            Err(other) => Err(other),
        }
    }

    /// Fetch one record, visible to its owner, its designated supervisor,
    /// and anyone with a supervisor or admin role.
    pub async fn get(&self, leave_id: Uuid, actor: &Actor) -> Result<LeaveRequest, WorkflowError> {
        let VersionedLeave { record, .. } = self.bounded(self.store.get(leave_id)).await?;
        if !can_view(actor, &record) {
            return Err(WorkflowError::NotAuthorized);
        }
        Ok(record)
    }

    /// Filtered listing. Actors without a supervisor or admin role only ever
    /// see their own requests, whatever filter they asked for.
    pub async fn list(
        &self,
        actor: &Actor,
        mut query: LeaveQuery,
    ) -> Result<(Vec<LeaveRequest>, i64), WorkflowError> {
        if !actor.is_admin() && !actor.has_role(Role::Supervisor) {
            query.employee_id = Some(actor.id.clone());
        }
        self.bounded(self.store.list(&query)).await
    }

    /// Privileged deletion: admins any time, the owning employee only while
    /// the request is still fully pending.
    #[instrument(name = "leave_delete", skip_all, fields(leave_id = %leave_id, actor_id = %actor.id))]
    pub async fn delete(&self, leave_id: Uuid, actor: &Actor) -> Result<(), WorkflowError> {
        let VersionedLeave { record, .. } = self.bounded(self.store.get(leave_id)).await?;
        if !actor.is_admin() {
            if record.employee_id != actor.id {
                return Err(WorkflowError::NotAuthorized);
            }
            if record.status != LeaveStatus::Pending {
                return Err(WorkflowError::InvalidStateTransition(record.status));
            }
        }
        self.bounded(self.store.delete(leave_id)).await?;
        info!("Leave request deleted");
        Ok(())
    }

    /// Re-trigger the supervisor notification for an existing request.
    /// Best-effort by contract: always succeeds once authorization passes.
    pub async fn notify_supervisor(
        &self,
        leave_id: Uuid,
        actor: &Actor,
    ) -> Result<(), WorkflowError> {
        let VersionedLeave { record, .. } = self.bounded(self.store.get(leave_id)).await?;
        if !actor.is_admin() && record.employee_id != actor.id {
            return Err(WorkflowError::NotAuthorized);
        }
        self.spawn_notification(&record);
        Ok(())
    }

    fn spawn_notification(&self, record: &LeaveRequest) {
        let notifier = Arc::clone(&self.notifier);
        let supervisor_id = record.supervisor_id.clone();
        let leave_id = record.id;
        let op_timeout = self.op_timeout;
        rt::spawn(async move {
            let outcome =
                rt::time::timeout(op_timeout, notifier.notify(&supervisor_id, leave_id)).await;
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(leave_id = %leave_id, error = %e, "Supervisor notification failed")
                }
                Err(_) => {
                    warn!(leave_id = %leave_id, "Supervisor notification timed out")
                }
            }
        });
    }
}

fn can_view(actor: &Actor, record: &LeaveRequest) -> bool {
    actor.id == record.employee_id
        || actor.id == record.supervisor_id
        || actor.is_admin()
        || actor.has_role(Role::Supervisor)
}
