//! The approval state machine: pure decision logic with no I/O.
//!
//! Given a leave record, an acting identity and a requested action, it either
//! computes the next record state or reports exactly which rule was violated.
//! Legal transitions:
//!
//! ```text
//! pending --[supervisor approve]--> supervisor_approved --[admin approve]--> approved
//! pending --[supervisor reject]--> rejected
//! supervisor_approved --[admin reject]--> rejected
//! ```
//!
//! `approved` and `rejected` are terminal.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use strum::Display;
use utoipa::ToSchema;

use crate::model::leave_request::{ApprovalRecord, ApprovalStatus, LeaveRequest, LeaveStatus};
use crate::model::role::Actor;
use crate::workflow::error::WorkflowError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DecisionAction {
    Approve,
    Reject,
}

/// One approve/reject request as received from a caller.
#[derive(Debug, Clone)]
pub struct Decision {
    pub action: DecisionAction,
    pub signature: String,
    pub comments: Option<String>,
}

/// Workspace policy knobs the transition rules leave open.
#[derive(Debug, Copy, Clone)]
pub struct ApprovalPolicy {
    /// Whether `approve` must carry non-empty comments, like `reject` always
    /// does. The original system's dialogs disagreed on this, so it is
    /// configuration rather than a hard rule.
    pub approve_comments_required: bool,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            approve_comments_required: true,
        }
    }
}

/// Which approval stage the actor is acting in.
enum Stage {
    Supervisor,
    Admin,
}

/// Validate a decision against the record and compute the successor record.
///
/// Checks run in a fixed order: actor eligibility, then input shape, then
/// record state. An actor who is neither the designated supervisor nor an
/// admin never learns anything about the record state.
pub fn evaluate(
    record: &LeaveRequest,
    actor: &Actor,
    decision: &Decision,
    policy: &ApprovalPolicy,
    now: DateTime<Utc>,
) -> Result<LeaveRequest, WorkflowError> {
    // 1. Eligibility: designated supervisor or admin role, nothing else.
    let is_supervisor = actor.id == record.supervisor_id;
    let is_admin = actor.is_admin();
    if !is_supervisor && !is_admin {
        return Err(WorkflowError::NotAuthorized);
    }

    // 2. Input shape. Rejections always need a reason; approvals per policy.
    if decision.signature.trim().is_empty() {
        return Err(WorkflowError::MissingSignature);
    }
    let has_comments = decision
        .comments
        .as_deref()
        .is_some_and(|c| !c.trim().is_empty());
    let comments_required = match decision.action {
        DecisionAction::Reject => true,
        DecisionAction::Approve => policy.approve_comments_required,
    };
    if comments_required && !has_comments {
        return Err(WorkflowError::MissingComments);
    }

    // 3. Record state. Terminal records refuse everything; otherwise the
    //    actor must match the stage the record is currently waiting on.
    //    An actor wearing both hats acts as supervisor first, admin second.
    if record.status.is_terminal() {
        return Err(WorkflowError::AlreadyFinalized(record.status));
    }
    let stage = match record.status {
        LeaveStatus::Pending if is_supervisor => Stage::Supervisor,
        LeaveStatus::SupervisorApproved if is_admin => Stage::Admin,
        other => return Err(WorkflowError::InvalidStateTransition(other)),
    };

    // 4. Apply the transition and re-derive the overall status.
    let sub_status = match decision.action {
        DecisionAction::Approve => ApprovalStatus::Approved,
        DecisionAction::Reject => ApprovalStatus::Rejected,
    };
    let sub_record = ApprovalRecord::decided(
        sub_status,
        decision.signature.clone(),
        decision.comments.clone().filter(|c| !c.trim().is_empty()),
        now,
    );

    let mut next = record.clone();
    match stage {
        Stage::Supervisor => next.approval_flow.supervisor_approval = sub_record,
        Stage::Admin => next.approval_flow.admin_approval = sub_record,
    }
    next.recompute_status();
    next.updated_at = now;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::{AbsenceType, ApprovalFlow, inclusive_day_count};
    use crate::model::role::Role;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn fresh_record() -> LeaveRequest {
        let start = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let now = Utc::now();
        LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: "emp-1".into(),
            supervisor_id: "sup-1".into(),
            absence_type: AbsenceType::VacationPersonal,
            start_date: start,
            end_date: end,
            days_requested: inclusive_day_count(start, end),
            reason: "family trip".into(),
            employee_signature: "sig-employee".into(),
            employee_signature_date: now,
            approval_flow: ApprovalFlow::pending(),
            status: LeaveStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    fn supervisor() -> Actor {
        Actor::new("sup-1", vec![Role::Supervisor])
    }

    fn admin() -> Actor {
        Actor::new("adm-1", vec![Role::Administrator])
    }

    fn outsider() -> Actor {
        Actor::new("someone-else", vec![Role::User])
    }

    fn approve() -> Decision {
        Decision {
            action: DecisionAction::Approve,
            signature: "sig".into(),
            comments: Some("looks fine".into()),
        }
    }

    fn reject(comments: &str) -> Decision {
        Decision {
            action: DecisionAction::Reject,
            signature: "sig".into(),
            comments: if comments.is_empty() {
                None
            } else {
                Some(comments.into())
            },
        }
    }

    fn policy() -> ApprovalPolicy {
        ApprovalPolicy::default()
    }

    #[test]
    fn supervisor_approval_moves_pending_to_supervisor_approved() {
        let record = fresh_record();
        let next = evaluate(&record, &supervisor(), &approve(), &policy(), Utc::now()).unwrap();
        assert_eq!(next.status, LeaveStatus::SupervisorApproved);
        assert_eq!(
            next.approval_flow.supervisor_approval.status,
            ApprovalStatus::Approved
        );
        assert!(next.approval_flow.supervisor_approval.signature.is_some());
        assert!(
            next.approval_flow
                .supervisor_approval
                .signature_date
                .is_some()
        );
        // admin stage untouched
        assert_eq!(
            next.approval_flow.admin_approval.status,
            ApprovalStatus::Pending
        );
    }

    #[test]
    fn admin_approval_completes_the_flow() {
        let record = fresh_record();
        let after_supervisor =
            evaluate(&record, &supervisor(), &approve(), &policy(), Utc::now()).unwrap();
        let done = evaluate(
            &after_supervisor,
            &admin(),
            &approve(),
            &policy(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(done.status, LeaveStatus::Approved);
        assert_eq!(
            done.approval_flow.admin_approval.status,
            ApprovalStatus::Approved
        );
    }

    #[test]
    fn supervisor_rejection_is_terminal() {
        let record = fresh_record();
        let rejected = evaluate(
            &record,
            &supervisor(),
            &reject("insufficient notice"),
            &policy(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);

        // nobody may act on it afterwards, including an admin
        let err = evaluate(&rejected, &admin(), &approve(), &policy(), Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::AlreadyFinalized(LeaveStatus::Rejected)
        ));
    }

    #[test]
    fn admin_rejection_after_supervisor_approval_is_terminal() {
        let record = fresh_record();
        let mid = evaluate(&record, &supervisor(), &approve(), &policy(), Utc::now()).unwrap();
        let rejected = evaluate(&mid, &admin(), &reject("budget"), &policy(), Utc::now()).unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(
            rejected.approval_flow.admin_approval.status,
            ApprovalStatus::Rejected
        );

        let err =
            evaluate(&rejected, &supervisor(), &approve(), &policy(), Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyFinalized(_)));
    }

    #[test]
    fn outsider_is_rejected_regardless_of_record_state() {
        let record = fresh_record();
        let err = evaluate(&record, &outsider(), &approve(), &policy(), Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::NotAuthorized));

        // also on a finalized record: eligibility precedes the state check
        let rejected = evaluate(
            &record,
            &supervisor(),
            &reject("no"),
            &policy(),
            Utc::now(),
        )
        .unwrap();
        let err = evaluate(&rejected, &outsider(), &approve(), &policy(), Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::NotAuthorized));
    }

    #[test]
    fn admin_cannot_shortcut_a_pending_request() {
        let record = fresh_record();
        let err = evaluate(&record, &admin(), &approve(), &policy(), Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidStateTransition(LeaveStatus::Pending)
        ));
    }

    #[test]
    fn supervisor_cannot_act_after_their_own_approval() {
        let record = fresh_record();
        let mid = evaluate(&record, &supervisor(), &approve(), &policy(), Utc::now()).unwrap();
        let err = evaluate(&mid, &supervisor(), &approve(), &policy(), Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidStateTransition(LeaveStatus::SupervisorApproved)
        ));
    }

    #[test]
    fn replayed_decision_conflicts_instead_of_overwriting_the_audit_trail() {
        let record = fresh_record();
        let first = evaluate(&record, &supervisor(), &approve(), &policy(), Utc::now()).unwrap();
        // the same call again against the transitioned record must fail,
        // leaving the original signature and timestamp in place
        let err = evaluate(&first, &supervisor(), &approve(), &policy(), Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidStateTransition(_)));
    }

    #[test]
    fn reject_requires_non_empty_comments() {
        let record = fresh_record();
        let err = evaluate(
            &record,
            &supervisor(),
            &reject(""),
            &policy(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::MissingComments));

        // whitespace-only is still missing
        let err = evaluate(
            &record,
            &supervisor(),
            &reject("   "),
            &policy(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::MissingComments));
    }

    #[test]
    fn signature_is_always_required() {
        let record = fresh_record();
        let decision = Decision {
            action: DecisionAction::Approve,
            signature: "  ".into(),
            comments: Some("ok".into()),
        };
        let err = evaluate(&record, &supervisor(), &decision, &policy(), Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::MissingSignature));
    }

    #[test]
    fn approve_comments_follow_the_configured_policy() {
        let record = fresh_record();
        let decision = Decision {
            action: DecisionAction::Approve,
            signature: "sig".into(),
            comments: None,
        };

        let strict = ApprovalPolicy {
            approve_comments_required: true,
        };
        let err = evaluate(&record, &supervisor(), &decision, &strict, Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::MissingComments));

        let relaxed = ApprovalPolicy {
            approve_comments_required: false,
        };
        let next = evaluate(&record, &supervisor(), &decision, &relaxed, Utc::now()).unwrap();
        assert_eq!(next.status, LeaveStatus::SupervisorApproved);
    }

    #[test]
    fn supervisor_with_admin_role_acts_stage_by_stage() {
        // one actor wearing both hats still walks the two stages in order
        let actor = Actor::new("sup-1", vec![Role::Supervisor, Role::Administrator]);
        let record = fresh_record();
        let mid = evaluate(&record, &actor, &approve(), &policy(), Utc::now()).unwrap();
        assert_eq!(mid.status, LeaveStatus::SupervisorApproved);
        let done = evaluate(&mid, &actor, &approve(), &policy(), Utc::now()).unwrap();
        assert_eq!(done.status, LeaveStatus::Approved);
    }
}
