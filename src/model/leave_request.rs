use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;
use uuid::Uuid;

/// Absence categories, serialized with the wire strings the rest of the ERP
/// uses ("Vacation/Personal" etc.).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, ToSchema)]
pub enum AbsenceType {
    Sick,
    #[serde(rename = "Vacation/Personal")]
    #[strum(serialize = "Vacation/Personal")]
    VacationPersonal,
    Study,
    #[serde(rename = "Maternity/Paternity")]
    #[strum(serialize = "Maternity/Paternity")]
    MaternityPaternity,
    Compassionate,
    Special,
}

/// Per-stage decision state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Overall workflow state. Always derived from the two approval sub-records,
/// never accepted from a caller.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    SupervisorApproved,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Terminal states admit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, LeaveStatus::Approved | LeaveStatus::Rejected)
    }
}

/// One of the two `{status, signature, signatureDate, comments}` structures
/// tracking the supervisor or admin decision.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApprovalRecord {
    pub status: ApprovalStatus,
    #[schema(value_type = Option<String>, example = "data:image/png;base64,...")]
    pub signature: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub signature_date: Option<DateTime<Utc>>,
    pub comments: Option<String>,
}

impl ApprovalRecord {
    pub fn pending() -> Self {
        Self {
            status: ApprovalStatus::Pending,
            signature: None,
            signature_date: None,
            comments: None,
        }
    }

    pub fn decided(
        status: ApprovalStatus,
        signature: String,
        comments: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            status,
            signature: Some(signature),
            signature_date: Some(at),
            comments,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApprovalFlow {
    pub supervisor_approval: ApprovalRecord,
    pub admin_approval: ApprovalRecord,
}

impl ApprovalFlow {
    pub fn pending() -> Self {
        Self {
            supervisor_approval: ApprovalRecord::pending(),
            admin_approval: ApprovalRecord::pending(),
        }
    }

    /// The transition table collapsed into a pure function: the overall status
    /// of a leave request is fully determined by the two sub-records.
    pub fn derived_status(&self) -> LeaveStatus {
        use ApprovalStatus::*;
        match (self.supervisor_approval.status, self.admin_approval.status) {
            (Rejected, _) | (_, Rejected) => LeaveStatus::Rejected,
            (Approved, Approved) => LeaveStatus::Approved,
            (Approved, Pending) => LeaveStatus::SupervisorApproved,
            (Pending, _) => LeaveStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "7d4e63a8-4f0b-4aab-9b1e-2c9f0a6c1c11",
    "employee_id": "emp-1001",
    "supervisor_id": "emp-2001",
    "absence_type": "Vacation/Personal",
    "start_date": "2024-06-10",
    "end_date": "2024-06-12",
    "days_requested": 3,
    "reason": "Family trip",
    "status": "pending"
}))]
pub struct LeaveRequest {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,
    pub employee_id: String,
    pub supervisor_id: String,
    pub absence_type: AbsenceType,
    #[schema(value_type = String, format = "date", example = "2024-06-10")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date", example = "2024-06-12")]
    pub end_date: NaiveDate,
    pub days_requested: u32,
    pub reason: String,
    #[schema(example = "data:image/png;base64,...")]
    pub employee_signature: String,
    #[schema(value_type = String, format = "date-time")]
    pub employee_signature_date: DateTime<Utc>,
    pub approval_flow: ApprovalFlow,
    pub status: LeaveStatus,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Re-derive `status` from the approval flow. Must be called after any
    /// mutation of a sub-record.
    pub fn recompute_status(&mut self) {
        self.status = self.approval_flow.derived_status();
    }

    pub fn is_finalized(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Inclusive calendar-day count; both end dates count.
/// Callers must have validated `start <= end` first.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> u32 {
    ((end - start).num_days() + 1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_count_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        assert_eq!(inclusive_day_count(start, end), 3);
        assert_eq!(inclusive_day_count(start, start), 1);
    }

    #[test]
    fn status_is_a_pure_function_of_the_sub_records() {
        use ApprovalStatus::*;
        let mut flow = ApprovalFlow::pending();
        assert_eq!(flow.derived_status(), LeaveStatus::Pending);

        flow.supervisor_approval.status = Approved;
        assert_eq!(flow.derived_status(), LeaveStatus::SupervisorApproved);

        flow.admin_approval.status = Approved;
        assert_eq!(flow.derived_status(), LeaveStatus::Approved);

        flow.admin_approval.status = Rejected;
        assert_eq!(flow.derived_status(), LeaveStatus::Rejected);

        let mut flow = ApprovalFlow::pending();
        flow.supervisor_approval.status = Rejected;
        assert_eq!(flow.derived_status(), LeaveStatus::Rejected);
    }

    #[test]
    fn statuses_serialize_with_snake_case_wire_strings() {
        assert_eq!(
            serde_json::to_value(LeaveStatus::SupervisorApproved).unwrap(),
            serde_json::json!("supervisor_approved")
        );
        assert_eq!(
            serde_json::to_value(AbsenceType::VacationPersonal).unwrap(),
            serde_json::json!("Vacation/Personal")
        );
    }
}
