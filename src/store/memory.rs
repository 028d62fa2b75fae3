//! In-memory versioned store, used by the test suite and by DB-less runs.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::leave_request::LeaveRequest;
use crate::store::{LeaveQuery, LeaveStore, StoreError, VersionedLeave};

#[derive(Default)]
pub struct MemoryLeaveStore {
    // id -> (version, record); the map lock is the CAS boundary
    records: RwLock<HashMap<Uuid, (u64, LeaveRequest)>>,
}

impl MemoryLeaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaveStore for MemoryLeaveStore {
    async fn insert(&self, record: &LeaveRequest) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if records.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        records.insert(record.id, (1, record.clone()));
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<VersionedLeave, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        records
            .get(&id)
            .map(|(version, record)| VersionedLeave {
                version: *version,
                record: record.clone(),
            })
            .ok_or(StoreError::NotFound)
    }

    async fn compare_and_set(
        &self,
        id: Uuid,
        expected_version: u64,
        record: &LeaveRequest,
    ) -> Result<u64, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let entry = records.get_mut(&id).ok_or(StoreError::NotFound)?;
        if entry.0 != expected_version {
            return Err(StoreError::Conflict);
        }
        entry.0 += 1;
        entry.1 = record.clone();
        Ok(entry.0)
    }

    async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, i64), StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut matched: Vec<LeaveRequest> = records
            .values()
            .map(|(_, record)| record)
            .filter(|record| {
                query
                    .employee_id
                    .as_deref()
                    .map_or(true, |id| record.employee_id == id)
            })
            .filter(|record| query.status.map_or(true, |status| record.status == status))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as i64;
        let per_page = query.per_page.max(1) as usize;
        let offset = (query.page.max(1) as usize - 1) * per_page;
        let page = matched.into_iter().skip(offset).take(per_page).collect();
        Ok((page, total))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        records.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::{
        AbsenceType, ApprovalFlow, LeaveStatus, inclusive_day_count,
    };
    use chrono::{NaiveDate, Utc};

    fn record(employee_id: &str) -> LeaveRequest {
        let start = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let now = Utc::now();
        LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            supervisor_id: "sup-1".into(),
            absence_type: AbsenceType::Sick,
            start_date: start,
            end_date: end,
            days_requested: inclusive_day_count(start, end),
            reason: "flu".into(),
            employee_signature: "sig".into(),
            employee_signature_date: now,
            approval_flow: ApprovalFlow::pending(),
            status: LeaveStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_web::test]
    async fn stale_version_loses_the_cas() {
        let store = MemoryLeaveStore::new();
        let rec = record("emp-1");
        store.insert(&rec).await.unwrap();

        let read = store.get(rec.id).await.unwrap();
        assert_eq!(read.version, 1);

        let new_version = store.compare_and_set(rec.id, 1, &rec).await.unwrap();
        assert_eq!(new_version, 2);

        // replaying with the stale version must conflict
        let err = store.compare_and_set(rec.id, 1, &rec).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[actix_web::test]
    async fn list_filters_by_employee_and_paginates() {
        let store = MemoryLeaveStore::new();
        for _ in 0..3 {
            store.insert(&record("emp-1")).await.unwrap();
        }
        store.insert(&record("emp-2")).await.unwrap();

        let (page, total) = store
            .list(&LeaveQuery {
                employee_id: Some("emp-1".into()),
                status: None,
                page: 1,
                per_page: 2,
            })
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        assert!(page.iter().all(|r| r.employee_id == "emp-1"));
    }

    #[actix_web::test]
    async fn delete_of_missing_record_reports_not_found() {
        let store = MemoryLeaveStore::new();
        let err = store.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
