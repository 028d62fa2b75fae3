//! MySQL-backed store. Records live in a versioned document table; the
//! conditional `UPDATE ... WHERE id = ? AND version = ?` is the
//! compare-and-swap, mirrored by `rows_affected() == 0` on the losing side.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::MySqlPool;
use uuid::Uuid;

use crate::model::leave_request::LeaveRequest;
use crate::store::{LeaveQuery, LeaveStore, StoreError, VersionedLeave};

pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn encode_doc(record: &LeaveRequest) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|e| StoreError::Backend(e.to_string()))
}

fn decode_doc(doc: Value) -> Result<LeaveRequest, StoreError> {
    serde_json::from_value(doc).map_err(|e| StoreError::Backend(e.to_string()))
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    async fn insert(&self, record: &LeaveRequest) -> Result<(), StoreError> {
        let doc = encode_doc(record)?;
        sqlx::query(
            r#"
            INSERT INTO leave_requests
                (id, employee_id, supervisor_id, status, version, doc)
            VALUES (?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.employee_id)
        .bind(&record.supervisor_id)
        .bind(record.status.to_string())
        .bind(doc)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id = %record.id, "Failed to insert leave request");
            StoreError::Backend(e.to_string())
        })?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<VersionedLeave, StoreError> {
        let row = sqlx::query_as::<_, (u64, Value)>(
            r#"SELECT version, doc FROM leave_requests WHERE id = ?"#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id = %id, "Failed to fetch leave request");
            StoreError::Backend(e.to_string())
        })?;

        let (version, doc) = row.ok_or(StoreError::NotFound)?;
        Ok(VersionedLeave {
            version,
            record: decode_doc(doc)?,
        })
    }

    async fn compare_and_set(
        &self,
        id: Uuid,
        expected_version: u64,
        record: &LeaveRequest,
    ) -> Result<u64, StoreError> {
        let doc = encode_doc(record)?;
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET doc = ?, status = ?, version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(doc)
        .bind(record.status.to_string())
        .bind(id.to_string())
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id = %id, "Leave request CAS failed");
            StoreError::Backend(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            // distinguish a lost race from a missing record
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM leave_requests WHERE id = ? LIMIT 1)",
            )
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
            return Err(if exists {
                StoreError::Conflict
            } else {
                StoreError::NotFound
            });
        }
        Ok(expected_version + 1)
    }

    async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, i64), StoreError> {
        let per_page = query.per_page.max(1).min(100);
        let page = query.page.max(1);
        let offset = (page - 1) * per_page;

        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<&str> = Vec::new();

        if let Some(employee_id) = query.employee_id.as_deref() {
            where_sql.push_str(" AND employee_id = ?");
            args.push(employee_id);
        }
        let status_str;
        if let Some(status) = query.status {
            status_str = status.to_string();
            where_sql.push_str(" AND status = ?");
            args.push(&status_str);
        }

        let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = count_q.bind(*arg);
        }
        let total = count_q.fetch_one(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to count leave requests");
            StoreError::Backend(e.to_string())
        })?;

        let data_sql = format!(
            r#"
            SELECT doc FROM leave_requests
            {}
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
            where_sql
        );
        let mut data_q = sqlx::query_scalar::<_, Value>(&data_sql);
        for arg in &args {
            data_q = data_q.bind(*arg);
        }
        let docs = data_q
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to list leave requests");
                StoreError::Backend(e.to_string())
            })?;

        let records = docs
            .into_iter()
            .map(decode_doc)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, total))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, leave_id = %id, "Failed to delete leave request");
                StoreError::Backend(e.to_string())
            })?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
