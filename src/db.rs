use sqlx::MySqlPool;

pub async fn init_db(database_url: &str) -> MySqlPool {
    MySqlPool::connect(database_url)
        .await
        .expect("Failed to connect to database")
}

/// Create the versioned document table the store writes through. The table
/// is the whole persistence schema: one row per leave request, with the
/// version column backing the compare-and-swap.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leave_requests (
            id            CHAR(36)        NOT NULL PRIMARY KEY,
            employee_id   VARCHAR(64)     NOT NULL,
            supervisor_id VARCHAR(64)     NOT NULL,
            status        VARCHAR(32)     NOT NULL,
            version       BIGINT UNSIGNED NOT NULL,
            doc           JSON            NOT NULL,
            created_at    TIMESTAMP       NOT NULL DEFAULT CURRENT_TIMESTAMP,
            INDEX idx_leave_employee (employee_id),
            INDEX idx_leave_status (status)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}
