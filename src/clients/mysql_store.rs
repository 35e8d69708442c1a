use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::model::leave_request::LeaveRequest;
use crate::saga::store::{LeaveQuery, LeaveUpdate, RecordStore, StoreError};

/// Production record store. The `identity` primary key is the uniqueness
/// guard behind `create_if_absent`; conditional updates are expressed as
/// `UPDATE ... WHERE status = 'pending'` and decided by `rows_affected`,
/// which MySQL executes atomically per row.
pub struct MySqlRecordStore {
    pool: MySqlPool,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    Str(&'a str),
}

const SELECT_COLUMNS: &str = "identity, applicant_id, applicant_name, from_instant, to_instant, \
     reason, status, applied_on, reviewed_on, reviewer_id, reviewer_name, continuation_token";

impl MySqlRecordStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn infra(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.into())
}

#[async_trait]
impl RecordStore for MySqlRecordStore {
    async fn get(&self, identity: &str) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM leave_requests WHERE identity = ?");
        sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(identity)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)
    }

    async fn create_if_absent(&self, record: &LeaveRequest) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (identity, applicant_id, applicant_name, from_instant, to_instant,
                 reason, status, applied_on, continuation_token)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.identity)
        .bind(&record.applicant_id)
        .bind(&record.applicant_name)
        .bind(record.from_instant)
        .bind(record.to_instant)
        .bind(&record.reason)
        .bind(record.status)
        .bind(record.applied_on)
        .bind(&record.continuation_token)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let duplicate = e
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation());
                if duplicate {
                    Err(StoreError::Conflict)
                } else {
                    Err(infra(e))
                }
            }
        }
    }

    async fn update(&self, identity: &str, update: LeaveUpdate) -> Result<(), StoreError> {
        let result = match update {
            LeaveUpdate::AttachToken { token } => {
                sqlx::query(
                    r#"
                    UPDATE leave_requests
                    SET continuation_token = ?
                    WHERE identity = ?
                    AND status = 'pending'
                    AND continuation_token IS NULL
                    "#,
                )
                .bind(token)
                .bind(identity)
                .execute(&self.pool)
                .await
            }
            LeaveUpdate::Finalize { status } => {
                sqlx::query(
                    r#"
                    UPDATE leave_requests
                    SET status = ?, continuation_token = NULL
                    WHERE identity = ?
                    AND status = 'pending'
                    "#,
                )
                .bind(status)
                .bind(identity)
                .execute(&self.pool)
                .await
            }
        };

        let result = result.map_err(infra)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::ConditionFailed);
        }
        Ok(())
    }

    async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, i64), StoreError> {
        let per_page = query.per_page.clamp(1, 100);
        let page = query.page.max(1);
        let offset = (page - 1) * per_page;

        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(applicant_id) = query.applicant_id.as_deref() {
            where_sql.push_str(" AND applicant_id = ?");
            args.push(FilterValue::Str(applicant_id));
        }

        if let Some(status) = query.status.as_deref() {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status));
        }

        let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::Str(s) => count_q.bind(*s),
            };
        }
        let total = count_q.fetch_one(&self.pool).await.map_err(infra)?;

        let data_sql = format!(
            "SELECT {SELECT_COLUMNS} FROM leave_requests{} ORDER BY applied_on DESC LIMIT ? OFFSET ?",
            where_sql
        );
        let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::Str(s) => data_q.bind(s),
            };
        }
        let rows = data_q
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?;

        Ok((rows, total))
    }
}

// LeaveStatus binds as its lowercase label; keep the enum and the SQL
// literals in the conditional updates in sync.
#[cfg(test)]
mod tests {
    use crate::model::leave_request::LeaveStatus;

    #[test]
    fn status_labels_match_sql_literals() {
        assert_eq!(LeaveStatus::Pending.to_string(), "pending");
    }
}
