//! Program Details Repository
//!
//! Durations are stored as whole seconds in `duration_seconds`.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::time::Duration;

use crate::{
    errors::{RepositoryError, RepositoryResult},
    models::{ProgramDetails, ProgramDetailsCreateRequest},
    repositories::traits::Repository,
};

const SELECT_DETAILS: &str = r#"
    SELECT pd.id, pd.description, pd.duration_seconds, rp.id AS radio_program_id
    FROM program_details pd
    LEFT JOIN radio_programs rp ON rp.program_details_id = pd.id
"#;

#[derive(Clone)]
pub struct ProgramDetailsRepository {
    pool: SqlitePool,
}

impl ProgramDetailsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn details_from_row(row: &sqlx::sqlite::SqliteRow) -> RepositoryResult<ProgramDetails> {
        Ok(ProgramDetails {
            id: row.try_get("id")?,
            description: row.try_get("description")?,
            duration: duration_from_seconds(row.try_get("duration_seconds")?)?,
            radio_program: row.try_get("radio_program_id")?,
        })
    }
}

pub(crate) fn duration_from_seconds(seconds: i64) -> RepositoryResult<Duration> {
    u64::try_from(seconds)
        .map(Duration::from_secs)
        .map_err(|_| RepositoryError::invalid_data("duration_seconds", format!("negative duration {seconds}")))
}

pub(crate) fn duration_to_seconds(duration: Duration) -> RepositoryResult<i64> {
    i64::try_from(duration.as_secs())
        .map_err(|_| RepositoryError::invalid_data("duration_seconds", "duration too large to store"))
}

#[async_trait]
impl Repository<ProgramDetails, i64> for ProgramDetailsRepository {
    type CreateRequest = ProgramDetailsCreateRequest;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ProgramDetails>> {
        let sql = format!("{SELECT_DETAILS} WHERE pd.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("find_program_details_by_id", e))?;

        row.as_ref().map(Self::details_from_row).transpose()
    }

    async fn find_all(&self) -> RepositoryResult<Vec<ProgramDetails>> {
        let sql = format!("{SELECT_DETAILS} ORDER BY pd.id");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("find_all_program_details", e))?;

        rows.iter().map(Self::details_from_row).collect()
    }

    async fn create(&self, request: ProgramDetailsCreateRequest) -> RepositoryResult<ProgramDetails> {
        let result = sqlx::query("INSERT INTO program_details (description, duration_seconds) VALUES (?, ?)")
            .bind(&request.description)
            .bind(duration_to_seconds(request.duration)?)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write("insert_program_details", e))?;

        Ok(ProgramDetails {
            id: result.last_insert_rowid(),
            description: request.description,
            duration: Duration::from_secs(request.duration.as_secs()),
            radio_program: None,
        })
    }

    async fn update(&self, details: &ProgramDetails) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE program_details SET description = ?, duration_seconds = ? WHERE id = ?",
        )
        .bind(&details.description)
        .bind(duration_to_seconds(details.duration)?)
        .bind(details.id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_write("update_program_details", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::record_not_found("program_details", "id", details.id));
        }
        Ok(())
    }

    /// Removes the details row; the program owning it goes with it.
    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM program_details WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write("delete_program_details", e))?;
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM program_details")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("count_program_details", e))?;
        Ok(count as u64)
    }
}
