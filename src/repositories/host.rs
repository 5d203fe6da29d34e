//! Host Repository

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

use crate::{
    errors::{RepositoryError, RepositoryResult},
    models::{Host, HostCreateRequest},
    repositories::traits::Repository,
};

#[derive(Clone)]
pub struct HostRepository {
    pool: SqlitePool,
}

impl HostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn host_from_row(row: &sqlx::sqlite::SqliteRow) -> RepositoryResult<Host> {
        Ok(Host {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            programs: Vec::new(),
        })
    }

    async fn program_ids(&self, host_id: i64) -> RepositoryResult<Vec<i64>> {
        sqlx::query_scalar("SELECT id FROM radio_programs WHERE host_id = ? ORDER BY id")
            .bind(host_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("find_host_programs", e))
    }
}

#[async_trait]
impl Repository<Host, i64> for HostRepository {
    type CreateRequest = HostCreateRequest;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Host>> {
        let row = sqlx::query("SELECT id, name, email FROM hosts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("find_host_by_id", e))?;

        match row {
            Some(row) => {
                let mut host = Self::host_from_row(&row)?;
                host.programs = self.program_ids(id).await?;
                Ok(Some(host))
            }
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Host>> {
        let rows = sqlx::query("SELECT id, name, email FROM hosts ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("find_all_hosts", e))?;

        let links = sqlx::query("SELECT host_id, id FROM radio_programs ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("find_all_host_programs", e))?;

        let mut programs_by_host: HashMap<i64, Vec<i64>> = HashMap::new();
        for link in &links {
            programs_by_host
                .entry(link.try_get("host_id")?)
                .or_default()
                .push(link.try_get("id")?);
        }

        let mut hosts = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut host = Self::host_from_row(row)?;
            host.programs = programs_by_host.remove(&host.id).unwrap_or_default();
            hosts.push(host);
        }
        Ok(hosts)
    }

    async fn create(&self, request: HostCreateRequest) -> RepositoryResult<Host> {
        let result = sqlx::query("INSERT INTO hosts (name, email) VALUES (?, ?)")
            .bind(&request.name)
            .bind(&request.email)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write("insert_host", e))?;

        Ok(Host {
            id: result.last_insert_rowid(),
            name: request.name,
            email: request.email,
            programs: Vec::new(),
        })
    }

    async fn update(&self, host: &Host) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE hosts SET name = ?, email = ? WHERE id = ?")
            .bind(&host.name)
            .bind(&host.email)
            .bind(host.id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write("update_host", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::record_not_found("hosts", "id", host.id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM hosts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write("delete_host", e))?;
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hosts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("count_hosts", e))?;
        Ok(count as u64)
    }
}
