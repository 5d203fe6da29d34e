//! Radio Program Repository
//!
//! Programs are always read as aggregates: one joined query for the program,
//! its host and its details, then one query for the musics of every program
//! in the result. Nested back-references (`Host::programs`,
//! `Music::radio_programs`, `ProgramDetails::radio_program`) are left empty.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool, Transaction};
use std::collections::{HashMap, HashSet};

use crate::{
    errors::{RepositoryError, RepositoryResult},
    models::{Host, Music, NewRadioProgram, ProgramDetails, RadioProgram},
    repositories::program_details::duration_from_seconds,
    repositories::traits::{RadioProgramStore, Repository},
    utils::datetime::DateTimeParser,
};

const SELECT_PROGRAMS: &str = r#"
    SELECT rp.id, rp.name, rp.start_time, rp.end_time, rp.host_id, rp.program_details_id, rp.version,
           h.name AS host_name, h.email AS host_email,
           pd.description AS details_description, pd.duration_seconds AS details_duration_seconds
    FROM radio_programs rp
    JOIN hosts h ON h.id = rp.host_id
    JOIN program_details pd ON pd.id = rp.program_details_id
"#;

#[derive(Clone)]
pub struct RadioProgramRepository {
    pool: SqlitePool,
}

impl RadioProgramRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn program_from_row(row: &SqliteRow) -> RepositoryResult<RadioProgram> {
        let id: i64 = row.try_get("id")?;
        let host_id: i64 = row.try_get("host_id")?;
        let program_details_id: i64 = row.try_get("program_details_id")?;

        Ok(RadioProgram {
            id,
            name: row.try_get("name")?,
            start_time: parse_instant(row, "start_time")?,
            end_time: parse_instant(row, "end_time")?,
            host_id,
            host: Host {
                id: host_id,
                name: row.try_get("host_name")?,
                email: row.try_get("host_email")?,
                programs: Vec::new(),
            },
            program_details_id,
            program_details: ProgramDetails {
                id: program_details_id,
                description: row.try_get("details_description")?,
                duration: duration_from_seconds(row.try_get("details_duration_seconds")?)?,
                radio_program: None,
            },
            musics: Vec::new(),
            version: row.try_get("version")?,
        })
    }

    async fn load_aggregates(&self, rows: Vec<SqliteRow>) -> RepositoryResult<Vec<RadioProgram>> {
        let mut programs = rows
            .iter()
            .map(Self::program_from_row)
            .collect::<RepositoryResult<Vec<_>>>()?;
        self.attach_musics(&mut programs).await?;
        Ok(programs)
    }

    async fn attach_musics(&self, programs: &mut [RadioProgram]) -> RepositoryResult<()> {
        if programs.is_empty() {
            return Ok(());
        }

        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "SELECT rpm.radio_program_id, m.id, m.title, m.artist \
             FROM radio_program_musics rpm \
             JOIN musics m ON m.id = rpm.music_id \
             WHERE rpm.radio_program_id IN (",
        );
        let mut ids = query_builder.separated(", ");
        for program in programs.iter() {
            ids.push_bind(program.id);
        }
        ids.push_unseparated(") ORDER BY m.id");

        let rows = query_builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("find_program_musics", e))?;

        let mut musics_by_program: HashMap<i64, Vec<Music>> = HashMap::new();
        for row in &rows {
            musics_by_program
                .entry(row.try_get("radio_program_id")?)
                .or_default()
                .push(Music {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    artist: row.try_get("artist")?,
                    radio_programs: Vec::new(),
                });
        }

        for program in programs.iter_mut() {
            program.musics = musics_by_program.remove(&program.id).unwrap_or_default();
        }
        Ok(())
    }

    async fn insert_music_links(
        tx: &mut Transaction<'_, Sqlite>,
        program_id: i64,
        musics: &[Music],
    ) -> RepositoryResult<()> {
        if musics.is_empty() {
            return Ok(());
        }

        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "INSERT OR IGNORE INTO radio_program_musics (radio_program_id, music_id) ",
        );
        query_builder.push_values(musics, |mut b, music| {
            b.push_bind(program_id).push_bind(music.id);
        });

        query_builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(|e| RepositoryError::from_write("insert_program_musics", e))?;
        Ok(())
    }

    async fn begin(&self) -> RepositoryResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| RepositoryError::query_failed("begin_transaction", e))
    }
}

fn parse_instant(row: &SqliteRow, column: &str) -> RepositoryResult<DateTime<Utc>> {
    let stored: String = row.try_get(column)?;
    DateTimeParser::parse_storage(&stored).map_err(|e| RepositoryError::invalid_data(column, e))
}

fn distinct_musics(musics: Vec<Music>) -> Vec<Music> {
    let mut seen = HashSet::new();
    musics
        .into_iter()
        .filter(|m| seen.insert(m.id))
        .map(|m| Music {
            radio_programs: Vec::new(),
            ..m
        })
        .collect()
}

#[async_trait]
impl Repository<RadioProgram, i64> for RadioProgramRepository {
    type CreateRequest = NewRadioProgram;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<RadioProgram>> {
        let sql = format!("{SELECT_PROGRAMS} WHERE rp.id = ?");
        let rows = sqlx::query(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("find_radio_program_by_id", e))?;

        Ok(self.load_aggregates(rows).await?.into_iter().next())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<RadioProgram>> {
        let sql = format!("{SELECT_PROGRAMS} ORDER BY rp.start_time, rp.id");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("find_all_radio_programs", e))?;

        self.load_aggregates(rows).await
    }

    async fn create(&self, program: NewRadioProgram) -> RepositoryResult<RadioProgram> {
        let musics = distinct_musics(program.musics);
        let mut tx = self.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO radio_programs (name, start_time, end_time, host_id, program_details_id, version)
            VALUES (?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(&program.name)
        .bind(DateTimeParser::format_for_storage(&program.start_time))
        .bind(DateTimeParser::format_for_storage(&program.end_time))
        .bind(program.host.id)
        .bind(program.program_details.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write("insert_radio_program", e))?;

        let id = result.last_insert_rowid();
        Self::insert_music_links(&mut tx, id, &musics).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::query_failed("commit_radio_program", e))?;

        Ok(RadioProgram {
            id,
            name: program.name,
            start_time: program.start_time,
            end_time: program.end_time,
            host_id: program.host.id,
            host: Host {
                programs: Vec::new(),
                ..program.host
            },
            program_details_id: program.program_details.id,
            program_details: ProgramDetails {
                radio_program: None,
                ..program.program_details
            },
            musics,
            version: 1,
        })
    }

    async fn update(&self, program: &RadioProgram) -> RepositoryResult<()> {
        let mut tx = self.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE radio_programs
            SET name = ?, start_time = ?, end_time = ?, host_id = ?, program_details_id = ?,
                version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(&program.name)
        .bind(DateTimeParser::format_for_storage(&program.start_time))
        .bind(DateTimeParser::format_for_storage(&program.end_time))
        .bind(program.host_id)
        .bind(program.program_details_id)
        .bind(program.id)
        .bind(program.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write("update_radio_program", e))?;

        if result.rows_affected() == 0 {
            let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM radio_programs WHERE id = ?")
                .bind(program.id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| RepositoryError::query_failed("check_radio_program", e))?;
            tx.rollback()
                .await
                .map_err(|e| RepositoryError::query_failed("rollback_radio_program", e))?;

            return Err(if stored > 0 {
                RepositoryError::version_conflict("radio_programs", program.id)
            } else {
                RepositoryError::record_not_found("radio_programs", "id", program.id)
            });
        }

        sqlx::query("DELETE FROM radio_program_musics WHERE radio_program_id = ?")
            .bind(program.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write("clear_program_musics", e))?;
        Self::insert_music_links(&mut tx, program.id, &program.musics).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::query_failed("commit_radio_program", e))?;
        Ok(())
    }

    /// Removes the program, its music links and its program details.
    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut tx = self.begin().await?;

        let details_id: Option<i64> =
            sqlx::query_scalar("SELECT program_details_id FROM radio_programs WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| RepositoryError::query_failed("find_radio_program_details", e))?;

        let Some(details_id) = details_id else {
            return Ok(());
        };

        sqlx::query("DELETE FROM radio_program_musics WHERE radio_program_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write("delete_program_musics", e))?;
        sqlx::query("DELETE FROM radio_programs WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write("delete_radio_program", e))?;
        sqlx::query("DELETE FROM program_details WHERE id = ?")
            .bind(details_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write("delete_program_details", e))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::query_failed("commit_radio_program", e))?;
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM radio_programs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("count_radio_programs", e))?;
        Ok(count as u64)
    }
}

#[async_trait]
impl RadioProgramStore for RadioProgramRepository {
    async fn find_by_time(&self, instant: DateTime<Utc>) -> RepositoryResult<Vec<RadioProgram>> {
        // Stored bounds are whole microseconds, so an instant between two of
        // them is compared floored against the start and ceiled against the end.
        let not_before = DateTimeParser::format_for_storage(&DateTimeParser::floor_micros(instant));
        let not_after = DateTimeParser::format_for_storage(&DateTimeParser::ceil_micros(instant));
        let sql = format!(
            "{SELECT_PROGRAMS} WHERE rp.start_time <= ? AND rp.end_time >= ? ORDER BY rp.start_time, rp.id"
        );
        let rows = sqlx::query(&sql)
            .bind(&not_before)
            .bind(&not_after)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("find_radio_programs_by_time", e))?;

        self.load_aggregates(rows).await
    }
}
