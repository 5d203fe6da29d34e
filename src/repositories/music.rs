//! Music Repository

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

use crate::{
    errors::{RepositoryError, RepositoryResult},
    models::{Music, MusicCreateRequest},
    repositories::traits::Repository,
};

#[derive(Clone)]
pub struct MusicRepository {
    pool: SqlitePool,
}

impl MusicRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn music_from_row(row: &sqlx::sqlite::SqliteRow) -> RepositoryResult<Music> {
        Ok(Music {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            artist: row.try_get("artist")?,
            radio_programs: Vec::new(),
        })
    }
}

#[async_trait]
impl Repository<Music, i64> for MusicRepository {
    type CreateRequest = MusicCreateRequest;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Music>> {
        let row = sqlx::query("SELECT id, title, artist FROM musics WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("find_music_by_id", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut music = Self::music_from_row(&row)?;
        music.radio_programs = sqlx::query_scalar(
            "SELECT radio_program_id FROM radio_program_musics WHERE music_id = ? ORDER BY radio_program_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::query_failed("find_music_programs", e))?;

        Ok(Some(music))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Music>> {
        let rows = sqlx::query("SELECT id, title, artist FROM musics ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("find_all_musics", e))?;

        let links = sqlx::query(
            "SELECT music_id, radio_program_id FROM radio_program_musics ORDER BY radio_program_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::query_failed("find_all_music_programs", e))?;

        let mut programs_by_music: HashMap<i64, Vec<i64>> = HashMap::new();
        for link in &links {
            programs_by_music
                .entry(link.try_get("music_id")?)
                .or_default()
                .push(link.try_get("radio_program_id")?);
        }

        let mut musics = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut music = Self::music_from_row(row)?;
            music.radio_programs = programs_by_music.remove(&music.id).unwrap_or_default();
            musics.push(music);
        }
        Ok(musics)
    }

    async fn create(&self, request: MusicCreateRequest) -> RepositoryResult<Music> {
        let result = sqlx::query("INSERT INTO musics (title, artist) VALUES (?, ?)")
            .bind(&request.title)
            .bind(&request.artist)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write("insert_music", e))?;

        Ok(Music {
            id: result.last_insert_rowid(),
            title: request.title,
            artist: request.artist,
            radio_programs: Vec::new(),
        })
    }

    async fn update(&self, music: &Music) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE musics SET title = ?, artist = ? WHERE id = ?")
            .bind(&music.title)
            .bind(&music.artist)
            .bind(music.id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write("update_music", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::record_not_found("musics", "id", music.id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM musics WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write("delete_music", e))?;
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM musics")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("count_musics", e))?;
        Ok(count as u64)
    }
}
