//! Generic entity service
//!
//! Pass-through CRUD for entities with no rules of their own.

use std::marker::PhantomData;
use tracing::{debug, error, info};

use crate::{
    errors::{AppError, AppResult, RepositoryError},
    models::{Entity, Host, Music, ProgramDetails},
    repositories::{HostRepository, MusicRepository, ProgramDetailsRepository, Repository},
};

pub type HostService = EntityService<Host, HostRepository>;
pub type MusicService = EntityService<Music, MusicRepository>;
pub type ProgramDetailsService = EntityService<ProgramDetails, ProgramDetailsRepository>;

pub struct EntityService<T, R> {
    repository: R,
    _entity: PhantomData<fn() -> T>,
}

impl<T, R: Clone> Clone for EntityService<T, R> {
    fn clone(&self) -> Self {
        Self::new(self.repository.clone())
    }
}

impl<T, R> EntityService<T, R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            _entity: PhantomData,
        }
    }
}

impl<T, R> EntityService<T, R>
where
    T: Entity + Send + Sync + 'static,
    R: Repository<T, i64>,
{
    pub async fn add(&self, request: R::CreateRequest) -> AppResult<T> {
        let entity = self
            .repository
            .create(request)
            .await
            .map_err(|e| Self::store_failure("add", e))?;
        info!("Created {} {}", T::NAME, entity.id());
        Ok(entity)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<T>> {
        debug!("Fetching {} {}", T::NAME, id);
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| Self::store_failure("get", e))
    }

    pub async fn get_all(&self) -> AppResult<Vec<T>> {
        self.repository
            .find_all()
            .await
            .map_err(|e| Self::store_failure("list", e))
    }

    pub async fn update(&self, entity: &T) -> AppResult<()> {
        match self.repository.update(entity).await {
            Ok(()) => {
                info!("Updated {} {}", T::NAME, entity.id());
                Ok(())
            }
            Err(RepositoryError::RecordNotFound { .. }) => Err(AppError::not_found(T::NAME, entity.id())),
            Err(e) => Err(Self::store_failure("update", e)),
        }
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| Self::store_failure("delete", e))?;
        info!("Deleted {} {}", T::NAME, id);
        Ok(())
    }

    pub async fn count(&self) -> AppResult<u64> {
        self.repository
            .count()
            .await
            .map_err(|e| Self::store_failure("count", e))
    }

    fn store_failure(verb: &str, source: RepositoryError) -> AppError {
        let operation = format!("{verb} {}", T::NAME);
        error!("Unable to {}: {}", operation, source);
        AppError::store(operation, source)
    }
}
