//! Repository trait definitions
//!
//! Every stored entity gets one implementation of [`Repository`]. Radio
//! programs additionally implement [`RadioProgramStore`], which adds the
//! time-range query and guarantees eagerly loaded aggregates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::RepositoryResult;
use crate::models::{NewRadioProgram, RadioProgram};

/// Core repository trait providing CRUD operations
///
/// # Type Parameters
///
/// * `T` - The entity type (e.g., Host, RadioProgram)
/// * `ID` - The identifier type
///
/// # Examples
///
/// ```rust,ignore
/// use radio_scheduler::repositories::{HostRepository, Repository};
///
/// async fn example(repo: HostRepository) -> RepositoryResult<()> {
///     if let Some(mut host) = repo.find_by_id(1).await? {
///         host.email = "new@example.com".to_string();
///         repo.update(&host).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait Repository<T, ID: Send + 'static>: Send + Sync {
    /// Request type for creating new entities
    type CreateRequest: Send;

    /// Find an entity by its ID
    ///
    /// # Returns
    ///
    /// * `Ok(Some(T))` - Entity found
    /// * `Ok(None)` - Entity not found
    /// * `Err(RepositoryError)` - Database or other error
    async fn find_by_id(&self, id: ID) -> RepositoryResult<Option<T>>;

    /// Every stored entity (may be empty)
    async fn find_all(&self) -> RepositoryResult<Vec<T>>;

    /// Create a new entity
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - Created entity with its assigned ID
    /// * `Err(RepositoryError)` - Constraint or database error
    async fn create(&self, request: Self::CreateRequest) -> RepositoryResult<T>;

    /// Overwrite every stored field of an existing entity
    ///
    /// Fails with `RecordNotFound` when the entity no longer exists.
    async fn update(&self, entity: &T) -> RepositoryResult<()>;

    /// Delete an entity by ID
    ///
    /// Deleting an unknown ID succeeds without doing anything.
    async fn delete(&self, id: ID) -> RepositoryResult<()>;

    /// Number of stored entities
    async fn count(&self) -> RepositoryResult<u64>;

    /// Check if an entity exists by ID
    async fn exists(&self, id: ID) -> RepositoryResult<bool> {
        match self.find_by_id(id).await? {
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }
}

/// Store for radio program aggregates
///
/// `find_by_id`, `find_all` and `find_by_time` always return programs with
/// their host, program details and musics populated. `update` is guarded by
/// [`RadioProgram::version`] and fails with `VersionConflict` when the stored
/// row was changed in between.
#[async_trait]
pub trait RadioProgramStore:
    Repository<RadioProgram, i64, CreateRequest = NewRadioProgram>
{
    /// Programs on air at `instant`, i.e. `start_time <= instant <= end_time`
    async fn find_by_time(&self, instant: DateTime<Utc>) -> RepositoryResult<Vec<RadioProgram>>;
}
