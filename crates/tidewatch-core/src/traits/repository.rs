//! Generic repository trait for entity stores.

use async_trait::async_trait;

use crate::result::AppResult;

/// Generic CRUD repository trait.
///
/// Entity-specific queries (geospatial lookups, atomic read-modify-write)
/// are defined on the concrete repository structs.
#[async_trait]
pub trait Repository<Entity, Id>: Send + Sync + 'static
where
    Entity: Send + Sync + 'static,
    Id: Send + Sync + 'static,
{
    /// Find an entity by its primary key.
    async fn find_by_id(&self, id: &Id) -> AppResult<Option<Entity>>;

    /// Insert a new entity. Fails with a conflict if the key is taken.
    async fn create(&self, entity: &Entity) -> AppResult<Entity>;

    /// Replace an existing entity. Fails with not-found if it is missing.
    async fn update(&self, entity: &Entity) -> AppResult<Entity>;

    /// Count stored entities.
    async fn count(&self) -> AppResult<u64>;
}
