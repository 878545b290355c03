use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityName, EntityTrait,
    IntoActiveModel, PaginatorTrait, PrimaryKeyTrait, QuerySelect, Select, SqlErr,
};

use inkwell_core::error::RepoError;
use inkwell_core::ports::{BaseRepository, Page, PageRequest};

/// Translate a SeaORM error, recognising constraint violations.
pub(crate) fn map_db_err(err: DbErr, table: &str) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!(table, %detail, "Unique constraint violated");
            RepoError::Constraint(format!("Duplicate value for a unique field of {}", table))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            tracing::debug!(table, %detail, "Foreign key constraint violated");
            RepoError::Constraint(format!("Referenced entity does not exist ({})", table))
        }
        _ => match err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
            DbErr::Conn(e) => RepoError::Connection(e.to_string()),
            DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
            other => RepoError::Query(other.to_string()),
        },
    }
}

/// Run a select as one page: a `COUNT` over the whole match plus a
/// `LIMIT/OFFSET` fetch of the rows.
pub(crate) async fn fetch_page<E, T>(
    db: &DbConn,
    select: Select<E>,
    page: PageRequest,
) -> Result<Page<T>, RepoError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    T: From<E::Model>,
{
    let table = E::default().table_name().to_string();

    let total = select
        .clone()
        .count(db)
        .await
        .map_err(|e| map_db_err(e, &table))?;

    let models = select
        .limit(page.limit)
        .offset(page.offset)
        .all(db)
        .await
        .map_err(|e| map_db_err(e, &table))?;

    Ok(Page::new(
        models.into_iter().map(T::from).collect(),
        total,
        page,
    ))
}

/// Generic PostgreSQL repository implementation over a shared pool.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: Arc<DbConn>,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self {
            db: db.into(),
            _entity: PhantomData,
        }
    }

    pub(crate) fn table() -> String {
        E::default().table_name().to_string()
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Clone + Copy + 'static,
    T: From<E::Model> + Into<E::ActiveModel> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| map_db_err(e, &Self::table()))?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, entity: T) -> Result<T, RepoError> {
        let active_model: E::ActiveModel = entity.into();
        let model = active_model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_db_err(e, &Self::table()))?;

        Ok(model.into())
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let active_model: E::ActiveModel = entity.into();
        let model = active_model
            .update(self.db.as_ref())
            .await
            .map_err(|e| map_db_err(e, &Self::table()))?;

        Ok(model.into())
    }

    async fn delete(&self, id: ID) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| map_db_err(e, &Self::table()))?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
