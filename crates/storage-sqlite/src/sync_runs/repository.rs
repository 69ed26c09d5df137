//! Repository for sync run persistence.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use sellerledger_core::errors::{DatabaseError, Error, Result};
use sellerledger_core::sync::{SyncRun, SyncRunRepositoryTrait};

use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::sync_runs;

use super::model::SyncRunDB;

pub struct SyncRunRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SyncRunRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SyncRunRepositoryTrait for SyncRunRepository {
    /// Create a new sync run
    async fn create(&self, run: SyncRun) -> Result<SyncRun> {
        self.writer
            .exec(move |conn| {
                let db_model: SyncRunDB = run.into();

                diesel::insert_into(sync_runs::table)
                    .values(&db_model)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(db_model.into())
            })
            .await
    }

    /// Update a sync run
    async fn update(&self, run: SyncRun) -> Result<SyncRun> {
        self.writer
            .exec(move |conn| {
                let db_model: SyncRunDB = run.into();

                let affected = diesel::update(sync_runs::table.find(&db_model.id))
                    .set(&db_model)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "Sync run {} not found",
                        db_model.id
                    ))));
                }

                Ok(db_model.into())
            })
            .await
    }

    /// Get sync run by ID
    fn get_by_id(&self, id: &str) -> Result<Option<SyncRun>> {
        let mut conn = get_connection(&self.pool)?;

        let result = sync_runs::table
            .find(id)
            .first::<SyncRunDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(result.map(Into::into))
    }

    fn get_recent(&self, marketplace_id: Option<&str>, limit: i64) -> Result<Vec<SyncRun>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = sync_runs::table.into_boxed();
        if let Some(marketplace_id) = marketplace_id {
            query = query.filter(sync_runs::marketplace_id.eq(marketplace_id.to_string()));
        }

        let results = query
            .order(sync_runs::started_at.desc())
            .limit(limit.max(0))
            .load::<SyncRunDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    fn get_latest(&self, marketplace_id: Option<&str>) -> Result<Option<SyncRun>> {
        Ok(self.get_recent(marketplace_id, 1)?.into_iter().next())
    }
}
