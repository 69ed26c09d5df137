use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use sellerledger_core::errors::Result;
use sellerledger_core::summaries::{DailySummary, DailySummaryRepositoryTrait};

use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::daily_summaries;
use crate::utils::date_to_text;

use super::model::DailySummaryDB;

pub struct DailySummaryRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl DailySummaryRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl DailySummaryRepositoryTrait for DailySummaryRepository {
    async fn replace_summaries(&self, summaries: Vec<DailySummary>) -> Result<usize> {
        if summaries.is_empty() {
            return Ok(0);
        }

        self.writer
            .exec(move |conn| {
                let mut written = 0;
                for summary in summaries {
                    let row = DailySummaryDB::from(summary);
                    written += diesel::insert_into(daily_summaries::table)
                        .values(&row)
                        .on_conflict((daily_summaries::date, daily_summaries::marketplace_id))
                        .do_update()
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(written)
            })
            .await
    }

    fn get_summaries(
        &self,
        marketplace_id: Option<&str>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailySummary>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = daily_summaries::table
            .filter(daily_summaries::date.ge(date_to_text(start)))
            .filter(daily_summaries::date.le(date_to_text(end)))
            .into_boxed();

        if let Some(marketplace_id) = marketplace_id {
            query = query.filter(daily_summaries::marketplace_id.eq(marketplace_id.to_string()));
        }

        let rows = query
            .order((
                daily_summaries::date.asc(),
                daily_summaries::marketplace_id.asc(),
            ))
            .load::<DailySummaryDB>(&mut conn)
            .into_core()?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
