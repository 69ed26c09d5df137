//! Repository for financial events and refund allocations.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use sellerledger_core::errors::Result;
use sellerledger_core::finances::{
    EventBatchOutcome, EventWrite, FinancialEvent, FinancialEventRepositoryTrait,
    RefundAllocation,
};

use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{financial_events, order_items, refund_allocations};
use crate::utils::{chunk_for_sqlite, day_bounds, timestamp_to_text};

use super::model::{FinancialEventDB, RefundAllocationDB};

pub struct FinancialEventRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl FinancialEventRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

/// Replaces the allocations of one event and re-derives the refunded flag of
/// every item the old or new allocations touch.
fn replace_allocations(
    conn: &mut SqliteConnection,
    event_key: &str,
    allocations: Vec<RefundAllocation>,
) -> std::result::Result<usize, StorageError> {
    let previous: Vec<(String, String)> = refund_allocations::table
        .filter(refund_allocations::event_key.eq(event_key))
        .select((refund_allocations::order_id, refund_allocations::order_item_id))
        .load(conn)?;

    diesel::delete(refund_allocations::table.filter(refund_allocations::event_key.eq(event_key)))
        .execute(conn)?;

    let mut touched: BTreeSet<(String, String)> = previous.into_iter().collect();
    let rows: Vec<RefundAllocationDB> = allocations
        .into_iter()
        .map(|a| {
            touched.insert((a.order_id.clone(), a.order_item_id.clone()));
            RefundAllocationDB::from(a)
        })
        .collect();

    let written = if rows.is_empty() {
        0
    } else {
        diesel::insert_into(refund_allocations::table)
            .values(&rows)
            .execute(conn)?
    };

    for (order_id, order_item_id) in touched {
        let remaining: i64 = refund_allocations::table
            .filter(refund_allocations::order_id.eq(&order_id))
            .filter(refund_allocations::order_item_id.eq(&order_item_id))
            .count()
            .get_result(conn)?;

        diesel::update(order_items::table.find((&order_id, &order_item_id)))
            .set(order_items::refunded.eq(remaining > 0))
            .execute(conn)?;
    }

    Ok(written)
}

#[async_trait]
impl FinancialEventRepositoryTrait for FinancialEventRepository {
    async fn upsert_events(&self, batch: Vec<EventWrite>) -> Result<EventBatchOutcome> {
        if batch.is_empty() {
            return Ok(EventBatchOutcome::default());
        }

        self.writer
            .exec(move |conn| {
                let now = timestamp_to_text(&Utc::now());
                let mut outcome = EventBatchOutcome::default();

                for write in batch {
                    let mut row = FinancialEventDB::from_domain(write.event, &now);

                    let existing_created_at = financial_events::table
                        .find(&row.event_key)
                        .select(financial_events::created_at)
                        .first::<String>(conn)
                        .optional()
                        .map_err(StorageError::from)?;

                    match existing_created_at {
                        Some(created_at) => {
                            row.created_at = created_at;
                            diesel::update(financial_events::table.find(&row.event_key))
                                .set(&row)
                                .execute(conn)
                                .map_err(StorageError::from)?;
                            outcome.updated += 1;
                        }
                        None => {
                            diesel::insert_into(financial_events::table)
                                .values(&row)
                                .execute(conn)
                                .map_err(StorageError::from)?;
                            outcome.inserted += 1;
                        }
                    }

                    if let Some(allocations) = write.allocations {
                        outcome.allocations_written +=
                            replace_allocations(conn, &row.event_key, allocations)?;
                    }
                }

                Ok(outcome)
            })
            .await
    }

    fn get_event(&self, event_key: &str) -> Result<Option<FinancialEvent>> {
        let mut conn = get_connection(&self.pool)?;

        let row = financial_events::table
            .find(event_key)
            .first::<FinancialEventDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(row.map(Into::into))
    }

    fn get_existing_keys(&self, event_keys: &[String]) -> Result<HashSet<String>> {
        let mut conn = get_connection(&self.pool)?;
        let mut existing = HashSet::new();

        for chunk in chunk_for_sqlite(event_keys) {
            let found = financial_events::table
                .filter(financial_events::event_key.eq_any(chunk))
                .select(financial_events::event_key)
                .load::<String>(&mut conn)
                .into_core()?;
            existing.extend(found);
        }

        Ok(existing)
    }

    fn get_events_posted_between(
        &self,
        marketplace_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FinancialEvent>> {
        let mut conn = get_connection(&self.pool)?;
        let (lower, upper) = day_bounds(start, end);

        let rows = financial_events::table
            .filter(
                financial_events::marketplace_id
                    .eq(marketplace_id)
                    .or(financial_events::marketplace_id.is_null()),
            )
            .filter(financial_events::posted_date.ge(lower))
            .filter(financial_events::posted_date.lt(upper))
            .order((
                financial_events::posted_date.asc(),
                financial_events::event_key.asc(),
            ))
            .load::<FinancialEventDB>(&mut conn)
            .into_core()?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn get_allocations_for_event(&self, event_key: &str) -> Result<Vec<RefundAllocation>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = refund_allocations::table
            .filter(refund_allocations::event_key.eq(event_key))
            .order((
                refund_allocations::order_id.asc(),
                refund_allocations::order_item_id.asc(),
            ))
            .load::<RefundAllocationDB>(&mut conn)
            .into_core()?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn get_refunded_item_keys(&self, order_ids: &[String]) -> Result<HashSet<(String, String)>> {
        let mut conn = get_connection(&self.pool)?;
        let mut keys = HashSet::new();

        for chunk in chunk_for_sqlite(order_ids) {
            let found = refund_allocations::table
                .filter(refund_allocations::order_id.eq_any(chunk))
                .select((refund_allocations::order_id, refund_allocations::order_item_id))
                .distinct()
                .load::<(String, String)>(&mut conn)
                .into_core()?;
            keys.extend(found);
        }

        Ok(keys)
    }
}
