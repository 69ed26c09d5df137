//! Repository for order and order item persistence.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sellerledger_core::errors::Result;
use sellerledger_core::orders::{Order, OrderItem, OrderRepositoryTrait, OrderUpsertOutcome};

use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{order_items, orders};
use crate::utils::{chunk_for_sqlite, day_bounds, timestamp_to_text};

use super::model::{OrderDB, OrderItemDB};

pub struct OrderRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl OrderRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }

    pub fn get_items(&self, order_id: &str) -> Result<Vec<OrderItem>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = order_items::table
            .filter(order_items::order_id.eq(order_id))
            .order(order_items::order_item_id.asc())
            .load::<OrderItemDB>(&mut conn)
            .into_core()?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl OrderRepositoryTrait for OrderRepository {
    async fn upsert_order(
        &self,
        order: Order,
        items: Option<Vec<OrderItem>>,
    ) -> Result<OrderUpsertOutcome> {
        self.writer
            .exec(move |conn| {
                let now = timestamp_to_text(&Utc::now());
                let mut row = OrderDB::from_domain(order, &now);

                let existing_created_at = orders::table
                    .find(&row.order_id)
                    .select(orders::created_at)
                    .first::<String>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                let inserted = match existing_created_at {
                    Some(created_at) => {
                        row.created_at = created_at;
                        diesel::update(orders::table.find(&row.order_id))
                            .set(&row)
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        false
                    }
                    None => {
                        diesel::insert_into(orders::table)
                            .values(&row)
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        true
                    }
                };

                let mut items_written = 0;
                if let Some(items) = items {
                    diesel::delete(order_items::table.filter(order_items::order_id.eq(&row.order_id)))
                        .execute(conn)
                        .map_err(StorageError::from)?;

                    let rows: Vec<OrderItemDB> = items
                        .into_iter()
                        .map(|mut item| {
                            item.order_id = row.order_id.clone();
                            OrderItemDB::from(item)
                        })
                        .collect();
                    if !rows.is_empty() {
                        items_written = diesel::insert_into(order_items::table)
                            .values(&rows)
                            .execute(conn)
                            .map_err(StorageError::from)?;
                    }
                }

                Ok(OrderUpsertOutcome {
                    inserted,
                    items_written,
                })
            })
            .await
    }

    fn get_order(&self, order_id: &str) -> Result<Option<Order>> {
        let mut conn = get_connection(&self.pool)?;

        let row = orders::table
            .find(order_id)
            .first::<OrderDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(row.map(Into::into))
    }

    fn get_known_order_ids(&self, order_ids: &[String]) -> Result<HashSet<String>> {
        let mut conn = get_connection(&self.pool)?;
        let mut known = HashSet::new();

        for chunk in chunk_for_sqlite(order_ids) {
            let found = orders::table
                .filter(orders::order_id.eq_any(chunk))
                .select(orders::order_id)
                .load::<String>(&mut conn)
                .into_core()?;
            known.extend(found);
        }

        Ok(known)
    }

    fn get_items_for_orders(
        &self,
        order_ids: &[String],
    ) -> Result<HashMap<String, Vec<OrderItem>>> {
        let mut conn = get_connection(&self.pool)?;
        let mut grouped: HashMap<String, Vec<OrderItem>> = HashMap::new();

        for chunk in chunk_for_sqlite(order_ids) {
            let rows = order_items::table
                .filter(order_items::order_id.eq_any(chunk))
                .order((order_items::order_id.asc(), order_items::order_item_id.asc()))
                .load::<OrderItemDB>(&mut conn)
                .into_core()?;

            for row in rows {
                grouped
                    .entry(row.order_id.clone())
                    .or_default()
                    .push(row.into());
            }
        }

        Ok(grouped)
    }

    fn get_orders_purchased_between(
        &self,
        marketplace_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Order>> {
        let mut conn = get_connection(&self.pool)?;
        let (lower, upper) = day_bounds(start, end);

        let rows = orders::table
            .filter(orders::marketplace_id.eq(marketplace_id))
            .filter(orders::purchase_date.ge(lower))
            .filter(orders::purchase_date.lt(upper))
            .order(orders::purchase_date.asc())
            .load::<OrderDB>(&mut conn)
            .into_core()?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    async fn create_test_repository() -> (OrderRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        (OrderRepository::new(Arc::clone(&pool), writer), temp_dir)
    }

    fn order(id: &str, day: u32) -> Order {
        Order {
            order_id: id.to_string(),
            purchase_date: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
            status: "Shipped".to_string(),
            marketplace_id: "ATVPDKIKX0DER".to_string(),
            buyer_country: Some("US".to_string()),
            total_amount: Some(dec!(30.00)),
            currency: Some("USD".to_string()),
            fulfillment_channel: Some("AFN".to_string()),
            number_of_items: Some(2),
        }
    }

    fn item(order_id: &str, id: &str) -> OrderItem {
        OrderItem {
            order_id: order_id.to_string(),
            order_item_id: id.to_string(),
            sku: Some("SKU-1".to_string()),
            asin: Some("B000TEST01".to_string()),
            title: Some("Widget".to_string()),
            quantity: 1,
            unit_price: dec!(15.00),
            line_total: Some(dec!(15.00)),
            item_tax: dec!(1.20),
            promotion_discount: dec!(0),
            currency: Some("USD".to_string()),
            refunded: false,
            product_id: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let (repo, _dir) = create_test_repository().await;

        let first = repo
            .upsert_order(order("A", 1), Some(vec![item("A", "1"), item("A", "2")]))
            .await
            .unwrap();
        assert!(first.inserted);
        assert_eq!(first.items_written, 2);

        let mut changed = order("A", 1);
        changed.status = "Canceled".to_string();
        let second = repo
            .upsert_order(changed, Some(vec![item("A", "1")]))
            .await
            .unwrap();
        assert!(!second.inserted);
        assert_eq!(second.items_written, 1);

        let stored = repo.get_order("A").unwrap().unwrap();
        assert_eq!(stored.status, "Canceled");
        assert_eq!(stored.total_amount, Some(dec!(30.00)));
        assert_eq!(repo.get_items("A").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_header_only_upsert_keeps_items() {
        let (repo, _dir) = create_test_repository().await;

        repo.upsert_order(order("A", 1), Some(vec![item("A", "1"), item("A", "2")]))
            .await
            .unwrap();
        let outcome = repo.upsert_order(order("A", 1), None).await.unwrap();

        assert_eq!(outcome.items_written, 0);
        let items = repo.get_items("A").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].unit_price, dec!(15.00));
        assert_eq!(items[0].line_total, Some(dec!(15.00)));
    }

    #[tokio::test]
    async fn test_known_ids_and_date_range() {
        let (repo, _dir) = create_test_repository().await;
        repo.upsert_order(order("A", 1), None).await.unwrap();
        repo.upsert_order(order("B", 3), None).await.unwrap();

        let known = repo
            .get_known_order_ids(&["A".to_string(), "Z".to_string()])
            .unwrap();
        assert_eq!(known, HashSet::from(["A".to_string()]));

        let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
        let in_range = repo
            .get_orders_purchased_between("ATVPDKIKX0DER", day(2), day(3))
            .unwrap();
        assert_eq!(in_range.len(), 1);
        assert_eq!(in_range[0].order_id, "B");

        let other = repo
            .get_orders_purchased_between("A1F83G8C2ARO7P", day(1), day(3))
            .unwrap();
        assert!(other.is_empty());
    }
}
