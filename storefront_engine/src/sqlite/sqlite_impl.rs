//! `SqliteDatabase` is a concrete implementation of a storefront engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{businesses, db_url, new_pool, orders};
use crate::{
    db_types::{Business, NewBusiness, NewOrder, Order, OrderId, PaidTransition},
    traits::{BusinessManagement, StoreError, StorefrontDatabase},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl BusinessManagement for SqliteDatabase {
    async fn fetch_business_by_slug(&self, slug: &str) -> Result<Option<Business>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let business = businesses::fetch_business_by_slug(slug, &mut conn).await?;
        Ok(business)
    }

    async fn fetch_business_by_id(&self, id: i64) -> Result<Option<Business>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let business = businesses::fetch_business_by_id(id, &mut conn).await?;
        Ok(business)
    }

    async fn insert_business(&self, business: NewBusiness) -> Result<Business, StoreError> {
        let mut conn = self.pool.acquire().await?;
        businesses::insert_business(business, &mut conn).await
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_business(&self, business_id: i64) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_business(business_id, &mut conn).await?;
        Ok(orders)
    }
}

impl StorefrontDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::insert_order(order, &mut conn).await?;
        debug!("🗃️ Order {} saved with status {} and id {}", order.order_id, order.status, order.id);
        Ok(order)
    }

    async fn attach_gateway_order(&self, order_id: &OrderId, gateway_order_id: &str) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::attach_gateway_order(order_id, gateway_order_id, &mut conn).await
    }

    async fn fetch_pending_order_by_fingerprint(
        &self,
        business_id: i64,
        fingerprint: &str,
    ) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_pending_order_by_fingerprint(business_id, fingerprint, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_gateway_order_id(gateway_order_id, &mut conn).await?;
        Ok(order)
    }

    async fn mark_order_paid(
        &self,
        business_id: Option<i64>,
        gateway_order_id: &str,
        payment_id: &str,
        signature: Option<&str>,
    ) -> Result<Option<PaidTransition>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::mark_order_paid(business_id, gateway_order_id, payment_id, signature, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
