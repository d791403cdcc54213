use chrono::Utc;
use log::debug;
use sqlx::{types::Json, SqliteConnection};

use crate::{
    db_types::{Business, NewBusiness},
    traits::StoreError,
};

pub async fn fetch_business_by_slug(slug: &str, conn: &mut SqliteConnection) -> Result<Option<Business>, sqlx::Error> {
    let business = sqlx::query_as("SELECT * FROM businesses WHERE slug = $1").bind(slug).fetch_optional(conn).await?;
    Ok(business)
}

pub async fn fetch_business_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Business>, sqlx::Error> {
    let business = sqlx::query_as("SELECT * FROM businesses WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(business)
}

/// Inserts a new business. This is not atomic with respect to the slug check, but the `UNIQUE` constraint on `slug`
/// catches any race.
pub async fn insert_business(business: NewBusiness, conn: &mut SqliteConnection) -> Result<Business, StoreError> {
    if fetch_business_by_slug(&business.slug, conn).await?.is_some() {
        return Err(StoreError::BusinessAlreadyExists(business.slug));
    }
    let now = Utc::now();
    let zones: Vec<String> =
        business.delivery_area.into_iter().map(|z| z.trim().to_string()).filter(|z| !z.is_empty()).collect();
    let business: Business = sqlx::query_as(
        r#"
            INSERT INTO businesses (
                slug,
                name,
                delivery_area,
                gateway_key_id,
                gateway_key_secret,
                contact_phone,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(business.slug)
    .bind(business.name)
    .bind(Json(zones))
    .bind(business.gateway_key_id)
    .bind(business.gateway_key_secret)
    .bind(business.contact_phone)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Business '{}' registered with id {}", business.slug, business.id);
    Ok(business)
}
