//! Catalog Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as};
use storefront::{
    catalog::{
        CatalogSnapshot, Category, CategoryUuid, Inventory, InventoryUuid, Product, ProductUuid,
        Variant, VariantUuid,
    },
    pricing::Offer,
    uuids::TypedUuid,
};
use uuid::Uuid;

use crate::{
    database::Db,
    store::{CatalogKeys, CatalogRepository, StoreError},
};

use super::{try_get_amount, try_get_count, try_get_percent};

const GET_PRODUCTS_SQL: &str = include_str!("sql/get_products.sql");
const GET_CATEGORIES_SQL: &str = include_str!("sql/get_categories.sql");
const GET_VARIANTS_SQL: &str = include_str!("sql/get_variants.sql");
const GET_INVENTORIES_SQL: &str = include_str!("sql/get_inventories.sql");
const EXPIRE_PRODUCT_OFFERS_SQL: &str = include_str!("sql/expire_product_offers.sql");
const EXPIRE_CATEGORY_OFFERS_SQL: &str = include_str!("sql/expire_category_offers.sql");

#[derive(Debug, Clone)]
pub struct PgCatalogRepository {
    db: Db,
}

impl PgCatalogRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

fn uuids<T>(ids: &[TypedUuid<T>]) -> Vec<Uuid> {
    ids.iter().map(|id| id.into_uuid()).collect()
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn load_snapshot(&self, keys: &CatalogKeys) -> Result<CatalogSnapshot, StoreError> {
        let mut tx = self.db.begin().await?;
        let mut snapshot = CatalogSnapshot::new();

        let products = query_as::<Postgres, ProductRow>(GET_PRODUCTS_SQL)
            .bind(uuids(&keys.products))
            .fetch_all(&mut *tx)
            .await?;

        let category_uuids: Vec<Uuid> = products
            .iter()
            .map(|row| row.0.category_uuid.into_uuid())
            .collect();

        let categories = query_as::<Postgres, CategoryRow>(GET_CATEGORIES_SQL)
            .bind(category_uuids)
            .fetch_all(&mut *tx)
            .await?;

        let variants = query_as::<Postgres, VariantRow>(GET_VARIANTS_SQL)
            .bind(uuids(&keys.variants))
            .fetch_all(&mut *tx)
            .await?;

        let inventories = query_as::<Postgres, InventoryRow>(GET_INVENTORIES_SQL)
            .bind(uuids(&keys.inventories))
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        for ProductRow(product) in products {
            snapshot.insert_product(product);
        }

        for CategoryRow(category) in categories {
            snapshot.insert_category(category);
        }

        for VariantRow(variant) in variants {
            snapshot.insert_variant(variant);
        }

        for InventoryRow(inventory) in inventories {
            snapshot.insert_inventory(inventory);
        }

        Ok(snapshot)
    }

    async fn expire_offers(&self, now: Timestamp) -> Result<u64, StoreError> {
        let mut tx = self.db.begin().await?;

        let products = query(EXPIRE_PRODUCT_OFFERS_SQL)
            .bind(SqlxTimestamp::from(now))
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let categories = query(EXPIRE_CATEGORY_OFFERS_SQL)
            .bind(SqlxTimestamp::from(now))
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(products + categories)
    }
}

fn try_get_offer(row: &PgRow) -> Result<Offer, sqlx::Error> {
    let percent = try_get_percent(row, "offer_percent")?;
    let expires_at = row
        .try_get::<Option<SqlxTimestamp>, _>("offer_expires_at")?
        .map(SqlxTimestamp::to_jiff);

    Offer::new(percent, expires_at).map_err(|e| sqlx::Error::ColumnDecode {
        index: "offer_percent".to_string(),
        source: Box::new(e),
    })
}

struct ProductRow(Product);

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Product {
            uuid: ProductUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            category_uuid: CategoryUuid::from_uuid(row.try_get::<Uuid, _>("category_uuid")?),
            name: row.try_get("name")?,
            base_price: try_get_amount(row, "base_price")?,
            offer: try_get_offer(row)?,
            is_listed: row.try_get("is_listed")?,
        }))
    }
}

struct CategoryRow(Category);

impl<'r> FromRow<'r, PgRow> for CategoryRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Category {
            uuid: CategoryUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            name: row.try_get("name")?,
            offer: try_get_offer(row)?,
            is_listed: row.try_get("is_listed")?,
            is_deleted: row.try_get("is_deleted")?,
        }))
    }
}

struct VariantRow(Variant);

impl<'r> FromRow<'r, PgRow> for VariantRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Variant {
            uuid: VariantUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get::<Uuid, _>("product_uuid")?),
            color: row.try_get("color")?,
            images: row.try_get("images")?,
            is_active: row.try_get("is_active")?,
        }))
    }
}

struct InventoryRow(Inventory);

impl<'r> FromRow<'r, PgRow> for InventoryRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Inventory {
            uuid: InventoryUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            variant_uuid: VariantUuid::from_uuid(row.try_get::<Uuid, _>("variant_uuid")?),
            size: row.try_get("size")?,
            sku: row.try_get("sku")?,
            stock: try_get_count(row, "stock")?,
            is_active: row.try_get("is_active")?,
        }))
    }
}
