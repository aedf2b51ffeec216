//! Carts Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use storefront::{
    carts::{Cart, CartLine, CartLineUuid, CartUuid},
    catalog::{InventoryUuid, ProductUuid, VariantUuid},
    customers::UserUuid,
};
use uuid::Uuid;

use crate::{
    database::Db,
    store::{CartsRepository, StoreError},
};

use super::{try_get_amount, try_get_count, try_get_percent};

const FIND_CART_SQL: &str = include_str!("sql/find_cart.sql");
const GET_CART_ITEMS_SQL: &str = include_str!("sql/get_cart_items.sql");
const CREATE_CART_SQL: &str = include_str!("sql/create_cart.sql");
const UPDATE_CART_SQL: &str = include_str!("sql/update_cart.sql");
const DELETE_CART_ITEMS_SQL: &str = include_str!("sql/delete_cart_items.sql");
const CREATE_CART_ITEM_SQL: &str = include_str!("sql/create_cart_item.sql");

#[derive(Debug, Clone)]
pub struct PgCartsRepository {
    db: Db,
}

impl PgCartsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn replace_items(
        tx: &mut Transaction<'_, Postgres>,
        cart: &Cart,
    ) -> Result<(), StoreError> {
        query(DELETE_CART_ITEMS_SQL)
            .bind(cart.uuid.into_uuid())
            .execute(&mut **tx)
            .await?;

        for (position, line) in cart.lines.iter().enumerate() {
            query(CREATE_CART_ITEM_SQL)
                .bind(line.uuid.into_uuid())
                .bind(cart.uuid.into_uuid())
                .bind(i32::try_from(position)?)
                .bind(line.product_uuid.into_uuid())
                .bind(line.variant_uuid.into_uuid())
                .bind(line.inventory_uuid.into_uuid())
                .bind(i32::try_from(line.quantity)?)
                .bind(i64::try_from(line.price_at_add)?)
                .bind(i16::from(line.offer_percent_at_add))
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl CartsRepository for PgCartsRepository {
    async fn find_cart(&self, user: UserUuid) -> Result<Option<Cart>, StoreError> {
        let mut tx = self.db.begin().await?;

        let Some(CartRow(mut cart)) = query_as::<Postgres, CartRow>(FIND_CART_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        cart.lines = query_as::<Postgres, CartLineRow>(GET_CART_ITEMS_SQL)
            .bind(cart.uuid.into_uuid())
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(|row| row.0)
            .collect();

        tx.commit().await?;

        Ok(Some(cart))
    }

    async fn save_cart(&self, cart: &Cart) -> Result<Cart, StoreError> {
        let mut tx = self.db.begin().await?;

        let version: i64 = if cart.version == 0 {
            query_scalar(CREATE_CART_SQL)
                .bind(cart.uuid.into_uuid())
                .bind(cart.user_uuid.into_uuid())
                .bind(i32::try_from(cart.total_items)?)
                .bind(i64::try_from(cart.total_amount)?)
                .bind(SqlxTimestamp::from(cart.created_at))
                .bind(SqlxTimestamp::from(cart.updated_at))
                .fetch_one(&mut *tx)
                .await?
        } else {
            query_scalar(UPDATE_CART_SQL)
                .bind(cart.uuid.into_uuid())
                .bind(i64::try_from(cart.version)?)
                .bind(i32::try_from(cart.total_items)?)
                .bind(i64::try_from(cart.total_amount)?)
                .bind(SqlxTimestamp::from(cart.updated_at))
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StoreError::StaleWrite)?
        };

        Self::replace_items(&mut tx, cart).await?;

        tx.commit().await?;

        let mut saved = cart.clone();
        saved.version = u64::try_from(version)?;

        Ok(saved)
    }
}

struct CartRow(Cart);

impl<'r> FromRow<'r, PgRow> for CartRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let version: i64 = row.try_get("version")?;

        Ok(Self(Cart {
            uuid: CartUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
            lines: Vec::new(),
            total_items: try_get_count(row, "total_items")?,
            total_amount: try_get_amount(row, "total_amount")?,
            version: u64::try_from(version).map_err(|e| sqlx::Error::ColumnDecode {
                index: "version".to_string(),
                source: Box::new(e),
            })?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        }))
    }
}

struct CartLineRow(CartLine);

impl<'r> FromRow<'r, PgRow> for CartLineRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(CartLine {
            uuid: CartLineUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get::<Uuid, _>("product_uuid")?),
            variant_uuid: VariantUuid::from_uuid(row.try_get::<Uuid, _>("variant_uuid")?),
            inventory_uuid: InventoryUuid::from_uuid(row.try_get::<Uuid, _>("inventory_uuid")?),
            quantity: try_get_count(row, "quantity")?,
            price_at_add: try_get_amount(row, "price_at_add")?,
            offer_percent_at_add: try_get_percent(row, "offer_percent_at_add")?,
        }))
    }
}
