//! Orders Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json,
};
use storefront::{
    catalog::{InventoryUuid, ProductUuid, VariantUuid},
    checkout::OrderPricing,
    customers::UserUuid,
    orders::{
        Cancellation, CustomerSnapshot, Order, OrderItem, OrderItemUuid, OrderNumber, OrderUuid,
        Payment, ReturnInfo, ShippingAddress, StatusChange,
    },
};
use uuid::Uuid;

use crate::{
    database::Db,
    store::{OrdersRepository, StoreError},
};

use super::{try_get_amount, try_get_count, try_get_label, try_get_percent};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const FIND_ORDER_SQL: &str = include_str!("sql/find_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const UPDATE_ORDER_SQL: &str = include_str!("sql/update_order.sql");
const UPDATE_ORDER_ITEM_SQL: &str = include_str!("sql/update_order_item.sql");

#[derive(Debug, Clone)]
pub struct PgOrdersRepository {
    db: Db,
}

impl PgOrdersRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Attach items to their orders, keeping item order within each order.
    async fn load_items(
        tx: &mut Transaction<'_, Postgres>,
        orders: &mut [Order],
    ) -> Result<(), StoreError> {
        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let rows = query_as::<Postgres, OrderItemRow>(GET_ORDER_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut by_order: FxHashMap<OrderUuid, Vec<OrderItem>> = FxHashMap::default();

        for OrderItemRow { order_uuid, item } in rows {
            by_order.entry(order_uuid).or_default().push(item);
        }

        for order in orders {
            order.items = by_order.remove(&order.uuid).unwrap_or_default();
        }

        Ok(())
    }
}

#[async_trait]
impl OrdersRepository for PgOrdersRepository {
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        query(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.number.as_str())
            .bind(order.user_uuid.into_uuid())
            .bind(&order.customer.name)
            .bind(&order.customer.email)
            .bind(Json(&order.shipping_address))
            .bind(order.payment.method.as_str())
            .bind(order.payment.status.as_str())
            .bind(i64::try_from(order.payment.refunded_amount)?)
            .bind(order.status.as_str())
            .bind(i64::try_from(order.pricing.subtotal)?)
            .bind(i64::try_from(order.pricing.tax)?)
            .bind(i16::from(order.pricing.tax_percent))
            .bind(i64::try_from(order.pricing.shipping_charge)?)
            .bind(i64::try_from(order.pricing.discount)?)
            .bind(i64::try_from(order.pricing.total_amount)?)
            .bind(SqlxTimestamp::from(order.created_at))
            .bind(SqlxTimestamp::from(order.updated_at))
            .bind(order.delivered_at.map(SqlxTimestamp::from))
            .bind(order.cancelled_at.map(SqlxTimestamp::from))
            .execute(&mut *tx)
            .await?;

        for (position, item) in order.items.iter().enumerate() {
            query(CREATE_ORDER_ITEM_SQL)
                .bind(item.uuid.into_uuid())
                .bind(order.uuid.into_uuid())
                .bind(i32::try_from(position)?)
                .bind(item.product_uuid.into_uuid())
                .bind(item.variant_uuid.into_uuid())
                .bind(item.inventory_uuid.into_uuid())
                .bind(&item.product_name)
                .bind(&item.color)
                .bind(&item.size)
                .bind(&item.sku)
                .bind(item.image.as_deref())
                .bind(i32::try_from(item.quantity)?)
                .bind(i64::try_from(item.unit_price)?)
                .bind(i64::try_from(item.line_total)?)
                .bind(item.status.as_str())
                .bind(Json(&item.timeline))
                .bind(item.cancellation.as_ref().map(Json))
                .bind(item.return_info.as_ref().map(Json))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn find_order(&self, number: &OrderNumber) -> Result<Option<Order>, StoreError> {
        let mut tx = self.db.begin().await?;

        let Some(OrderRow(order)) = query_as::<Postgres, OrderRow>(FIND_ORDER_SQL)
            .bind(number.as_str())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut orders = [order];
        Self::load_items(&mut tx, &mut orders).await?;

        tx.commit().await?;

        let [order] = orders;

        Ok(Some(order))
    }

    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, StoreError> {
        let mut tx = self.db.begin().await?;

        let mut orders: Vec<Order> = query_as::<Postgres, OrderRow>(LIST_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(|row| row.0)
            .collect();

        Self::load_items(&mut tx, &mut orders).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn save_order(&self, order: &Order, read_at: Timestamp) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = query(UPDATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(SqlxTimestamp::from(read_at))
            .bind(order.payment.status.as_str())
            .bind(i64::try_from(order.payment.refunded_amount)?)
            .bind(order.status.as_str())
            .bind(SqlxTimestamp::from(order.updated_at))
            .bind(order.delivered_at.map(SqlxTimestamp::from))
            .bind(order.cancelled_at.map(SqlxTimestamp::from))
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::StaleWrite);
        }

        for item in &order.items {
            query(UPDATE_ORDER_ITEM_SQL)
                .bind(item.uuid.into_uuid())
                .bind(order.uuid.into_uuid())
                .bind(item.status.as_str())
                .bind(Json(&item.timeline))
                .bind(item.cancellation.as_ref().map(Json))
                .bind(item.return_info.as_ref().map(Json))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}

struct OrderRow(Order);

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let shipping_address: Json<ShippingAddress> = row.try_get("shipping_address")?;

        Ok(Self(Order {
            uuid: OrderUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            number: try_get_label(row, "order_number")?,
            user_uuid: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
            customer: CustomerSnapshot {
                name: row.try_get("customer_name")?,
                email: row.try_get("customer_email")?,
            },
            shipping_address: shipping_address.0,
            payment: Payment {
                method: try_get_label(row, "payment_method")?,
                status: try_get_label(row, "payment_status")?,
                refunded_amount: try_get_amount(row, "refunded_amount")?,
            },
            status: try_get_label(row, "status")?,
            pricing: OrderPricing {
                subtotal: try_get_amount(row, "subtotal")?,
                tax: try_get_amount(row, "tax")?,
                tax_percent: try_get_percent(row, "tax_percent")?,
                shipping_charge: try_get_amount(row, "shipping_charge")?,
                discount: try_get_amount(row, "discount")?,
                total_amount: try_get_amount(row, "total_amount")?,
            },
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            delivered_at: row
                .try_get::<Option<SqlxTimestamp>, _>("delivered_at")?
                .map(SqlxTimestamp::to_jiff),
            cancelled_at: row
                .try_get::<Option<SqlxTimestamp>, _>("cancelled_at")?
                .map(SqlxTimestamp::to_jiff),
        }))
    }
}

struct OrderItemRow {
    order_uuid: OrderUuid,
    item: OrderItem,
}

impl<'r> FromRow<'r, PgRow> for OrderItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let timeline: Json<Vec<StatusChange>> = row.try_get("timeline")?;
        let cancellation: Option<Json<Cancellation>> = row.try_get("cancellation")?;
        let return_info: Option<Json<ReturnInfo>> = row.try_get("return_info")?;

        Ok(Self {
            order_uuid: OrderUuid::from_uuid(row.try_get::<Uuid, _>("order_uuid")?),
            item: OrderItem {
                uuid: OrderItemUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
                product_uuid: ProductUuid::from_uuid(row.try_get::<Uuid, _>("product_uuid")?),
                variant_uuid: VariantUuid::from_uuid(row.try_get::<Uuid, _>("variant_uuid")?),
                inventory_uuid: InventoryUuid::from_uuid(
                    row.try_get::<Uuid, _>("inventory_uuid")?,
                ),
                product_name: row.try_get("product_name")?,
                color: row.try_get("color")?,
                size: row.try_get("size")?,
                sku: row.try_get("sku")?,
                image: row.try_get("image")?,
                quantity: try_get_count(row, "quantity")?,
                unit_price: try_get_amount(row, "unit_price")?,
                line_total: try_get_amount(row, "line_total")?,
                status: try_get_label(row, "status")?,
                timeline: timeline.0,
                cancellation: cancellation.map(|json| json.0),
                return_info: return_info.map(|json| json.0),
            },
        })
    }
}
