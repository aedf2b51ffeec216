//! Test Helpers
//!
//! Direct inserts for catalog and customer rows, which the services only read.

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{PgPool, query};
use storefront::{
    catalog::{Category, Inventory, Product, Variant},
    customers::{Address, User},
};

use crate::store::Coupon;

pub(crate) async fn insert_user(pool: &PgPool, user: &User) {
    query("INSERT INTO users (uuid, name, email) VALUES ($1, $2, $3)")
        .bind(user.uuid.into_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .execute(pool)
        .await
        .expect("Failed to insert user");
}

pub(crate) async fn insert_address(pool: &PgPool, address: &Address) {
    query(
        "INSERT INTO addresses (uuid, user_uuid, full_name, phone, street_address, city, state, \
         pincode, country, is_deleted) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(address.uuid.into_uuid())
    .bind(address.user_uuid.into_uuid())
    .bind(&address.full_name)
    .bind(&address.phone)
    .bind(&address.street_address)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.pincode)
    .bind(&address.country)
    .bind(address.is_deleted)
    .execute(pool)
    .await
    .expect("Failed to insert address");
}

pub(crate) async fn insert_category(pool: &PgPool, category: &Category) {
    query(
        "INSERT INTO categories (uuid, name, offer_percent, offer_expires_at, is_listed, \
         is_deleted) VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(category.uuid.into_uuid())
    .bind(&category.name)
    .bind(i16::from(category.offer.percent()))
    .bind(category.offer.expires_at().map(SqlxTimestamp::from))
    .bind(category.is_listed)
    .bind(category.is_deleted)
    .execute(pool)
    .await
    .expect("Failed to insert category");
}

pub(crate) async fn insert_product(pool: &PgPool, product: &Product) {
    query(
        "INSERT INTO products (uuid, category_uuid, name, base_price, offer_percent, \
         offer_expires_at, is_listed) VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(product.uuid.into_uuid())
    .bind(product.category_uuid.into_uuid())
    .bind(&product.name)
    .bind(i64::try_from(product.base_price).expect("price fits in BIGINT"))
    .bind(i16::from(product.offer.percent()))
    .bind(product.offer.expires_at().map(SqlxTimestamp::from))
    .bind(product.is_listed)
    .execute(pool)
    .await
    .expect("Failed to insert product");
}

pub(crate) async fn insert_variant(pool: &PgPool, variant: &Variant) {
    query(
        "INSERT INTO product_variants (uuid, product_uuid, color, images, is_active) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(variant.uuid.into_uuid())
    .bind(variant.product_uuid.into_uuid())
    .bind(&variant.color)
    .bind(&variant.images)
    .bind(variant.is_active)
    .execute(pool)
    .await
    .expect("Failed to insert variant");
}

pub(crate) async fn insert_inventory(pool: &PgPool, inventory: &Inventory) {
    query(
        "INSERT INTO inventories (uuid, variant_uuid, size, sku, stock, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(inventory.uuid.into_uuid())
    .bind(inventory.variant_uuid.into_uuid())
    .bind(&inventory.size)
    .bind(&inventory.sku)
    .bind(i32::try_from(inventory.stock).expect("stock fits in INTEGER"))
    .bind(inventory.is_active)
    .execute(pool)
    .await
    .expect("Failed to insert inventory");
}

pub(crate) async fn insert_coupon(pool: &PgPool, coupon: &Coupon) {
    query(
        "INSERT INTO coupons (code, percent, max_discount, min_purchase, expires_at, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&coupon.code)
    .bind(i16::from(coupon.percent))
    .bind(i64::try_from(coupon.max_discount).expect("amount fits in BIGINT"))
    .bind(i64::try_from(coupon.min_purchase).expect("amount fits in BIGINT"))
    .bind(SqlxTimestamp::from(coupon.expires_at))
    .bind(coupon.is_active)
    .execute(pool)
    .await
    .expect("Failed to insert coupon");
}
