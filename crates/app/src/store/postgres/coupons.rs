//! Coupons Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query_as};

use crate::{
    database::Db,
    store::{Coupon, CouponsRepository, StoreError},
};

use super::{try_get_amount, try_get_percent};

const FIND_COUPON_SQL: &str = include_str!("sql/find_coupon.sql");

#[derive(Debug, Clone)]
pub struct PgCouponsRepository {
    db: Db,
}

impl PgCouponsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CouponsRepository for PgCouponsRepository {
    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        let row = query_as::<Postgres, CouponRow>(FIND_COUPON_SQL)
            .bind(code)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|row| row.0))
    }
}

struct CouponRow(Coupon);

impl<'r> FromRow<'r, PgRow> for CouponRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Coupon {
            code: row.try_get("code")?,
            percent: try_get_percent(row, "percent")?,
            max_discount: try_get_amount(row, "max_discount")?,
            min_purchase: try_get_amount(row, "min_purchase")?,
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            is_active: row.try_get("is_active")?,
        }))
    }
}
