//! PostgreSQL repositories

use std::str::FromStr;

use sqlx::{Row, postgres::PgRow};

mod carts;
mod catalog;
mod coupons;
mod customers;
mod inventory;
mod orders;

pub use carts::PgCartsRepository;
pub use catalog::PgCatalogRepository;
pub use coupons::PgCouponsRepository;
pub use customers::PgCustomersRepository;
pub use inventory::PgInventoryRepository;
pub use orders::PgOrdersRepository;

fn decode_error(col: &str, source: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(source),
    }
}

/// Money columns are `BIGINT`.
pub(super) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| decode_error(col, e))
}

/// Quantities and stock are `INTEGER`.
pub(super) fn try_get_count(row: &PgRow, col: &str) -> Result<u32, sqlx::Error> {
    let count_i32: i32 = row.try_get(col)?;

    u32::try_from(count_i32).map_err(|e| decode_error(col, e))
}

/// Percentages are `SMALLINT`.
pub(super) fn try_get_percent(row: &PgRow, col: &str) -> Result<u8, sqlx::Error> {
    let percent_i16: i16 = row.try_get(col)?;

    u8::try_from(percent_i16).map_err(|e| decode_error(col, e))
}

/// Statuses are stored as their serialised label.
pub(super) fn try_get_label<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let label: String = row.try_get(col)?;

    label.parse().map_err(|e| decode_error(col, e))
}
