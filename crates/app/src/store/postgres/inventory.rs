//! Inventory Repository

use async_trait::async_trait;
use sqlx::{query, query_scalar};
use storefront::catalog::InventoryUuid;

use crate::{
    database::Db,
    store::{InventoryRepository, StockUpdate, StoreError},
};

const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");
const INCREMENT_STOCK_SQL: &str = include_str!("sql/increment_stock.sql");
const GET_STOCK_SQL: &str = include_str!("sql/get_stock.sql");

#[derive(Debug, Clone)]
pub struct PgInventoryRepository {
    db: Db,
}

impl PgInventoryRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InventoryRepository for PgInventoryRepository {
    async fn decrement(
        &self,
        inventory: InventoryUuid,
        quantity: u32,
    ) -> Result<StockUpdate, StoreError> {
        let mut tx = self.db.begin().await?;

        // Guarded in the WHERE clause; a concurrent writer waits on the row lock.
        let remaining: Option<i32> = query_scalar(DECREMENT_STOCK_SQL)
            .bind(inventory.into_uuid())
            .bind(i32::try_from(quantity)?)
            .fetch_optional(&mut *tx)
            .await?;

        let update = match remaining {
            Some(remaining) => StockUpdate::Reserved {
                remaining: u32::try_from(remaining)?,
            },
            None => {
                let available: i32 = query_scalar(GET_STOCK_SQL)
                    .bind(inventory.into_uuid())
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or(StoreError::NotFound)?;

                StockUpdate::Insufficient {
                    available: u32::try_from(available)?,
                }
            }
        };

        tx.commit().await?;

        Ok(update)
    }

    async fn increment(&self, inventory: InventoryUuid, quantity: u32) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = query(INCREMENT_STOCK_SQL)
            .bind(inventory.into_uuid())
            .bind(i32::try_from(quantity)?)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn decrement_never_goes_below_zero() -> TestResult {
        let ctx = TestContext::new().await;
        let inventory = ctx.data.inventory.uuid;

        let taken = ctx.stores.inventory.decrement(inventory, 4).await?;
        assert_eq!(taken, StockUpdate::Reserved { remaining: 1 });

        let refused = ctx.stores.inventory.decrement(inventory, 2).await?;
        assert_eq!(refused, StockUpdate::Insufficient { available: 1 });

        ctx.stores.inventory.increment(inventory, 4).await?;

        let stock: i32 = query_scalar("SELECT stock FROM inventories WHERE uuid = $1")
            .bind(inventory.into_uuid())
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!(stock, 5);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn unknown_inventory_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx.stores.inventory.decrement(InventoryUuid::new(), 1).await;

        assert!(
            matches!(result, Err(StoreError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
