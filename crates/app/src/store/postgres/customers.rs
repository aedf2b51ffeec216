//! Customers Repository

use async_trait::async_trait;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query_as};
use storefront::customers::{Address, AddressUuid, User, UserUuid};
use uuid::Uuid;

use crate::{
    database::Db,
    store::{CustomersRepository, StoreError},
};

const FIND_USER_SQL: &str = include_str!("sql/find_user.sql");
const FIND_ADDRESS_SQL: &str = include_str!("sql/find_address.sql");

#[derive(Debug, Clone)]
pub struct PgCustomersRepository {
    db: Db,
}

impl PgCustomersRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CustomersRepository for PgCustomersRepository {
    async fn find_user(&self, user: UserUuid) -> Result<Option<User>, StoreError> {
        let row = query_as::<Postgres, UserRow>(FIND_USER_SQL)
            .bind(user.into_uuid())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|row| row.0))
    }

    async fn find_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<Option<Address>, StoreError> {
        let row = query_as::<Postgres, AddressRow>(FIND_ADDRESS_SQL)
            .bind(address.into_uuid())
            .bind(user.into_uuid())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|row| row.0))
    }
}

struct UserRow(User);

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(User {
            uuid: UserUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
        }))
    }
}

struct AddressRow(Address);

impl<'r> FromRow<'r, PgRow> for AddressRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Address {
            uuid: AddressUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
            full_name: row.try_get("full_name")?,
            phone: row.try_get("phone")?,
            street_address: row.try_get("street_address")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            pincode: row.try_get("pincode")?,
            country: row.try_get("country")?,
            is_deleted: row.try_get("is_deleted")?,
        }))
    }
}
