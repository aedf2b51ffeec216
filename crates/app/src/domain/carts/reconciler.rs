//! Stored-cart reconciliation shared by the cart view and checkout.

use jiff::Timestamp;
use storefront::{
    catalog::CatalogSnapshot,
    customers::UserUuid,
    reconcile::{Reconciliation, reconcile},
};
use tracing::debug;

use crate::store::{CatalogKeys, Stores, StoreError};

/// A reconciled cart together with the catalog it was checked against.
#[derive(Debug)]
pub(crate) struct Reconciled {
    pub(crate) reconciliation: Reconciliation,
    pub(crate) catalog: CatalogSnapshot,
}

/// Reconcile the user's stored cart, persisting it only when something changed.
///
/// Returns `None` when the user has no cart.
pub(crate) async fn reconcile_stored(
    stores: &Stores,
    user: UserUuid,
    now: Timestamp,
) -> Result<Option<Reconciled>, StoreError> {
    let Some(cart) = stores.carts.find_cart(user).await? else {
        return Ok(None);
    };

    let catalog = stores
        .catalog
        .load_snapshot(&CatalogKeys::for_cart(&cart))
        .await?;

    let mut reconciliation = reconcile(cart, &catalog, now);

    if reconciliation.has_changes() {
        debug!(
            user = %user,
            changes = reconciliation.changes.len(),
            "cart reconciled with changes"
        );

        reconciliation.cart.touch(now);
        reconciliation.cart = stores.carts.save_cart(&reconciliation.cart).await?;
    }

    Ok(Some(Reconciled {
        reconciliation,
        catalog,
    }))
}
