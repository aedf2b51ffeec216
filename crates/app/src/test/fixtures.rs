//! In-memory storefront used by the service tests.

use jiff::Timestamp;
use storefront::{
    carts::CartLimits,
    catalog::{CategoryUuid, Inventory, InventoryUuid, ProductUuid, VariantUuid},
    checkout::CheckoutPolicy,
    customers::{Address, AddressUuid, User, UserUuid},
    orders::{PaymentMethod, ReturnPolicy},
};

use crate::{
    domain::{
        carts::{NewCartItem, StoreCartsService},
        checkout::{CheckoutError, CheckoutService, PlaceOrder, PlacedOrder, StoreCheckoutService},
        orders::StoreOrdersService,
    },
    store::{
        CustomersRepository, MemoryStore, Stores,
        demo::{self, DEMO_ADDRESS, DEMO_CATEGORY, DEMO_INVENTORY, DEMO_PRODUCT, DEMO_USER, DEMO_VARIANT},
    },
};

/// The demo catalog in a fresh [`MemoryStore`]: one customer, a ₹2000 shoe
/// on a 20% offer for the next day and five pairs of size 9.
#[derive(Debug, Clone)]
pub(crate) struct Storefront {
    pub(crate) store: MemoryStore,
    pub(crate) user: UserUuid,
    pub(crate) address: AddressUuid,
    pub(crate) category: CategoryUuid,
    pub(crate) product: ProductUuid,
    pub(crate) variant: VariantUuid,
    pub(crate) inventory: InventoryUuid,
}

impl Storefront {
    pub(crate) async fn seed() -> Self {
        let store = MemoryStore::new();

        demo::seed(&store, Timestamp::now())
            .await
            .expect("demo catalog should seed");

        Self {
            store,
            user: DEMO_USER,
            address: DEMO_ADDRESS,
            category: DEMO_CATEGORY,
            product: DEMO_PRODUCT,
            variant: DEMO_VARIANT,
            inventory: DEMO_INVENTORY,
        }
    }

    pub(crate) fn stores(&self) -> Stores {
        Stores::memory(&self.store)
    }

    pub(crate) fn carts_service(&self) -> StoreCartsService {
        StoreCartsService::new(self.stores(), CartLimits::default())
    }

    pub(crate) fn checkout_service(&self) -> StoreCheckoutService {
        StoreCheckoutService::new(self.stores(), CheckoutPolicy::default())
    }

    pub(crate) fn orders_service(&self) -> StoreOrdersService {
        StoreOrdersService::new(self.stores(), ReturnPolicy::default())
    }

    pub(crate) fn new_item(&self, quantity: u32) -> NewCartItem {
        NewCartItem {
            product_uuid: self.product,
            variant_uuid: self.variant,
            inventory_uuid: self.inventory,
            quantity,
        }
    }

    /// Place a cash-on-delivery order for whatever is in the demo user's cart.
    pub(crate) async fn place_cod_order(&self) -> Result<PlacedOrder, CheckoutError> {
        self.checkout_service()
            .place_order(
                self.user,
                PlaceOrder {
                    address_uuid: self.address,
                    payment_method: PaymentMethod::Cod,
                    coupon_code: None,
                },
            )
            .await
    }

    /// Stock a size 10 of the same shoe and return a one-pair cart item for it.
    pub(crate) async fn add_second_size(&self, stock: u32) -> NewCartItem {
        let inventory = InventoryUuid::new();

        self.store
            .insert_inventory(Inventory {
                uuid: inventory,
                variant_uuid: self.variant,
                size: "10".to_string(),
                sku: "RUN-BLK-10".to_string(),
                stock,
                is_active: true,
            })
            .await;

        NewCartItem {
            inventory_uuid: inventory,
            ..self.new_item(1)
        }
    }

    /// Register another customer with an address of their own.
    pub(crate) async fn add_customer(&self) -> (UserUuid, AddressUuid) {
        let user = UserUuid::new();
        let address = AddressUuid::new();

        self.store
            .insert_user(User {
                uuid: user,
                name: "Ravi".to_string(),
                email: format!("ravi-{user}@example.com"),
            })
            .await;

        self.store
            .insert_address(Address {
                uuid: address,
                user_uuid: user,
                full_name: "Ravi Kumar".to_string(),
                phone: "9800000001".to_string(),
                street_address: "4 MG Road".to_string(),
                city: "Bengaluru".to_string(),
                state: "Karnataka".to_string(),
                pincode: "560001".to_string(),
                country: "India".to_string(),
                is_deleted: false,
            })
            .await;

        (user, address)
    }

    pub(crate) async fn set_stock(&self, stock: u32) {
        self.store
            .update_inventory(self.inventory, |inventory| inventory.stock = stock)
            .await;
    }

    pub(crate) async fn set_base_price(&self, price: u64) {
        self.store
            .update_product(self.product, |product| product.base_price = price)
            .await;
    }

    /// Soft-delete the demo user's address.
    pub(crate) async fn delete_address(&self) {
        let mut address = self
            .store
            .find_address(self.user, self.address)
            .await
            .expect("memory store never fails")
            .expect("demo address exists");

        address.is_deleted = true;

        self.store.insert_address(address).await;
    }
}
