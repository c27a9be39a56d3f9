//! Integration tests for file-backed store snapshots.
//!
//! Each test gets its own temporary state directory.

use std::fs;

use rust_decimal::Decimal;
use tempfile::TempDir;

use fudsiti_core::{DeliveryMethod, OrderStatus, PaymentMethod, ProductId, ProductUnit, VendorId};
use fudsiti_storefront::models::{CartItem, Checkout, Product};
use fudsiti_storefront::persistence::{DEFAULT_KEY, FileStorage, SnapshotStorage};
use fudsiti_storefront::store::Store;

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal")
}

fn open(dir: &TempDir) -> Store<FileStorage> {
    Store::load(FileStorage::new(dir.path()))
}

fn product(id: &str, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("product {id}"),
        description: String::new(),
        price: dec(price),
        unit: ProductUnit::Kg,
        category: "vegetables".to_string(),
        vendor_id: VendorId::new("farm-1"),
        vendor_name: "Green Farm".to_string(),
        vendor_rating: 4.9,
        vendor_return_rate: 0.5,
        images: Vec::new(),
        in_stock: true,
        weight_range: None,
    }
}

#[test]
fn test_cart_survives_restart() {
    let dir = TempDir::new().expect("temp dir");

    {
        let mut store = open(&dir);
        store.add_to_cart(CartItem::new("1", dec("2"), ProductUnit::Kg));
        store.add_to_cart(CartItem::new("1", dec("1.5"), ProductUnit::Kg));
        store.add_to_cart(CartItem::new("2", dec("3"), ProductUnit::Piece).with_comment("ripe"));
        store.set_search_query("tomato");
        store.set_selected_category(Some("vegetables".to_string()));
    }

    let store = open(&dir);
    let cart = store.cart();
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.items()[0].quantity, dec("3.5"));
    assert_eq!(cart.items()[1].comment.as_deref(), Some("ripe"));

    let state = store.snapshot();
    assert!(state.search_query.is_empty());
    assert_eq!(state.selected_category, None);
}

#[test]
fn test_snapshot_file_layout() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = open(&dir);
    store.add_to_cart(CartItem::new("1", dec("2"), ProductUnit::Kg));

    let path = dir.path().join(format!("{DEFAULT_KEY}.json"));
    let raw = fs::read_to_string(&path).expect("snapshot written");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("snapshot is JSON");

    assert_eq!(json["version"], 0);
    assert_eq!(json["state"]["isAuthenticated"], false);
    assert_eq!(json["state"]["cart"][0]["productId"], "1");
    assert!(json["state"].get("searchQuery").is_none());
}

#[test]
fn test_malformed_snapshot_starts_empty() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join(format!("{DEFAULT_KEY}.json")), "{\"state\": [").expect("write");

    let mut store = open(&dir);
    assert!(store.cart().is_empty());
    assert!(store.orders().is_empty());

    // The next mutation overwrites the bad snapshot.
    store.add_to_cart(CartItem::new("1", dec("1"), ProductUnit::Kg));
    assert_eq!(open(&dir).cart().len(), 1);
}

#[test]
fn test_orders_and_status_survive_restart() {
    let dir = TempDir::new().expect("temp dir");
    let catalog = vec![product("1", "120"), product("2", "80")];

    let order_id = {
        let mut store = open(&dir);
        store.add_to_cart(CartItem::new("1", dec("1.5"), ProductUnit::Kg));
        store.add_to_cart(CartItem::new("2", dec("2"), ProductUnit::Kg));
        let order = store
            .place_order(
                Checkout {
                    delivery_address: "Moscow, Arbat, 25".to_string(),
                    delivery_method: DeliveryMethod::Delivery,
                    payment_method: PaymentMethod::Card,
                },
                &catalog,
            )
            .expect("cart not empty");
        assert_eq!(order.total, dec("340"));
        store.advance_order(&order.id).expect("pending -> confirmed");
        order.id
    };

    let store = open(&dir);
    assert!(store.cart().is_empty());
    let orders = store.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order_id);
    assert_eq!(orders[0].status, OrderStatus::Confirmed);
    assert_eq!(orders[0].total, dec("340"));
}

#[test]
fn test_keys_are_isolated() {
    let dir = TempDir::new().expect("temp dir");

    let mut a = Store::load_with_key(FileStorage::new(dir.path()), "profile-a");
    a.add_to_cart(CartItem::new("1", dec("1"), ProductUnit::Kg));

    let b = Store::load_with_key(FileStorage::new(dir.path()), "profile-b");
    assert!(b.cart().is_empty());
    assert_eq!(
        Store::load_with_key(FileStorage::new(dir.path()), "profile-a")
            .cart()
            .len(),
        1
    );
}

#[test]
fn test_reset_removes_snapshot() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = open(&dir);
    store.add_to_cart(CartItem::new("1", dec("1"), ProductUnit::Kg));

    store.reset().expect("reset");
    assert!(store.cart().is_empty());
    assert_eq!(
        store.storage().read(DEFAULT_KEY).expect("readable"),
        None
    );
    // Resetting twice is fine.
    store.reset().expect("second reset");
}

#[test]
fn test_unwritable_dir_does_not_block_mutations() {
    let dir = TempDir::new().expect("temp dir");
    // A file where the state directory should be.
    let blocker = dir.path().join("state");
    fs::write(&blocker, "").expect("write");

    let mut store = Store::load(FileStorage::new(&blocker));
    store.add_to_cart(CartItem::new("1", dec("1"), ProductUnit::Kg));

    assert_eq!(store.cart().len(), 1);
    assert!(store.save().is_err());
}
