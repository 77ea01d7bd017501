use opensase_cart::{CartAction, CartState, CartStorage, CartStore, MemoryStorage, PersistenceSync, Product, Variant};
use rust_decimal::Decimal;

fn mounted(storage: &MemoryStorage) -> CartStore {
    let mut store = CartStore::new();
    PersistenceSync::attach(storage.clone(), "cart", &mut store);
    store
}

#[test]
fn test_checkout_scenario() {
    let storage = MemoryStorage::new();
    let mut store = mounted(&storage);
    let product_a = Product::new("A", "Product A", 5000);

    store.initialize_location("victoria-island");
    store.add_item(product_a.clone(), 2, None);
    store.add_item(product_a, 1, None);
    let state = store.state();
    assert_eq!(state.line_count(), 1);
    assert_eq!(state.items()[0].quantity, 3);
    assert_eq!(state.total(), Decimal::new(15000, 0));
    assert_eq!(state.item_count(), 3);

    let id = state.items()[0].cart_item_id.clone();
    store.update_quantity(id, 0);
    assert!(store.state().is_empty());
    assert_eq!(store.state().total(), Decimal::ZERO);
    assert_eq!(store.state().item_count(), 0);

    let saved = CartState::from_json(&storage.read("cart").unwrap().unwrap()).unwrap();
    assert_eq!(&saved, store.state().as_ref());
}

#[test]
fn test_variant_fallback_price() {
    let mut store = CartStore::new();
    let product = Product::new("shawarma", "Shawarma", 99)
        .with_variant(Variant::new("V1", "Single", 10))
        .with_variant(Variant::new("V2", "Double", 15));
    store.add_item(product, 1, None);
    assert_eq!(store.total_price(), Decimal::new(10, 0));
    assert_eq!(store.state().items()[0].unit_price(), Decimal::new(10, 0));
}

#[test]
fn test_clear_preserves_context() {
    let mut store = CartStore::new();
    store.set_location_id("lekki");
    store.toggle_open();
    store.add_item(Product::new("A", "Product A", 5000), 2, None);
    store.clear();
    assert!(store.state().is_empty());
    assert_eq!(store.state().total(), Decimal::ZERO);
    assert_eq!(store.state().location_id(), Some("lekki"));
    assert!(store.state().is_open());
}

#[test]
fn test_session_survives_remount() {
    let storage = MemoryStorage::new();
    let expected = {
        let mut store = mounted(&storage);
        store.set_location_id("ikeja");
        store.add_item(Product::new("chapman", "Chapman", "1800"), 2, None);
        store.update_global_comment("deliver to gate 2");
        store.dispatch(CartAction::ToggleCart);
        CartState::clone(store.state())
    };

    let store = mounted(&storage);
    assert_eq!(store.state().as_ref(), &expected);
    assert_eq!(store.state().total(), Decimal::new(3600, 0));
}

#[test]
fn test_corrupted_storage_starts_empty() {
    let storage = MemoryStorage::new();
    storage.write("cart", "\u{0}not json").unwrap();
    let mut store = mounted(&storage);
    assert_eq!(store.state().as_ref(), &CartState::default());
    assert_eq!(storage.read("cart").unwrap(), None);

    store.add_item(Product::new("A", "Product A", 5000), 1, None);
    assert!(storage.read("cart").unwrap().is_some());
}
