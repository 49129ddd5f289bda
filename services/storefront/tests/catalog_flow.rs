mod common;

use common::{app, app_on, sample_products, FlakyStore};
use markethub_core::domain::{Category, Product, ProductDraft};
use markethub_core::ports::KeyValueStoreExt;
use std::sync::Arc;
use std::time::Duration;
use storefront_lib::keys;
use storefront_lib::stores::admin::LOAD_FAILURE;
use storefront_lib::stores::Catalog;
use storefront_lib::ClientError;

fn fixtures() -> Vec<Product> {
    serde_json::from_value(sample_products()).unwrap()
}

#[tokio::test]
async fn listing_degrades_to_cached_and_local_products() {
    let (app, api) = app().await;

    let online = app.catalog.products().await;
    assert_eq!(online.len(), 2);
    let cached: Vec<Product> = app.storage.load_json(keys::PRODUCTS_CACHE).unwrap().unwrap();
    assert_eq!(cached, online);

    let added = app
        .catalog
        .add_local_product(ProductDraft {
            title: "Standing Desk".to_string(),
            price: 349.0,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(added.category, "electronics");

    api.go_offline();
    let offline = app.catalog.products().await;
    let ids: Vec<u64> = offline.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, added.id]);

    app.shutdown().await;
}

#[tokio::test]
async fn local_product_needs_title_and_price() {
    let (app, _api) = app().await;

    let err = app
        .catalog
        .add_local_product(ProductDraft { title: " ".to_string(), price: 5.0, ..Default::default() })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    let err = app
        .catalog
        .add_local_product(ProductDraft { title: "Lamp".to_string(), price: f64::NAN, ..Default::default() })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(app.catalog.local_products().is_empty());

    app.shutdown().await;
}

#[tokio::test]
async fn simulated_post_lands_in_the_crud_mirror() {
    let (app, _api) = app().await;

    app.catalog
        .add_local_product(ProductDraft { title: "Lamp".to_string(), price: 20.0, ..Default::default() })
        .await
        .unwrap();

    let mirror = app.catalog.crud().snapshot();
    assert_eq!(mirror.items.len(), 1);
    assert_eq!(mirror.items[0].id, 195);
    assert_eq!(mirror.error, None);

    app.shutdown().await;
}

#[tokio::test]
async fn crud_records_one_error_and_clears_it_on_success() {
    let (app, _api) = app().await;
    let crud = app.catalog.crud();

    crud.fetch_all().await.unwrap();
    assert_eq!(crud.snapshot().items.len(), 2);
    assert!(!crud.snapshot().loading);

    assert!(crud.delete(404).await.is_err());
    let failed = crud.snapshot();
    assert_eq!(failed.error.as_deref(), Some("Failed to delete item"));
    assert_eq!(failed.items.len(), 2);

    let mut edited = failed.items[0].clone();
    edited.price = 1.0;
    crud.update_item(edited.id, &edited).await.unwrap();
    let updated = crud.snapshot();
    assert_eq!(updated.error, None);
    assert_eq!(updated.items[0].title, "Essence Mascara Lash Princess (updated)");
    assert_eq!(updated.items[0].price, 1.0);

    crud.delete(2).await.unwrap();
    assert_eq!(crud.snapshot().items.len(), 1);

    app.shutdown().await;
}

#[tokio::test]
async fn crud_fetch_failure_keeps_previous_items() {
    let (app, api) = app().await;
    let crud = app.catalog.crud();

    crud.fetch_all().await.unwrap();
    api.go_offline();
    assert!(crud.fetch_all().await.is_err());

    let state = crud.snapshot();
    assert_eq!(state.error.as_deref(), Some("Failed to fetch data"));
    assert_eq!(state.items.len(), 2);

    app.shutdown().await;
}

#[test]
fn title_search_is_case_insensitive() {
    let products = fixtures();
    let hits = Catalog::search(&products, "MASCARA");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 1);
    assert_eq!(Catalog::search(&products, "").len(), 2);
}

#[tokio::test]
async fn admin_directory_loads_edits_and_filters() {
    let (app, api) = app().await;
    let admin = &app.admin;

    admin.load().await.unwrap();
    let state = admin.snapshot();
    assert_eq!(state.users.len(), 2);
    assert_eq!(state.products.len(), 2);
    assert_eq!(state.categories.len(), 3);

    assert_eq!(admin.filtered_users("michael will").len(), 1);
    assert_eq!(admin.filtered_products("FURNITURE").len(), 1);

    let category = admin.save_category(
        None,
        Category { id: 0, name: "Garden".to_string(), description: String::new(), count: 9 },
    );
    assert_eq!(category.count, 0);
    assert_eq!(admin.filtered_categories("gard").len(), 1);

    let mut emily = state.users[0].clone();
    emily.first_name = "Em".to_string();
    admin.save_user(Some(emily.id), emily);
    assert_eq!(admin.snapshot().users[0].first_name, "Em");
    assert!(admin.delete_user(2));
    assert!(!admin.delete_user(2));
    assert!(admin.delete_product(1));
    assert!(admin.delete_category(category.id));

    api.go_offline();
    assert!(admin.load().await.is_err());
    let state = admin.snapshot();
    assert_eq!(state.error.as_deref(), Some(LOAD_FAILURE));
    assert_eq!(state.users.len(), 1);

    app.shutdown().await;
}

#[tokio::test]
async fn badges_follow_cart_and_wishlist_writes() {
    let (app, _api) = app().await;
    let mut badges = app.badges();
    let products = fixtures();

    app.cart.add_to_cart(&products[0]).unwrap();
    app.cart.add_to_cart(&products[0]).unwrap();
    app.cart.toggle_wishlist(&products[1]).unwrap();

    let counts = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            badges.changed().await.unwrap();
            let counts = *badges.borrow_and_update();
            if counts.wishlist == 1 {
                return counts;
            }
        }
    })
    .await
    .expect("badge update");
    assert_eq!(counts.cart_lines, 1);
    assert_eq!(counts.cart_units, 2);
    assert!((app.cart.subtotal() - 19.98).abs() < 1e-9);

    app.shutdown().await;
}

#[tokio::test]
async fn cart_is_unchanged_when_storage_rejects_the_write() {
    let storage = Arc::new(FlakyStore::default());
    let (app, _api) = app_on(storage.clone()).await;
    let products = fixtures();
    app.cart.add_to_cart(&products[0]).unwrap();

    storage.fail_writes_to(keys::CART);
    storage.fail_writes_to(keys::WISHLIST);
    let mut toasts = app.toasts.subscribe();

    assert!(app.cart.add_to_cart(&products[0]).is_err());
    assert!(app.cart.add_to_cart(&products[1]).is_err());
    assert!(app.cart.remove_from_cart(products[0].id).is_err());
    assert!(app.cart.toggle_wishlist(&products[1]).is_err());

    let items = app.cart.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 1);
    assert!(app.cart.wishlist().is_empty());
    assert!(toasts.try_recv().is_err());

    storage.heal();
    app.cart.add_to_cart(&products[0]).unwrap();
    assert_eq!(app.cart.items()[0].quantity, 2);

    app.shutdown().await;
}
