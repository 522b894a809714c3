mod common;

use axum::http::StatusCode;
use common::{TestApp, assert_redirect, body_string, session_cookie};

#[tokio::test]
async fn catalog_shows_products_with_sizes_and_price() {
    let app = TestApp::new().await;
    app.create_product("Tee", &[("M", 2), ("L", 0)]).await;

    let resp = app.get("/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;

    assert!(html.contains("Tee"));
    assert!(html.contains("100 ₺"));
    assert!(html.contains("M (2)"));
    assert!(html.contains("L (0)"));
    assert!(html.contains("Sipariş Ver"));
    assert!(!html.contains("Beden Seçin"));
}

#[tokio::test]
async fn empty_catalog_says_so() {
    let app = TestApp::new().await;
    let html = body_string(app.get("/", None).await).await;
    assert!(html.contains("Henüz ürün yok."));
}

#[tokio::test]
async fn ordering_shows_size_selector_with_sold_out_sizes_disabled() {
    let app = TestApp::new().await;
    let product = app.create_product("Tee", &[("M", 2), ("L", 0)]).await;

    let resp = app
        .post_form(&format!("/products/{}/order", product.id), "", None)
        .await;
    assert_redirect(&resp, "/");
    let cookie = session_cookie(&resp).expect("Ordering state should live in the session");

    let html = body_string(app.get("/", Some(&cookie)).await).await;
    assert!(html.contains("Beden Seçin"));
    assert!(html.contains("<option value=\"M\">M (2 adet)</option>"));
    assert!(html.contains("<option value=\"L\" disabled>L (0 adet)</option>"));
    assert!(html.contains("Onayla"));
    assert!(html.contains("İptal"));

    // Another visitor is still browsing
    let html = body_string(app.get("/", None).await).await;
    assert!(!html.contains("Beden Seçin"));
}

#[tokio::test]
async fn cancel_returns_to_browsing() {
    let app = TestApp::new().await;
    let product = app.create_product("Tee", &[("M", 2)]).await;

    let resp = app
        .post_form(&format!("/products/{}/order", product.id), "", None)
        .await;
    let cookie = session_cookie(&resp).unwrap();

    let resp = app
        .post_form(
            &format!("/products/{}/order/cancel", product.id),
            "size=M&instagram_username=alice",
            Some(&cookie),
        )
        .await;
    assert_redirect(&resp, "/");

    let html = body_string(app.get("/", Some(&cookie)).await).await;
    assert!(html.contains("Sipariş Ver"));
    assert!(!html.contains("Beden Seçin"));
    assert!(app.store.load_orders().await.unwrap().is_empty());
    assert_eq!(app.stock_of(&product.id, "M").await, 2);
}

#[tokio::test]
async fn confirm_without_handle_changes_nothing() {
    let app = TestApp::new().await;
    let product = app.create_product("Tee", &[("M", 2)]).await;

    let resp = app
        .post_form(&format!("/products/{}/order", product.id), "", None)
        .await;
    let cookie = session_cookie(&resp).unwrap();

    let resp = app
        .post_form(
            &format!("/products/{}/order/confirm", product.id),
            "size=M&instagram_username=",
            Some(&cookie),
        )
        .await;
    assert_redirect(&resp, "/");

    assert!(app.store.load_orders().await.unwrap().is_empty());
    assert_eq!(app.stock_of(&product.id, "M").await, 2);

    let html = body_string(app.get("/", Some(&cookie)).await).await;
    assert!(html.contains("Lütfen beden ve Instagram kullanıcı adınızı giriniz"));
    // Still ordering, with the chosen size kept
    assert!(html.contains("<option value=\"M\" selected>M (2 adet)</option>"));
}

#[tokio::test]
async fn confirm_without_size_changes_nothing() {
    let app = TestApp::new().await;
    let product = app.create_product("Tee", &[("M", 2)]).await;

    let resp = app
        .post_form(
            &format!("/products/{}/order/confirm", product.id),
            "size=&instagram_username=alice",
            None,
        )
        .await;
    assert_redirect(&resp, "/");
    let cookie = session_cookie(&resp).unwrap();

    assert!(app.store.load_orders().await.unwrap().is_empty());
    assert_eq!(app.stock_of(&product.id, "M").await, 2);

    let html = body_string(app.get("/", Some(&cookie)).await).await;
    assert!(html.contains("Lütfen beden ve Instagram kullanıcı adınızı giriniz"));
    assert!(html.contains("value=\"alice\""));
}

#[tokio::test]
async fn confirm_records_order_and_decrements_stock() {
    let app = TestApp::new().await;
    let product = app.create_product("Tee", &[("S", 5), ("M", 2)]).await;
    let other = app.create_product("Hoodie", &[("M", 3)]).await;

    let resp = app
        .post_form(&format!("/products/{}/order", product.id), "", None)
        .await;
    let cookie = session_cookie(&resp).unwrap();

    let resp = app
        .post_form(
            &format!("/products/{}/order/confirm", product.id),
            "size=M&instagram_username=alice",
            Some(&cookie),
        )
        .await;
    assert_redirect(&resp, "/");

    let orders = app.store.load_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].product_id, product.id);
    assert_eq!(orders[0].product_name, "Tee");
    assert_eq!(orders[0].size, "M");
    assert_eq!(orders[0].instagram_username, "alice");
    assert!(orders[0].order_date.ends_with('Z'));

    assert_eq!(app.stock_of(&product.id, "M").await, 1);
    assert_eq!(app.stock_of(&product.id, "S").await, 5);
    assert_eq!(app.stock_of(&other.id, "M").await, 3);

    let html = body_string(app.get("/", Some(&cookie)).await).await;
    assert!(html.contains("Siparişiniz alınmıştır!"));
    assert!(html.contains("M (1)"));
    assert!(!html.contains("Beden Seçin"));
}

#[tokio::test]
async fn last_unit_can_be_ordered_once() {
    let app = TestApp::new().await;
    let product = app.create_product("Tee", &[("M", 1)]).await;
    let confirm = format!("/products/{}/order/confirm", product.id);

    let resp = app
        .post_form(&confirm, "size=M&instagram_username=alice", None)
        .await;
    assert_redirect(&resp, "/");
    assert_eq!(app.stock_of(&product.id, "M").await, 0);

    let resp = app
        .post_form(&confirm, "size=M&instagram_username=bob", None)
        .await;
    assert_redirect(&resp, "/");
    let cookie = session_cookie(&resp).unwrap();

    assert_eq!(app.stock_of(&product.id, "M").await, 0);
    assert_eq!(app.store.load_orders().await.unwrap().len(), 1);

    let html = body_string(app.get("/", Some(&cookie)).await).await;
    assert!(html.contains("Seçtiğiniz beden tükendi"));
    assert!(html.contains("value=\"bob\""));
}

#[tokio::test]
async fn size_not_on_product_is_rejected() {
    let app = TestApp::new().await;
    let product = app.create_product("Tee", &[("M", 1)]).await;

    let resp = app
        .post_form(
            &format!("/products/{}/order/confirm", product.id),
            "size=XXL&instagram_username=alice",
            None,
        )
        .await;
    let cookie = session_cookie(&resp).unwrap();

    assert!(app.store.load_orders().await.unwrap().is_empty());
    let html = body_string(app.get("/", Some(&cookie)).await).await;
    assert!(html.contains("Seçtiğiniz beden bu üründe bulunmuyor"));
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let app = TestApp::new().await;

    let resp = app.post_form("/products/nope/order", "", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .post_form(
            "/products/nope/order/confirm",
            "size=M&instagram_username=alice",
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_to_buyer_end_to_end() {
    let app = TestApp::new().await;
    assert!(app.store.load_products().await.unwrap().is_empty());

    let body = "name=Tee&image=http%3A%2F%2Fx%2Fy.png&price=100&size_name=M&size_stock=2&action=save";
    app.post_form("/admin/products", body, None).await;

    let products = app.store.load_products().await.unwrap();
    assert_eq!(products.len(), 1);
    let tee = &products[0];
    assert!(!tee.id.is_empty());
    assert_eq!(tee.name, "Tee");
    assert_eq!(tee.price, 100.0);

    let resp = app
        .post_form(&format!("/products/{}/order", tee.id), "", None)
        .await;
    let cookie = session_cookie(&resp).unwrap();
    app.post_form(
        &format!("/products/{}/order/confirm", tee.id),
        "size=M&instagram_username=alice",
        Some(&cookie),
    )
    .await;

    let orders = app.store.load_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].size, "M");
    assert_eq!(orders[0].instagram_username, "alice");
    assert_eq!(app.stock_of(&tee.id, "M").await, 1);
}
