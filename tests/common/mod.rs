#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use vitrin::models::{Product, ProductDraft, SizeDraft};
use vitrin::store::Store;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    pub store: Store,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_pool(memory_pool().await).await
    }

    /// The router and `self.store` share one `Store`, and with it one writer lock.
    pub async fn with_pool(pool: SqlitePool) -> Self {
        let store = Store::new(pool.clone());
        let router = vitrin::build_app_with_store(store.clone(), false)
            .await
            .expect("Failed to build app");

        Self {
            router,
            db: pool,
            store,
        }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Send a GET request with an optional session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a POST form request with an optional session cookie.
    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }

    /// Add a product straight through the store with the given sizes.
    pub async fn create_product(&self, name: &str, sizes: &[(&str, i64)]) -> Product {
        let draft = ProductDraft {
            name: name.to_string(),
            image: "http://x/y.png".to_string(),
            price: "100".to_string(),
            sizes: sizes
                .iter()
                .map(|(size, stock)| SizeDraft {
                    name: size.to_string(),
                    stock: stock.to_string(),
                })
                .collect(),
        };
        let new_product = draft.validate().expect("Test product should be valid");
        self.store
            .add_product(new_product)
            .await
            .expect("Failed to create test product")
    }

    /// Current stock of `size` on the stored product `product_id`.
    pub async fn stock_of(&self, product_id: &str, size: &str) -> i64 {
        let product = self
            .store
            .find_product(product_id)
            .await
            .unwrap()
            .expect("Product should exist");
        product
            .sizes
            .iter()
            .find(|s| s.name == size)
            .expect("Size should exist")
            .stock
    }
}

/// A fresh in-memory database with migrations applied.
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// A migrated database file under the temp dir, opened with several
/// connections so transactions can actually overlap.
pub async fn file_pool(name: &str) -> SqlitePool {
    let path = std::env::temp_dir().join(format!("vitrin-{}-{}.db", std::process::id(), name));
    for suffix in ["", "-wal", "-shm"] {
        std::fs::remove_file(format!("{}{}", path.display(), suffix)).ok();
    }

    vitrin::db::init_pool(&format!("sqlite:{}", path.display()))
        .await
        .expect("Failed to create file-backed SQLite pool")
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    String::from_utf8(body_bytes(resp).await).unwrap()
}

pub async fn body_bytes(resp: Response) -> Vec<u8> {
    resp.into_body().collect().await.unwrap().to_bytes().to_vec()
}

/// Return the session cookie set by a response, if any.
pub fn session_cookie(resp: &Response) -> Option<String> {
    resp.headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Assert that a response is a redirect to the given location.
pub fn assert_redirect(resp: &Response, expected_location: &str) {
    assert!(
        resp.status().is_redirection(),
        "Expected redirect, got {}",
        resp.status()
    );
    let location = resp
        .headers()
        .get("location")
        .expect("Redirect should have location header")
        .to_str()
        .unwrap();
    assert_eq!(location, expected_location);
}
