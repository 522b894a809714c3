use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{SqliteExecutor, SqlitePool};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{NewProduct, Order, Product};

pub const PRODUCTS_KEY: &str = "products";
pub const ORDERS_KEY: &str = "orders";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A stored collection is not the JSON array it should be.
    #[error("stored `{key}` collection is malformed: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode collection: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("no timestamp id left after `{0}`")]
    IdsExhausted(i64),
    #[error("product not found")]
    ProductNotFound,
    #[error("size not offered for this product")]
    UnknownSize,
    #[error("size is out of stock")]
    OutOfStock,
}

/// The `products` and `orders` collections, each kept as one JSON array in
/// the `kv_store` table.
///
/// Reads go straight to the pool. Every write takes the writer lock and runs
/// in a transaction, so two read-modify-write cycles never interleave.
#[derive(Clone)]
pub struct Store {
    db: SqlitePool,
    writer: Arc<Mutex<()>>,
}

impl Store {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    pub async fn load_products(&self) -> Result<Vec<Product>, StoreError> {
        read_collection(&self.db, PRODUCTS_KEY).await
    }

    pub async fn find_product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let products = self.load_products().await?;
        Ok(products.into_iter().find(|p| p.id == id))
    }

    /// Replaces the whole `products` collection.
    pub async fn save_products(&self, products: &[Product]) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;
        let mut tx = self.db.begin().await?;
        write_collection(&mut *tx, PRODUCTS_KEY, products).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Assigns a fresh id to `new_product` and appends it to `products`.
    pub async fn add_product(&self, new_product: NewProduct) -> Result<Product, StoreError> {
        let _guard = self.writer.lock().await;
        let mut tx = self.db.begin().await?;

        let mut products: Vec<Product> = read_collection(&mut *tx, PRODUCTS_KEY).await?;
        let id = next_id(products.iter().map(|p| p.id.as_str()), Utc::now())?;
        let product = new_product.into_product(id);
        products.push(product.clone());
        write_collection(&mut *tx, PRODUCTS_KEY, &products).await?;

        tx.commit().await?;
        tracing::info!(product_id = %product.id, name = %product.name, "product added");
        Ok(product)
    }

    pub async fn load_orders(&self) -> Result<Vec<Order>, StoreError> {
        read_collection(&self.db, ORDERS_KEY).await
    }

    /// Appends an already-built order to the log, leaving stock alone.
    pub async fn append_order(&self, order: Order) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;
        let mut tx = self.db.begin().await?;

        let mut orders: Vec<Order> = read_collection(&mut *tx, ORDERS_KEY).await?;
        orders.push(order);
        write_collection(&mut *tx, ORDERS_KEY, &orders).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Appends the products whose ids are not stored yet, in one write.
    /// Returns how many were added; repeated ids within `incoming` count once.
    pub async fn import_products(&self, incoming: Vec<Product>) -> Result<usize, StoreError> {
        let _guard = self.writer.lock().await;
        let mut tx = self.db.begin().await?;

        let mut products: Vec<Product> = read_collection(&mut *tx, PRODUCTS_KEY).await?;
        let added = merge_new(&mut products, incoming, |p| p.id.clone());
        if added > 0 {
            write_collection(&mut *tx, PRODUCTS_KEY, &products).await?;
        }

        tx.commit().await?;
        tracing::info!(added, "products imported");
        Ok(added)
    }

    /// Same as [`Store::import_products`] for the order log. Stock is not touched.
    pub async fn import_orders(&self, incoming: Vec<Order>) -> Result<usize, StoreError> {
        let _guard = self.writer.lock().await;
        let mut tx = self.db.begin().await?;

        let mut orders: Vec<Order> = read_collection(&mut *tx, ORDERS_KEY).await?;
        let added = merge_new(&mut orders, incoming, |o| o.id.clone());
        if added > 0 {
            write_collection(&mut *tx, ORDERS_KEY, &orders).await?;
        }

        tx.commit().await?;
        tracing::info!(added, "orders imported");
        Ok(added)
    }

    /// Records an order for one unit of `size` and takes that unit out of
    /// stock. Both collections are written in the same transaction.
    ///
    /// Stock never goes below zero: ordering a size with no stock left fails
    /// with [`StoreError::OutOfStock`] and changes nothing.
    pub async fn place_order(
        &self,
        product_id: &str,
        size: &str,
        instagram_username: &str,
    ) -> Result<Order, StoreError> {
        let _guard = self.writer.lock().await;
        let mut tx = self.db.begin().await?;

        let mut products: Vec<Product> = read_collection(&mut *tx, PRODUCTS_KEY).await?;
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or(StoreError::ProductNotFound)?;
        let entry = product
            .sizes
            .iter_mut()
            .find(|s| s.name == size)
            .ok_or(StoreError::UnknownSize)?;
        if entry.stock <= 0 {
            return Err(StoreError::OutOfStock);
        }
        entry.stock -= 1;

        let mut orders: Vec<Order> = read_collection(&mut *tx, ORDERS_KEY).await?;
        let now = Utc::now();
        let id = next_id(orders.iter().map(|o| o.id.as_str()), now)?;
        let order = Order::new(
            id,
            product,
            size.to_string(),
            instagram_username.to_string(),
            now,
        );
        orders.push(order.clone());

        write_collection(&mut *tx, ORDERS_KEY, &orders).await?;
        write_collection(&mut *tx, PRODUCTS_KEY, &products).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            product_id = %order.product_id,
            size = %order.size,
            "order placed"
        );
        Ok(order)
    }
}

/// Timestamp id in milliseconds, bumped past the newest existing numeric id
/// so it never repeats one already in the collection.
pub fn next_id<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    now: DateTime<Utc>,
) -> Result<String, StoreError> {
    let now_millis = now.timestamp_millis();
    let newest = existing
        .into_iter()
        .filter_map(|id| id.parse::<i64>().ok())
        .max();

    match newest {
        Some(newest) if newest >= now_millis => newest
            .checked_add(1)
            .map(|id| id.to_string())
            .ok_or(StoreError::IdsExhausted(newest)),
        _ => Ok(now_millis.to_string()),
    }
}

fn merge_new<T>(existing: &mut Vec<T>, incoming: Vec<T>, id: impl Fn(&T) -> String) -> usize {
    let mut known: HashSet<String> = existing.iter().map(&id).collect();
    let before = existing.len();
    existing.extend(incoming.into_iter().filter(|item| known.insert(id(item))));
    existing.len() - before
}

async fn read_collection<'e, E, T>(executor: E, key: &'static str) -> Result<Vec<T>, StoreError>
where
    E: SqliteExecutor<'e>,
    T: DeserializeOwned,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
        .bind(key)
        .fetch_optional(executor)
        .await?;

    match row {
        Some((value,)) => {
            serde_json::from_str(&value).map_err(|source| StoreError::Corrupt { key, source })
        }
        None => Ok(Vec::new()),
    }
}

async fn write_collection<'e, E, T>(executor: E, key: &str, items: &[T]) -> Result<(), StoreError>
where
    E: SqliteExecutor<'e>,
    T: Serialize,
{
    let value = serde_json::to_string(items).map_err(StoreError::Encode)?;
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(&value)
    .bind(&now)
    .execute(executor)
    .await?;

    Ok(())
}
