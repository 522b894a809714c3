use clap::{Parser, Subcommand, ValueEnum};
use sqlx::SqlitePool;
use std::fs;

use crate::export::{EXPORT_FILENAME, orders_workbook};
use crate::models::{Order, Product};
use crate::store::{ORDERS_KEY, PRODUCTS_KEY, Store};

/// Storefront server and data tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the web server (default)
    Serve,
    /// Import a JSON array of products or orders, skipping known ids
    Import {
        collection: Collection,
        file: String,
    },
    /// Write the order log to an .xlsx file
    ExportOrders {
        #[arg(default_value = EXPORT_FILENAME)]
        file: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Products,
    Orders,
}

impl Collection {
    /// Storage key the collection lives under.
    pub fn key(self) -> &'static str {
        match self {
            Collection::Products => PRODUCTS_KEY,
            Collection::Orders => ORDERS_KEY,
        }
    }
}

/// Imports a JSON array of products or orders, such as the value of the
/// `products`/`orders` key copied out of a browser's local storage.
///
/// Records whose id is already stored, or that repeat an id earlier in the
/// same file, are skipped. Returns the number of records added.
pub async fn import_collection(
    store: &Store,
    collection: Collection,
    file_path: &str,
) -> Result<usize, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file_path)?;

    let imported = match collection {
        Collection::Products => {
            let incoming: Vec<Product> = serde_json::from_str(&content)?;
            store.import_products(incoming).await?
        }
        Collection::Orders => {
            let incoming: Vec<Order> = serde_json::from_str(&content)?;
            store.import_orders(incoming).await?
        }
    };

    println!("Imported {} {}", imported, collection.key());
    Ok(imported)
}

/// Writes the full order log to an `.xlsx` file.
pub async fn export_orders(
    pool: &SqlitePool,
    file_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::new(pool.clone());
    let orders = store.load_orders().await?;
    let bytes = orders_workbook(&orders)?;
    fs::write(file_path, bytes)?;

    println!("Exported {} orders to {}", orders.len(), file_path);
    Ok(())
}
