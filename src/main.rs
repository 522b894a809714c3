use clap::Parser;
use tokio::net::TcpListener;

use vitrin::cli::{self, Cli, Command};
use vitrin::{build_app_with_store, config::Config, db, store::Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let pool = db::init_pool(&config.database_url).await?;
    let store = Store::new(pool.clone());

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app = build_app_with_store(store, config.secure_cookies).await?;
            let listener = TcpListener::bind(config.bind_addr).await?;

            tracing::info!("listening on {}", config.bind_addr);
            axum::serve(listener, app).await?;
        }
        Command::Import { collection, file } => {
            cli::import_collection(&store, collection, &file).await?;
        }
        Command::ExportOrders { file } => cli::export_orders(&pool, &file).await?,
    }

    Ok(())
}
