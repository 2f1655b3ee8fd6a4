use xpoll_store::DatabaseConfig;
use xpoll_store::db;

#[macro_use]
extern crate tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "INFO");
        }
    }
    // initialize tracing
    tracing_subscriber::fmt::init();

    let config = DatabaseConfig::from_env()?;

    // opens the pool and creates any missing tables and views
    let pool = db::init_db(&config).await?;
    info!("{}", db::get_pool_stats(&pool));

    pool.close().await;
    Ok(())
}
