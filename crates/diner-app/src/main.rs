use diner_hex::application::dish_service::DishService;
use diner_hex::application::order_service::OrderService;
use diner_hex::config::Config;
use diner_hex::inbound::http::{HttpServer, HttpServerConfig};
use diner_repo::{build_repo, Repo};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for DATABASE_URL / SERVER_PORT / RUST_LOG when present.
    let _ = dotenvy::dotenv();
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter.as_str())
        .init();

    let repo: Repo = build_repo(config.database_url.as_deref()).await?;
    let dishes = DishService::new(repo.clone());
    let orders = OrderService::new(repo.clone(), repo);

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
    };
    tracing::info!(port = %server_cfg.port, "diner backend configured");

    let http = HttpServer::new(dishes, orders, server_cfg).await?;
    http.run().await
}
