pub mod bot;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod logging;
pub mod util;

use anyhow::{anyhow, Result};
use axum::{routing::get, Router};

use crate::bot::user_store::UserStore;

async fn index() -> &'static str {
    "Syntoo's NEPSE BOT"
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install the default crypto provider"))?;

    // 使用者名冊由這裡建立後傳入輪詢迴圈，模組內不持有全域狀態
    let store = UserStore::new();
    tokio::spawn(async move {
        bot::handler::polling_loop(&store).await;
    });

    logging::info_file_async("NEPSE bot started".to_string());

    let app = Router::new().route("/", get(index));
    let addr = format!("0.0.0.0:{}", config::SETTINGS.system.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
