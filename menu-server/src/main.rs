use menu_server::{Config, Server, ServerState, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment first: .env is optional in production
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger(&config.log_level, config.log_dir.as_deref());

    tracing::info!("Menu server starting...");

    let state = ServerState::initialize(&config).await?;
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        return Err(e);
    }

    Ok(())
}
