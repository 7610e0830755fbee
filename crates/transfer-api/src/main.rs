use transfer_core::Config;

// Use mimalloc as the global allocator, matching the container deployment target.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    transfer_api::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Initialize the application (renderer, mail transport, routes)
    let (_state, router) = transfer_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    transfer_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
