use alpha_auth_api::{Application, Config};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let app = Application::build(config).await?;
    let running = app.start().await?;

    info!(
        "Alpha Auth API listening on {} (stops on SIGINT/SIGTERM)",
        running.local_addr()
    );

    running.wait().await?;

    info!("Alpha Auth API shutdown complete");
    Ok(())
}
