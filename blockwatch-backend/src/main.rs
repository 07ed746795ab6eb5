use anyhow::Context;
use blockwatch_backend::{AppState, config::Config, create_app};
use blockwatch_core::{
    IdentityCache, MojangLookup, RconClient, RconCollector, Save, SaveCollector, SharedVersion,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    // RUST_LOG wins over LOG_LEVEL when set
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    tracing::info!("Starting blockwatch...");
    tracing::info!(
        "Configuration: port={}, world_dir={}, server_type={}, dynmap={}, rcon={}, timeout={}s",
        config.port,
        config.world_dir.display(),
        config.server_type,
        config.dynmap_enabled,
        config.rcon_enabled,
        config.request_timeout.as_secs()
    );

    let version = SharedVersion::new();

    let save = Save::new(&config.world_dir).context("failed to open world directory")?;
    let lookup = MojangLookup::new(&config.profile_lookup_url, config.profile_lookup_timeout)?;
    let save = SaveCollector::new(
        save,
        IdentityCache::new(lookup, config.uuid_cache_ttl),
        version.clone(),
    );

    let rcon = if config.rcon_enabled {
        let client = RconClient::new(
            &config.rcon_host,
            config.rcon_port,
            &config.rcon_password,
            version,
        )
        .context("failed to create rcon client")?
        .with_timeout(config.rcon_timeout);
        tracing::info!("RCON enabled for {}", client.addr());
        Some(RconCollector::new(
            client,
            config.server_type,
            config.dynmap_enabled,
        ))
    } else {
        None
    };

    let state = Arc::new(AppState { rcon, save });
    let app = create_app(Arc::clone(&state), config.request_timeout);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    if let Some(rcon) = &state.rcon {
        rcon.close().await;
    }
    tracing::info!("Shut down");
    Ok(())
}
