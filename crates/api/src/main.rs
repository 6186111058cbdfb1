use anyhow::Context;
use userhub_infra::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("invalid configuration")?;
    userhub_observability::init_with_default(settings.default_log_filter());

    if settings.uses_default_secret() {
        tracing::warn!("SECRET_KEY not set; using insecure dev default");
    }
    tracing::info!(
        environment = settings.environment.as_str(),
        store = settings.store_kind(),
        debug = settings.debug,
        "starting userhub-api"
    );

    let bind_addr = settings.bind_addr;
    let services = userhub_api::app::services::build_services(settings)
        .await
        .context("failed to initialize user store")?;
    let app = userhub_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
