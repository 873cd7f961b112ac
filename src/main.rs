use anyhow::Context;
use kniga_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Kniga settings")?;
    kniga_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        host = %settings.server.host,
        port = settings.server.port,
        "kniga-app bootstrap starting"
    );

    kniga_app::run(settings).await
}
