use anyhow::Context;
use clap::{Parser, Subcommand};
use kniga_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "kniga", version, about = "Kniga digital book store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Load the layered configuration and print the effective settings as JSON
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load Kniga settings")?;

    match cli.command {
        Command::Serve => {
            kniga_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "kniga serve starting");
            kniga_app::run(settings).await
        }
        Command::CheckConfig => {
            let rendered = serde_json::to_string_pretty(&settings)
                .with_context(|| "failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
