use clap::Parser;
use counsel_cms::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "counsel_cms=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path, name }) => {
            counsel_cms::cli::init::run(path, name).await?;
        }
        Some(Commands::Serve { host, port }) => {
            counsel_cms::cli::serve::run(&cli.config, &host, port).await?;
        }
        Some(Commands::Migrate) => {
            counsel_cms::cli::migrate::run(&cli.config).await?;
        }
        Some(Commands::User { command }) => {
            counsel_cms::cli::user::run(&cli.config, command).await?;
        }
        None => {
            // No subcommand provided, print help
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
