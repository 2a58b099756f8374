use story_server::{
    config::{Command, ServerConfig},
    run::{migrate, run},
    Result,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,story_server=debug,story_app=debug")),
        )
        .init();

    let args = ServerConfig::load()?;
    match &args.command {
        Some(Command::Migrate { direction, step }) => {
            migrate(&args, *direction, *step).await?;
            Ok(())
        }
        None => run(args).await,
    }
}
