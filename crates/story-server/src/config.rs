use std::{path::PathBuf, time::Duration};

use crate::error::Result;
pub use clap::Parser;
use story_app::state::AppConfig;
use story_dal::MigrationDirection;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "STORY_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "STORY_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "STORY_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/stories.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "STORY_DATA_DIR",
        help = "Data directory for database, default is system default like ~/.local/share/story-service",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[arg(
        long,
        env = "STORY_COMMENT_SERVICE_URL",
        default_value = "http://localhost:4000",
        help = "Base URL of the comment service"
    )]
    pub comment_service_url: Url,

    #[arg(
        long,
        env = "STORY_COMMENT_TIMEOUT",
        default_value = "2s",
        help = "Timeout for comment service calls in human friendly format (e.g. 500ms, 2s)",
        value_parser = humantime::parse_duration
    )]
    pub comment_timeout: Duration,

    #[arg(
        long,
        env = "STORY_DEFAULT_PAGE_SIZE",
        default_value = "20",
        help = "Default page size of story listing"
    )]
    pub default_page_size: u32,

    #[arg(long, env = "STORY_NO_CORS", help = "Disable CORS")]
    pub no_cors: bool,

    #[arg(
        long,
        env = "STORY_NO_MIGRATE",
        help = "Do not run database migrations on startup"
    )]
    pub no_migrate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// Apply or roll back database migrations and exit
    Migrate {
        #[arg(short, long, value_enum, default_value_t = Direction::Up)]
        direction: Direction,
        #[arg(short, long, default_value_t = 1, help = "Number of migrations to apply or revert")]
        step: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

impl From<Direction> for MigrationDirection {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Up => MigrationDirection::Up,
            Direction::Down => MigrationDirection::Down,
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("story-service"))
        .unwrap_or_else(|| PathBuf::from("story-service"))
        .to_string_lossy()
        .to_string()
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/stories.db", self.data_dir))
    }

    /// Explicit database URL is taken as is, data directory is not needed then
    pub fn uses_data_dir(&self) -> bool {
        self.database_url.is_none()
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        AppConfig {
            default_page_size: config.default_page_size,
            comment_timeout: config.comment_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["story-server", "--data-dir", "/tmp/stories"])
            .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url(), "sqlite:///tmp/stories/stories.db");
        assert_eq!(config.comment_timeout, Duration::from_secs(2));
        assert_eq!(config.comment_service_url.as_str(), "http://localhost:4000/");
        assert!(!config.no_cors);
        assert!(config.command.is_none());

        let app_config = AppConfig::from(&config);
        assert_eq!(app_config.default_page_size, 20);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::try_parse_from([
            "story-server",
            "--database-url",
            "sqlite::memory:",
            "--comment-timeout",
            "500ms",
            "--default-page-size",
            "5",
            "--no-cors",
        ])
        .unwrap();
        assert_eq!(config.database_url(), "sqlite::memory:");
        assert!(!config.uses_data_dir());
        assert_eq!(config.comment_timeout, Duration::from_millis(500));
        assert_eq!(config.default_page_size, 5);
        assert!(config.no_cors);
    }

    #[test]
    fn test_migrate_command() {
        let config = ServerConfig::try_parse_from([
            "story-server",
            "--data-dir",
            "/tmp/stories",
            "migrate",
            "--direction",
            "down",
            "--step",
            "2",
        ])
        .unwrap();
        match config.command {
            Some(Command::Migrate { direction, step }) => {
                assert_eq!(direction, Direction::Down);
                assert_eq!(step, 2);
                assert_eq!(MigrationDirection::from(direction), MigrationDirection::Down);
            }
            other => panic!("Unexpected command {other:?}"),
        }

        let config = ServerConfig::try_parse_from(["story-server", "migrate"]).unwrap();
        assert!(matches!(
            config.command,
            Some(Command::Migrate {
                direction: Direction::Up,
                step: 1
            })
        ));
    }
}
