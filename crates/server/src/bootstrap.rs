use std::sync::Arc;

use secrecy::ExposeSecret;
use snapshelf_chat::controller::AlbumController;
use snapshelf_chat::events::controller_dispatcher;
use snapshelf_chat::gateway::{GatewayRunner, NoopMessenger, NoopTransport, ReconnectPolicy};
use snapshelf_core::config::{AppConfig, ConfigError, LoadOptions};
use snapshelf_db::{connect_with_settings, migrations, DbPool, SqlAlbumStore};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub gateway: GatewayRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let store = Arc::new(SqlAlbumStore::new(db_pool.clone()));
    let controller = Arc::new(AlbumController::new(
        store,
        &config.chat.album_table,
        &config.chat.call_command,
    ));
    let dispatcher = controller_dispatcher(controller);

    // A live transport plugs in here once credentials are configured; until
    // then the noop pair keeps the wiring honest.
    let transport_mode =
        if config.chat.bot_token.expose_secret().is_empty() { "noop" } else { "configured" };
    info!(
        event_name = "system.bootstrap.transport_mode",
        correlation_id = "bootstrap",
        transport_mode,
        "chat transport mode resolved"
    );
    let gateway = GatewayRunner::new(
        Arc::new(NoopTransport),
        Arc::new(NoopMessenger),
        dispatcher,
        ReconnectPolicy::default(),
    );

    Ok(Application { config, db_pool, gateway })
}

#[cfg(test)]
mod tests {
    use snapshelf_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    fn memory_options() -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:?cache=shared".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_migrates_and_exposes_the_album_table() {
        let app = bootstrap(memory_options()).await.expect("bootstrap");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'albums'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("albums table should exist after bootstrap");
        assert_eq!(table_count, 1);
    }

    #[tokio::test]
    async fn bootstrap_rejects_invalid_call_commands() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                call_command: Some("two tokens".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("validation error").to_string();
        assert!(message.contains("call_command"));
    }
}
