use crate::config::{Config, DatabaseConfig};
use crate::{routes, state};
use anyhow::Context;
use sqlx::migrate::Migrator;
use sqlx::sqlite;
use std::str::FromStr;
use std::time::Duration;
use tokio::{net::TcpListener, signal, task::JoinSet};
use tokio_util::sync::CancellationToken;

pub struct ServerArgs<'a> {
    pub config: &'a Config,
}

static MIGRATOR: Migrator = sqlx::migrate!();

/// Opens the pool and creates the schema if it is absent.
pub(crate) async fn connect_database(config: &DatabaseConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let options = sqlite::SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("Failed to parse SQLite url: '{}'", config.url))?
        .create_if_missing(true)
        .journal_mode(sqlite::SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let pool = sqlite::SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: '{}'", config.url))?;
    MIGRATOR
        .run(&pool)
        .await
        .with_context(|| "Failed to initialize database schema")?;
    tracing::info!("Database initialized successfully");
    Ok(pool)
}

pub async fn run_until_done(args: ServerArgs<'_>, bind: TcpListener) -> anyhow::Result<()> {
    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();
    let shutdown_signal = CancellationToken::new();
    // the schema must exist before the first request is accepted
    let pool = connect_database(&args.config.database).await?;
    // axum serve
    {
        let shutdown_signal = shutdown_signal.clone();
        let state = state::AppState::build(pool);
        join_set.spawn(async move {
            let routes = routes::build().with_state(state);
            axum::serve(
                bind,
                routes.into_make_service(),
            )
            .with_graceful_shutdown(async move {
                shutdown_signal.cancelled().await;
            })
            .await
            .with_context(|| "HTTP server terminated unexpectedly")
        });
    }
    // register ctrl+c signal
    {
        let shutdown_signal = shutdown_signal.clone();
        join_set.spawn(async move {
            let _ = signal::ctrl_c().await;
            tracing::debug!("Received Ctrl+C, start terminating");
            shutdown_signal.cancel();
            Ok(())
        });
    }
    #[cfg(unix)]
    {
        let shutdown_signal = shutdown_signal.clone();
        join_set.spawn(async move {
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
            sigterm.recv().await;
            tracing::debug!("Received SIGTERM signal, start terminating");
            shutdown_signal.cancel();
            Ok(())
        });
    }
    while let Some(r) = join_set.join_next().await {
        if shutdown_signal.is_cancelled() {
            join_set.shutdown().await;
            tracing::info!("Server stopped");
            break;
        }
        match r {
            Ok(Ok(_)) => (),
            Ok(Err(e)) => return Err(e),
            Err(e) => anyhow::bail!("Internal error in spawn: {e}"),
        }
    }
    Ok(())
}
