//! # mute-worker
//!
//! Wires the sanction engine to PostgreSQL and the guild config file, then
//! keeps the expiry reconciler running until Ctrl-C.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use mute_common::{AppConfig, AppError, AppResult};
use mute_core::traits::SystemClock;
use mute_db::{
    create_pool, ensure_schema, FileMuteConfigProvider, PgPool, PgPrivilegeDirectory,
    PgSanctionRepository, PgSnapshotRepository,
};
use mute_service::{
    EngineOptions, ExpiryReconciler, ReadinessGate, SanctionEngine, ServiceContextBuilder,
};

/// Connect storage and build the engine
pub async fn create_engine(config: &AppConfig) -> AppResult<(SanctionEngine, PgPool)> {
    info!("Connecting to PostgreSQL...");
    let db_config = mute_db::DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    ensure_schema(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    let guilds = FileMuteConfigProvider::load(&config.guilds.path)
        .map_err(|e| AppError::Config(e.to_string()))?;

    let ctx = ServiceContextBuilder::new()
        .sanction_repo(Arc::new(PgSanctionRepository::new(pool.clone())))
        .snapshot_repo(Arc::new(PgSnapshotRepository::new(pool.clone())))
        .directory(Arc::new(PgPrivilegeDirectory::new(pool.clone())))
        .mute_config(Arc::new(guilds))
        .clock(Arc::new(SystemClock))
        .system_user_id(config.engine.system_user_id)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let engine = SanctionEngine::with_options(
        ctx,
        EngineOptions {
            inline_timers: config.engine.inline_timers,
        },
    );

    Ok((engine, pool))
}

/// Run the worker until Ctrl-C
pub async fn run(config: AppConfig) -> AppResult<()> {
    let (engine, pool) = create_engine(&config).await?;

    let readiness = ReadinessGate::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reconciler =
        ExpiryReconciler::new(engine, &config.reconciler).spawn(readiness.clone(), shutdown_rx);

    // Storage, directory and guild config are all in place
    readiness.mark_ready();
    info!("Sanction worker ready");

    tokio::signal::ctrl_c().await.map_err(AppError::internal)?;
    info!("Shutdown signal received, waiting for the current pass");

    let _ = shutdown_tx.send(true);
    reconciler.await.map_err(AppError::internal)?;
    pool.close().await;

    info!("Sanction worker stopped");
    Ok(())
}
