/// Application context and dependency injection
use crate::{
    audit::AuditRecorder,
    badges::BadgeScheduler,
    config::ServerConfig,
    db,
    error::RecorderResult,
    functions::{FunctionInvoker, HttpFunctionInvoker},
    store::{RowStore, SqliteRowStore},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub row_store: Arc<dyn RowStore>,
    pub functions: Arc<dyn FunctionInvoker>,
    pub audit_recorder: AuditRecorder,
    pub badge_scheduler: BadgeScheduler,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> RecorderResult<Self> {
        config.validate()?;

        let db = db::create_pool(
            &config.storage.database_path,
            db::DatabaseOptions {
                max_connections: config.storage.max_connections,
                ..Default::default()
            },
        )
        .await?;

        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        let functions: Arc<dyn FunctionInvoker> =
            Arc::new(HttpFunctionInvoker::new(&config.functions)?);

        Ok(Self::from_parts(config, db, functions))
    }

    /// Wire the services around an existing pool and function invoker
    pub fn from_parts(
        config: ServerConfig,
        db: SqlitePool,
        functions: Arc<dyn FunctionInvoker>,
    ) -> Self {
        let row_store: Arc<dyn RowStore> = Arc::new(SqliteRowStore::new(db.clone()));

        let audit_recorder = AuditRecorder::new(
            Arc::clone(&row_store),
            config.audit.fallback_user_agent.clone(),
        );

        let badge_scheduler = BadgeScheduler::new(
            Arc::clone(&functions),
            config.badges.function_name.clone(),
            config.badges.delay(),
        );

        Self {
            config: Arc::new(config),
            db,
            row_store,
            functions,
            audit_recorder,
            badge_scheduler,
        }
    }

    /// Get service address
    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
