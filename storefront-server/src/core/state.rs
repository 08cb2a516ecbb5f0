use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::catalog::CatalogSessions;
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::notify::Notifier;

/// How often idle catalog sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared handles for every request handler
///
/// Cloning is cheap: the pool, the notifier client and the `Arc`s are all
/// reference counted.
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | Immutable configuration |
/// | pool | SQLite connection pool |
/// | jwt_service | Bearer token verification |
/// | sessions | Per-view catalog search caches |
/// | notifier | Staff chat client |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub sessions: Arc<CatalogSessions>,
    pub notifier: Notifier,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let sessions = Arc::new(
            CatalogSessions::new(config.catalog_page_size, config.session_ttl())
                .with_max_sessions(config.max_catalog_sessions),
        );
        let notifier = Notifier::new(
            config.chat_bot_token.clone(),
            config.chat_id.clone(),
            config.chat_api_base.clone(),
            config.request_timeout(),
        );
        if !notifier.is_enabled() {
            tracing::warn!("CHAT_BOT_TOKEN/CHAT_ID not set, staff notifications disabled");
        }

        Self {
            config,
            pool,
            jwt_service,
            sessions,
            notifier,
        }
    }

    /// Open the database (creating the work dir) and build the state
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|source| ServerError::WorkDir {
            path: config.work_dir.clone(),
            source,
        })?;
        let db_path = config.database_path();
        let db = DbService::new(&db_path.to_string_lossy())
            .await
            .map_err(ServerError::Database)?;
        tracing::info!(path = %db_path.display(), "Database ready");
        Ok(Self::new(config.clone(), db.pool))
    }

    /// Swap the notifier (tests point it at a fake chat API)
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn start_background_tasks(&self) {
        self.sessions.clone().spawn_sweeper(SESSION_SWEEP_INTERVAL);
        tracing::debug!("Catalog session sweeper started");
    }
}
