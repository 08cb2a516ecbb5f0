//! Auto-parts storefront server
//!
//! # Overview
//!
//! - **Catalog** (`catalog`): category tree, text search, per-view result caches
//! - **Import/export** (`data_transfer`): CSV/XLSX reconciliation by part number, CSV export
//! - **Notifications** (`notify`): staff chat messages for orders and inquiries
//! - **Auth** (`auth`): bearer tokens from the identity provider, operator approval, permissions
//! - **Database** (`db`): SQLite via sqlx
//! - **HTTP API** (`api`): axum routes
//!
//! ```text
//! storefront-server/src/
//! ├── core/          # config, state, listener
//! ├── auth/          # tokens, operator gate, permissions
//! ├── catalog/       # tree, normalizer, search engine, sessions
//! ├── data_transfer/ # import/export
//! ├── notify/        # chat bot client
//! ├── api/           # routes and handlers
//! ├── db/            # pool, migrations, repositories
//! └── utils/         # logging, validation, slugs
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod data_transfer;
pub mod db;
pub mod notify;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use crate::core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Load `.env`, read the configuration and install logging
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env().map_err(crate::core::ServerError::Config)?;
    std::fs::create_dir_all(config.log_dir())?;

    let log_dir = config.log_dir();
    init_logger_with_file(&config.log_level, config.log_json, log_dir.to_str())?;

    match cleanup_old_logs(&log_dir) {
        Ok(0) => {}
        Ok(n) => tracing::info!(removed = n, "Old log files removed"),
        Err(e) => tracing::warn!(error = %e, "Log cleanup failed"),
    }

    Ok(config)
}
