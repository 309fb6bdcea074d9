//! Shared application state for all routes. The database is the single mutable owner of
//! every collection; handlers lock it per request and release before awaiting.

use crate::config::{ResolvedModel, ServerConfig};
use crate::error::AppError;
use crate::store::Database;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<Database>>,
    pub model: Arc<ResolvedModel>,
    /// Mutations are rejected with 403 when set.
    pub read_only: bool,
    /// Database file rewritten after each mutation, when persistence is on.
    pub persist_path: Option<Arc<PathBuf>>,
    /// Held across snapshot and write so saves land in mutation order.
    persist_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(db: Database, model: ResolvedModel) -> Self {
        AppState {
            db: Arc::new(RwLock::new(db)),
            model: Arc::new(model),
            read_only: false,
            persist_path: None,
            persist_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn from_config(db: Database, model: ResolvedModel, config: &ServerConfig) -> Self {
        let mut state = Self::new(db, model);
        state.read_only = config.read_only;
        if config.persist {
            state.persist_path = Some(Arc::new(config.db.clone()));
        }
        state
    }

    pub fn read_db(&self) -> Result<RwLockReadGuard<'_, Database>, AppError> {
        self.db.read().map_err(|_| AppError::Internal("database lock poisoned".into()))
    }

    pub fn write_db(&self) -> Result<RwLockWriteGuard<'_, Database>, AppError> {
        if self.read_only {
            return Err(AppError::Forbidden("server is read-only".into()));
        }
        self.db.write().map_err(|_| AppError::Internal("database lock poisoned".into()))
    }

    /// Write the current database to the persist path, if any. Failures are only logged.
    pub async fn persist(&self) {
        let Some(path) = self.persist_path.clone() else {
            return;
        };
        let _guard = self.persist_lock.lock().await;
        let snapshot = match self.read_db() {
            Ok(db) => db.to_value(),
            Err(e) => {
                tracing::warn!(error = %e, "skipping persist");
                return;
            }
        };
        if let Err(e) = Database::save(&snapshot, &path).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to persist database");
        }
    }
}
