use actix_web::web;
use log::info;
use std::sync::Arc;
use crate::auth::{Argon2Verifier, CredentialVerifier, SessionManager, SharedSecretVerifier};
use crate::config::{Config, StorageBackend};
use crate::db;
use crate::errors::AppError;
use crate::handlers;
use crate::repository::{JsonFileRepository, MeetingRepository, PgMeetingRepository};
use crate::storage::UploadStore;

/// Shared handles every worker's `App` is built from.
#[derive(Clone)]
pub struct AppState {
    pub config: web::Data<Config>,
    pub repo: web::Data<dyn MeetingRepository>,
    pub store: web::Data<UploadStore>,
    pub sessions: web::Data<SessionManager>,
    pub verifier: web::Data<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(
        config: Config,
        repo: Arc<dyn MeetingRepository>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        let store = UploadStore::new(&config.uploads_dir);
        let sessions = SessionManager::new(&config.session_secret, config.session_ttl_secs, config.cookie_secure);

        Self {
            config: web::Data::new(config),
            repo: web::Data::from(repo),
            store: web::Data::new(store),
            sessions: web::Data::new(sessions),
            verifier: web::Data::from(verifier),
        }
    }

    /// Picks the storage backend and credential check named by `config`.
    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        let repo: Arc<dyn MeetingRepository> = match config.storage_backend {
            StorageBackend::File => Arc::new(JsonFileRepository::new(&config.data_file)),
            StorageBackend::Postgres => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    AppError::InternalServerError("DATABASE_URL must be set for the postgres backend".to_string())
                })?;
                let pool = db::create_pool(url).await?;
                db::ensure_schema(&pool).await?;
                Arc::new(PgMeetingRepository::new(pool))
            }
        };
        info!("Storage backend: {:?}", config.storage_backend);

        let verifier: Arc<dyn CredentialVerifier> = match &config.admin_password_hash {
            Some(hash) => {
                info!("Admin login checks an Argon2 hash");
                Arc::new(Argon2Verifier::new(hash.clone())?)
            }
            None => Arc::new(SharedSecretVerifier::new(config.admin_password.clone())),
        };

        let state = Self::new(config, repo, verifier);
        state.store.ensure_dir().await?;
        Ok(state)
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.config.clone())
            .app_data(self.repo.clone())
            .app_data(self.store.clone())
            .app_data(self.sessions.clone())
            .app_data(self.verifier.clone());
        handlers::routes(cfg);
    }
}
