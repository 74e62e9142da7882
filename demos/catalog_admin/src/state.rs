// catalog_admin/src/state.rs
use crate::config::AppConfig;
use catalog_kit::{
  AuthService, CatalogCommands, CatalogController, ControllerOptions, Credentials, HttpAuthService,
  HttpProductSource, HttpSourceConfig, ImportOptions, ImportSession, MemoryNotificationSink, NotificationSink,
  ProductSource, ResultCache, Shared,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// One open import wizard.
pub struct ImportEntry {
  pub session: ImportSession,
  pub opened_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub source: Arc<dyn ProductSource>,
  pub auth: Arc<dyn AuthService>,
  pub notifier: Arc<MemoryNotificationSink>,
  /// Shared by every browse session and by `commands`, so a mutation clears all of them.
  pub cache: Arc<ResultCache>,
  pub commands: CatalogCommands,
  pub browse_sessions: Shared<HashMap<Uuid, CatalogController>>,
  pub import_sessions: Shared<HashMap<Uuid, ImportEntry>>,
}

fn controller_options(config: &AppConfig) -> ControllerOptions {
  ControllerOptions {
    page_size: config.page_size,
    bulk_page_size: config.bulk_page_size,
    ..ControllerOptions::default()
  }
}

impl AppState {
  pub async fn build(config: Arc<AppConfig>) -> anyhow::Result<Self> {
    let mut http_config = HttpSourceConfig::new(config.catalog_api_url.clone());
    if let Some(timeout) = config.http_timeout {
      http_config = http_config.with_timeout(timeout);
    }

    let auth: Arc<dyn AuthService> = Arc::new(HttpAuthService::new(http_config.clone())?);
    if let (Some(username), Some(password)) = (&config.catalog_api_user, &config.catalog_api_password) {
      let user = auth
        .login(&Credentials {
          username: username.clone(),
          password: password.clone(),
        })
        .await?;
      tracing::info!(user = %user.name, role = ?user.role, "Signed in to the catalog API at startup.");
    }

    let source: Arc<dyn ProductSource> = Arc::new(HttpProductSource::new(http_config, Some(auth.clone()))?);
    Ok(Self::assemble(config, source, auth))
  }

  /// Wires the shared cache, notifier and session maps around a source.
  pub fn assemble(config: Arc<AppConfig>, source: Arc<dyn ProductSource>, auth: Arc<dyn AuthService>) -> Self {
    let notifier = Arc::new(MemoryNotificationSink::new());
    let cache = Arc::new(ResultCache::new());

    Self {
      commands: CatalogCommands::new(
        CatalogController::with_cache(
          source.clone(),
          notifier.clone(),
          cache.clone(),
          controller_options(&config),
        ),
        auth.clone(),
      ),
      config,
      source,
      auth,
      notifier,
      cache,
      browse_sessions: Shared::new(HashMap::new()),
      import_sessions: Shared::new(HashMap::new()),
    }
  }

  pub fn new_controller(&self) -> CatalogController {
    let notifier: Arc<dyn NotificationSink> = self.notifier.clone();
    CatalogController::with_cache(self.source.clone(), notifier, self.cache.clone(), controller_options(&self.config))
  }

  pub fn new_import_session(&self) -> ImportSession {
    ImportSession::new(
      Arc::new(catalog_kit::CalamineParser),
      ImportOptions {
        submit_timeout: self.config.import_submit_timeout,
      },
    )
  }
}
