// catalog_kit/src/services/auth.rs

//! The authentication seam. The library never decides who the user is; it asks
//! an injected `AuthService` and attaches whatever bearer token it hands out.

use crate::error::{CatalogError, CatalogResult};
use crate::model::normalize::message_from_value;
use crate::model::EntityId;
use crate::source::http::{execute, HttpSourceConfig};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::fmt;
use tracing::{event, instrument, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Vendor,
}

impl Role {
  /// Only administrators may create, edit, toggle, delete or import.
  pub fn can_manage_catalog(self) -> bool {
    matches!(self, Role::Admin)
  }

  pub fn parse(raw: &str) -> Option<Self> {
    match raw.trim().to_lowercase().as_str() {
      "admin" | "administrador" | "administrator" => Some(Role::Admin),
      "vendor" | "vendedor" | "seller" => Some(Role::Vendor),
      _ => None,
    }
  }
}

impl<'de> Deserialize<'de> for Role {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Role::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unknown role '{}'", raw)))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
  pub id: EntityId,
  pub name: String,
  pub role: Role,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

#[async_trait]
pub trait AuthService: Send + Sync {
  fn current_user(&self) -> Option<CurrentUser>;

  fn bearer_token(&self) -> Option<String>;

  async fn login(&self, credentials: &Credentials) -> CatalogResult<CurrentUser>;

  async fn logout(&self) -> CatalogResult<()>;

  /// Fails with `Auth` unless a signed-in user may manage the catalog.
  fn require_catalog_manager(&self) -> CatalogResult<CurrentUser> {
    match self.current_user() {
      Some(user) if user.role.can_manage_catalog() => Ok(user),
      Some(user) => Err(CatalogError::Auth(format!(
        "el usuario {} no tiene permisos para administrar el catálogo",
        user.name
      ))),
      None => Err(CatalogError::Auth("sesión no iniciada".to_string())),
    }
  }
}

#[derive(Debug, Clone)]
struct Session {
  token: String,
  user: CurrentUser,
}

/// A fixed, pre-issued session. `login` only succeeds for the configured user name.
#[derive(Debug)]
pub struct StaticTokenAuth {
  session: RwLock<Option<Session>>,
  configured: Session,
}

impl StaticTokenAuth {
  pub fn new(token: impl Into<String>, user: CurrentUser) -> Self {
    let configured = Session {
      token: token.into(),
      user,
    };
    Self {
      session: RwLock::new(Some(configured.clone())),
      configured,
    }
  }
}

#[async_trait]
impl AuthService for StaticTokenAuth {
  fn current_user(&self) -> Option<CurrentUser> {
    self.session.read().as_ref().map(|s| s.user.clone())
  }

  fn bearer_token(&self) -> Option<String> {
    self.session.read().as_ref().map(|s| s.token.clone())
  }

  async fn login(&self, credentials: &Credentials) -> CatalogResult<CurrentUser> {
    if credentials.username.trim() != self.configured.user.name {
      return Err(CatalogError::Auth("credenciales inválidas".to_string()));
    }
    *self.session.write() = Some(self.configured.clone());
    Ok(self.configured.user.clone())
  }

  async fn logout(&self) -> CatalogResult<()> {
    *self.session.write() = None;
    Ok(())
  }
}

/// Signs in against `{base}/auth/login` and keeps the returned token in memory.
pub struct HttpAuthService {
  client: Client,
  config: HttpSourceConfig,
  session: RwLock<Option<Session>>,
}

impl HttpAuthService {
  pub fn new(config: HttpSourceConfig) -> CatalogResult<Self> {
    Ok(Self {
      client: config.build_client()?,
      config,
      session: RwLock::new(None),
    })
  }

  /// Starts already signed in, e.g. with a token restored from configuration.
  pub fn with_session(config: HttpSourceConfig, token: impl Into<String>, user: CurrentUser) -> CatalogResult<Self> {
    let service = Self::new(config)?;
    *service.session.write() = Some(Session {
      token: token.into(),
      user,
    });
    Ok(service)
  }
}

pub(crate) fn session_from_login(body: &Value) -> CatalogResult<(String, CurrentUser)> {
  let token = ["token", "accessToken", "access_token"]
    .iter()
    .find_map(|key| body.get(*key).and_then(Value::as_str))
    .map(str::to_string)
    .ok_or_else(|| CatalogError::Decode("login response has no token".to_string()))?;

  let user = body.get("user").or_else(|| body.get("usuario")).unwrap_or(body);
  let id = user
    .get("id")
    .and_then(EntityId::from_json)
    .ok_or_else(|| CatalogError::Decode("login response has no user id".to_string()))?;
  let name = ["name", "nombre", "username"]
    .iter()
    .find_map(|key| user.get(*key).and_then(Value::as_str))
    .unwrap_or_default()
    .to_string();
  let role = ["role", "rol"]
    .iter()
    .find_map(|key| user.get(*key).and_then(Value::as_str))
    .and_then(Role::parse)
    .ok_or_else(|| CatalogError::Decode("login response has no known role".to_string()))?;

  Ok((token, CurrentUser { id, name, role }))
}

#[async_trait]
impl AuthService for HttpAuthService {
  fn current_user(&self) -> Option<CurrentUser> {
    self.session.read().as_ref().map(|s| s.user.clone())
  }

  fn bearer_token(&self) -> Option<String> {
    self.session.read().as_ref().map(|s| s.token.clone())
  }

  #[instrument(name = "HttpAuthService::login", skip_all, fields(username = %credentials.username), err(Display))]
  async fn login(&self, credentials: &Credentials) -> CatalogResult<CurrentUser> {
    let request = self
      .client
      .post(self.config.endpoint("auth/login"))
      .json(&json!({ "username": credentials.username, "password": credentials.password }));
    let body = execute(request, "login", self.config.timeout).await.map_err(|e| match e {
      CatalogError::Validation(message) => CatalogError::Auth(message),
      other => other,
    })?;
    if let Some(message) = body.get("error").and_then(|_| message_from_value(&body)) {
      return Err(CatalogError::Auth(message));
    }
    let (token, user) = session_from_login(&body)?;
    event!(Level::INFO, user_id = %user.id, role = ?user.role, "Signed in.");
    *self.session.write() = Some(Session {
      token,
      user: user.clone(),
    });
    Ok(user)
  }

  async fn logout(&self) -> CatalogResult<()> {
    *self.session.write() = None;
    Ok(())
  }
}
