// catalog_admin/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use catalog_kit::Credentials;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::login", skip(app_state, payload), fields(username = %payload.username))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<Credentials>,
) -> Result<HttpResponse, AppError> {
  if payload.username.trim().is_empty() || payload.password.is_empty() {
    return Err(AppError::Validation("usuario y contraseña son obligatorios".to_string()));
  }
  let user = app_state.auth.login(&payload).await?;
  info!(user_id = %user.id, role = ?user.role, "User signed in.");
  Ok(HttpResponse::Ok().json(json!({
      "message": "Signed in successfully.",
      "user": user
  })))
}

#[instrument(name = "handler::logout", skip(app_state))]
pub async fn logout_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  app_state.auth.logout().await?;
  // Whatever the previous user saw must not leak into the next session.
  app_state.cache.invalidate_all();
  Ok(HttpResponse::Ok().json(json!({ "message": "Signed out." })))
}

#[instrument(name = "handler::me", skip(app_state))]
pub async fn me_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let user = app_state
    .auth
    .current_user()
    .ok_or_else(|| AppError::Auth("sesión no iniciada".to_string()))?;
  Ok(HttpResponse::Ok().json(json!({
      "user": user,
      "canManageCatalog": user.role.can_manage_catalog()
  })))
}
