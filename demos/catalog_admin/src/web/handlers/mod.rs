// catalog_admin/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod browse_handlers;
pub mod import_handlers;
pub mod product_handlers;
pub mod taxonomy_handlers;

use crate::errors::AppError;
use crate::state::AppState;
use catalog_kit::CurrentUser;

/// Import and mutation endpoints are for catalog managers only.
pub(crate) fn require_manager(app_state: &AppState) -> Result<CurrentUser, AppError> {
  match app_state.auth.current_user() {
    None => Err(AppError::Auth("sesión no iniciada".to_string())),
    Some(user) if !user.role.can_manage_catalog() => Err(AppError::Forbidden(format!(
      "el usuario '{}' no tiene permisos para administrar el catálogo",
      user.name
    ))),
    Some(user) => Ok(user),
  }
}
