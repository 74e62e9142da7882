// catalog_admin/src/web/handlers/browse_handlers.rs

use actix_web::{web, HttpResponse};
use catalog_kit::{CatalogController, EntityId};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// Filter changes for one browse session. Absent fields are left alone;
/// the mutators reset the page whenever query, category or brands change.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterUpdate {
  pub query: Option<String>,
  pub category_id: Option<EntityId>,
  #[serde(default)]
  pub clear_category: bool,
  pub brand_ids: Option<Vec<EntityId>>,
  pub toggle_brand: Option<EntityId>,
  pub page: Option<u32>,
  #[serde(default)]
  pub clear_all: bool,
}

impl FilterUpdate {
  /// Returns whether anything changed.
  fn apply(self, controller: &CatalogController) -> bool {
    let mut changed = false;
    if self.clear_all {
      changed |= controller.clear_all();
    }
    if let Some(query) = self.query {
      changed |= controller.set_query(query);
    }
    if self.clear_category {
      changed |= controller.set_category(None);
    } else if let Some(category_id) = self.category_id {
      changed |= controller.set_category(Some(category_id));
    }
    if let Some(brand_ids) = self.brand_ids {
      changed |= controller.set_brands(brand_ids);
    }
    if let Some(brand_id) = self.toggle_brand {
      changed |= controller.toggle_brand(brand_id);
    }
    // Last, so an explicit page survives the resets above.
    if let Some(page) = self.page {
      changed |= controller.set_page(page);
    }
    changed
  }
}

fn controller_for(app_state: &AppState, session_id: Uuid) -> Result<CatalogController, AppError> {
  app_state
    .browse_sessions
    .read()
    .get(&session_id)
    .cloned()
    .ok_or_else(|| AppError::NotFound(format!("Browse session {} not found.", session_id)))
}

#[instrument(name = "handler::open_browse", skip(app_state))]
pub async fn open_browse_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let session_id = Uuid::new_v4();
  let controller = app_state.new_controller();
  app_state.browse_sessions.write().insert(session_id, controller.clone());
  info!(%session_id, "Browse session opened.");

  let view = controller.load().await;
  Ok(HttpResponse::Created().json(json!({
      "sessionId": session_id,
      "view": view
  })))
}

#[instrument(name = "handler::load_view", skip(app_state, path), fields(session_id = %path.as_ref()))]
pub async fn load_view_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let controller = controller_for(&app_state, path.into_inner())?;
  let view = controller.load().await;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::update_filters", skip(app_state, path, payload), fields(session_id = %path.as_ref()))]
pub async fn update_filters_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<FilterUpdate>,
) -> Result<HttpResponse, AppError> {
  let controller = controller_for(&app_state, path.into_inner())?;
  let changed = payload.into_inner().apply(&controller);
  let view = controller.load().await;
  Ok(HttpResponse::Ok().json(json!({
      "changed": changed,
      "view": view
  })))
}

#[instrument(name = "handler::refetch", skip(app_state, path), fields(session_id = %path.as_ref()))]
pub async fn refetch_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let controller = controller_for(&app_state, path.into_inner())?;
  let view = controller.refetch().await;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::dismiss_browse_error", skip(app_state, path), fields(session_id = %path.as_ref()))]
pub async fn dismiss_error_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let controller = controller_for(&app_state, path.into_inner())?;
  controller.dismiss_error();
  Ok(HttpResponse::Ok().json(controller.view()))
}

#[instrument(name = "handler::close_browse", skip(app_state, path), fields(session_id = %path.as_ref()))]
pub async fn close_browse_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let session_id = path.into_inner();
  match app_state.browse_sessions.write().remove(&session_id) {
    Some(_) => Ok(HttpResponse::NoContent().finish()),
    None => Err(AppError::NotFound(format!("Browse session {} not found.", session_id))),
  }
}

#[instrument(name = "handler::drain_notifications", skip(app_state))]
pub async fn drain_notifications_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let notifications = app_state.notifier.drain();
  Ok(HttpResponse::Ok().json(json!({ "notifications": notifications })))
}
