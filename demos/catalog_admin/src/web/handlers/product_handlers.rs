// catalog_admin/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use catalog_kit::{EntityId, ProductDraft};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct ActivePayload {
  pub active: bool,
}

#[instrument(name = "handler::create_product", skip(app_state, payload), fields(code = %payload.code))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ProductDraft>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.commands.create_product(&payload).await?;
  info!(product_id = %product.id, "Product created.");
  Ok(HttpResponse::Created().json(json!({
      "message": "Producto creado",
      "product": product
  })))
}

#[instrument(name = "handler::update_product", skip(app_state, path, payload), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<EntityId>,
  payload: web::Json<ProductDraft>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.commands.update_product(&path.into_inner(), &payload).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Producto actualizado",
      "product": product
  })))
}

#[instrument(name = "handler::set_active", skip(app_state, path, payload), fields(product_id = %path.as_ref(), active = payload.active))]
pub async fn set_active_handler(
  app_state: web::Data<AppState>,
  path: web::Path<EntityId>,
  payload: web::Json<ActivePayload>,
) -> Result<HttpResponse, AppError> {
  let id = path.into_inner();
  app_state.commands.set_product_active(id.clone(), payload.active).await?;
  Ok(HttpResponse::Ok().json(json!({ "id": id, "active": payload.active })))
}

#[instrument(name = "handler::delete_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<EntityId>,
) -> Result<HttpResponse, AppError> {
  app_state.commands.delete_product(path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
