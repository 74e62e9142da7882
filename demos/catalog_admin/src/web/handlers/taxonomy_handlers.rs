// catalog_admin/src/web/handlers/taxonomy_handlers.rs

use actix_web::{web, HttpResponse};
use catalog_kit::{EntityId, TaxonomyDraft};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::list_categories", skip(app_state))]
pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = app_state.commands.controller().categories().await?;
  Ok(HttpResponse::Ok().json(json!({ "categories": categories })))
}

#[instrument(name = "handler::create_category", skip(app_state, payload), fields(name = %payload.name))]
pub async fn create_category_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<TaxonomyDraft>,
) -> Result<HttpResponse, AppError> {
  let category = app_state.commands.create_category(&payload).await?;
  Ok(HttpResponse::Created().json(json!({ "category": category })))
}

#[instrument(name = "handler::update_category", skip(app_state, path, payload), fields(category_id = %path.as_ref()))]
pub async fn update_category_handler(
  app_state: web::Data<AppState>,
  path: web::Path<EntityId>,
  payload: web::Json<TaxonomyDraft>,
) -> Result<HttpResponse, AppError> {
  let category = app_state.commands.update_category(&path.into_inner(), &payload).await?;
  Ok(HttpResponse::Ok().json(json!({ "category": category })))
}

#[instrument(name = "handler::delete_category", skip(app_state, path), fields(category_id = %path.as_ref()))]
pub async fn delete_category_handler(
  app_state: web::Data<AppState>,
  path: web::Path<EntityId>,
) -> Result<HttpResponse, AppError> {
  app_state.commands.delete_category(&path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::list_brands", skip(app_state))]
pub async fn list_brands_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let brands = app_state.commands.controller().brands().await?;
  Ok(HttpResponse::Ok().json(json!({ "brands": brands })))
}

#[instrument(name = "handler::create_brand", skip(app_state, payload), fields(name = %payload.name))]
pub async fn create_brand_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<TaxonomyDraft>,
) -> Result<HttpResponse, AppError> {
  let brand = app_state.commands.create_brand(&payload).await?;
  Ok(HttpResponse::Created().json(json!({ "brand": brand })))
}

#[instrument(name = "handler::update_brand", skip(app_state, path, payload), fields(brand_id = %path.as_ref()))]
pub async fn update_brand_handler(
  app_state: web::Data<AppState>,
  path: web::Path<EntityId>,
  payload: web::Json<TaxonomyDraft>,
) -> Result<HttpResponse, AppError> {
  let brand = app_state.commands.update_brand(&path.into_inner(), &payload).await?;
  Ok(HttpResponse::Ok().json(json!({ "brand": brand })))
}

#[instrument(name = "handler::delete_brand", skip(app_state, path), fields(brand_id = %path.as_ref()))]
pub async fn delete_brand_handler(
  app_state: web::Data<AppState>,
  path: web::Path<EntityId>,
) -> Result<HttpResponse, AppError> {
  app_state.commands.delete_brand(&path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
