// catalog_admin/src/web/handlers/import_handlers.rs

use actix_web::{web, HttpResponse};
use catalog_kit::import::{send_batch, ImportRecord};
use catalog_kit::{NotificationLevel, NotificationSink, SystemField};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn, Instrument};
use uuid::Uuid;

use super::require_manager;
use crate::errors::AppError;
use crate::state::{AppState, ImportEntry};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
  pub file_name: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RowsQuery {
  pub page: Option<u32>,
  pub page_size: Option<u32>,
}

/// Field key → column header. `null` unmaps the field.
#[derive(Deserialize, Debug)]
#[serde(transparent)]
pub struct MappingPayload(pub BTreeMap<SystemField, Option<String>>);

const PREVIEW_PAGE_SIZE: u32 = 10;

fn describe(import_id: Uuid, entry: &ImportEntry) -> Value {
  let session = &entry.session;
  let missing: Vec<&str> = session.mapping().missing_required().into_iter().map(SystemField::label).collect();
  json!({
      "importId": import_id,
      "openedAt": entry.opened_at,
      "step": session.step(),
      "fileName": session.file_name(),
      "headers": session.headers(),
      "mapping": session.mapping(),
      "missingFields": missing,
      "summary": session.summary(),
      "outcome": session.outcome(),
      "lastError": session.last_error(),
      "isSubmitting": session.is_submitting(),
  })
}

/// Runs `f` on the session under the write lock. Never awaits.
fn with_session<R>(
  app_state: &AppState,
  import_id: Uuid,
  f: impl FnOnce(&mut ImportEntry) -> Result<R, AppError>,
) -> Result<R, AppError> {
  let mut sessions = app_state.import_sessions.write();
  let entry = sessions
    .get_mut(&import_id)
    .ok_or_else(|| AppError::NotFound(format!("Import {} not found.", import_id)))?;
  f(entry)
}

#[instrument(name = "handler::open_import", skip(app_state))]
pub async fn open_import_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  require_manager(&app_state)?;
  let import_id = Uuid::new_v4();
  let entry = ImportEntry {
    session: app_state.new_import_session(),
    opened_at: chrono::Utc::now(),
  };
  let body = describe(import_id, &entry);
  app_state.import_sessions.write().insert(import_id, entry);
  info!(%import_id, "Import wizard opened.");
  Ok(HttpResponse::Created().json(body))
}

#[instrument(name = "handler::get_import", skip(app_state, path), fields(import_id = %path.as_ref()))]
pub async fn get_import_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let import_id = path.into_inner();
  let body = with_session(&app_state, import_id, |entry| Ok(describe(import_id, entry)))?;
  Ok(HttpResponse::Ok().json(body))
}

#[instrument(
  name = "handler::upload_file",
  skip(app_state, path, query, body),
  fields(import_id = %path.as_ref(), file_name = %query.file_name, bytes = body.len())
)]
pub async fn upload_file_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  query: web::Query<UploadQuery>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  require_manager(&app_state)?;
  let import_id = path.into_inner();
  let response = with_session(&app_state, import_id, |entry| {
    entry.session.load_file(&query.file_name, &body)?;
    Ok(describe(import_id, entry))
  })?;
  Ok(HttpResponse::Ok().json(response))
}

#[instrument(name = "handler::set_mapping", skip(app_state, path, payload), fields(import_id = %path.as_ref()))]
pub async fn set_mapping_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<MappingPayload>,
) -> Result<HttpResponse, AppError> {
  require_manager(&app_state)?;
  let import_id = path.into_inner();
  let changes = payload.into_inner().0;
  let response = with_session(&app_state, import_id, |entry| {
    for (field, column) in &changes {
      entry.session.set_mapping(*field, column.as_deref())?;
    }
    Ok(describe(import_id, entry))
  })?;
  Ok(HttpResponse::Ok().json(response))
}

#[instrument(name = "handler::confirm_mapping", skip(app_state, path), fields(import_id = %path.as_ref()))]
pub async fn confirm_mapping_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  require_manager(&app_state)?;
  let import_id = path.into_inner();
  let response = with_session(&app_state, import_id, |entry| {
    entry.session.confirm_mapping()?;
    Ok(describe(import_id, entry))
  })?;
  Ok(HttpResponse::Ok().json(response))
}

#[instrument(name = "handler::previous_step", skip(app_state, path), fields(import_id = %path.as_ref()))]
pub async fn previous_step_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let import_id = path.into_inner();
  let response = with_session(&app_state, import_id, |entry| {
    entry.session.previous_step()?;
    Ok(describe(import_id, entry))
  })?;
  Ok(HttpResponse::Ok().json(response))
}

#[instrument(name = "handler::preview_rows", skip(app_state, path, query), fields(import_id = %path.as_ref()))]
pub async fn preview_rows_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  query: web::Query<RowsQuery>,
) -> Result<HttpResponse, AppError> {
  let import_id = path.into_inner();
  let page = query.page.unwrap_or(1).max(1);
  let page_size = query.page_size.unwrap_or(PREVIEW_PAGE_SIZE).max(1);
  let response = with_session(&app_state, import_id, |entry| {
    let total = entry.session.rows().len();
    Ok(json!({
        "page": page,
        "pageSize": page_size,
        "total": total,
        "totalPages": catalog_kit::pagination::total_pages(total, page_size),
        "summary": entry.session.summary(),
        "rows": entry.session.preview_page(page, page_size),
    }))
  })?;
  Ok(HttpResponse::Ok().json(response))
}

/// Sends the batch and reports it. The wizard may have been closed meanwhile;
/// the catalog changed anyway, so the cache and the notification do not depend on it.
async fn run_submission(
  app_state: web::Data<AppState>,
  import_id: Uuid,
  records: Vec<ImportRecord>,
) -> Result<Value, AppError> {
  let result = send_batch(app_state.source.as_ref(), &records, app_state.config.import_submit_timeout).await;
  match &result {
    Ok(report) => {
      app_state.cache.invalidate_all();
      let level = if report.has_exceptions() {
        NotificationLevel::Warning
      } else {
        NotificationLevel::Success
      };
      app_state.notifier.notify(
        level,
        &format!("Importación finalizada: {} productos importados", report.imported),
      );
    }
    Err(err) => {
      warn!(error = %err, "Import submission failed.");
      app_state.notifier.notify(NotificationLevel::Error, &format!("Error en la importación: {}", err));
    }
  }

  with_session(&app_state, import_id, |entry| {
    entry.session.finish_submission(result)?;
    Ok(describe(import_id, entry))
  })
}

#[instrument(name = "handler::submit_import", skip(app_state, path), fields(import_id = %path.as_ref()))]
pub async fn submit_import_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  require_manager(&app_state)?;
  let import_id = path.into_inner();

  // The lock is released while the batch is in flight; the session itself
  // rejects a second submission until this one is finished.
  let records = with_session(&app_state, import_id, |entry| Ok(entry.session.begin_submission()?))?;
  info!(rows = records.len(), "Submitting import batch.");

  // Detached from the request, so a client that hangs up cannot leave the session busy.
  let submission = actix_web::rt::spawn(run_submission(app_state.clone(), import_id, records).in_current_span());
  match submission.await {
    Ok(body) => Ok(HttpResponse::Ok().json(body?)),
    Err(join_err) => {
      warn!(error = %join_err, "Import submission task ended without an answer.");
      let _ = with_session(&app_state, import_id, |entry| Ok(entry.session.abandon_submission()));
      Err(AppError::Internal(format!("import submission task failed: {}", join_err)))
    }
  }
}

#[instrument(name = "handler::dismiss_import_error", skip(app_state, path), fields(import_id = %path.as_ref()))]
pub async fn dismiss_error_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let import_id = path.into_inner();
  let response = with_session(&app_state, import_id, |entry| {
    entry.session.dismiss_error();
    Ok(describe(import_id, entry))
  })?;
  Ok(HttpResponse::Ok().json(response))
}

#[instrument(name = "handler::close_import", skip(app_state, path), fields(import_id = %path.as_ref()))]
pub async fn close_import_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let import_id = path.into_inner();
  let removed = app_state.import_sessions.write().remove(&import_id);
  match removed {
    Some(entry) => {
      if entry.session.is_submitting() {
        info!("Import closed while its batch is in flight; the result will only be notified.");
      }
      Ok(HttpResponse::NoContent().finish())
    }
    None => Err(AppError::NotFound(format!("Import {} not found.", import_id))),
  }
}
