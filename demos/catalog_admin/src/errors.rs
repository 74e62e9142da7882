// catalog_admin/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use catalog_kit::CatalogError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Catalog Error: {source}")]
  Catalog {
    #[from] // Allows conversion from catalog_kit::CatalogError
    source: CatalogError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String), // For miscellaneous errors
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience in startup code
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<CatalogError>() {
      Ok(source) => AppError::Catalog { source },
      Err(other) => AppError::Internal(format!("{:#}", other)),
    }
  }
}

fn catalog_response(source: &CatalogError) -> HttpResponse {
  let message = source.to_string();
  match source {
    CatalogError::MissingMapping { fields } => {
      HttpResponse::BadRequest().json(json!({"error": message, "missingFields": fields}))
    }
    e if e.is_input_error() => HttpResponse::BadRequest().json(json!({"error": message})),
    CatalogError::InvalidTransition { .. } | CatalogError::Conflict(_) => {
      HttpResponse::Conflict().json(json!({"error": message}))
    }
    CatalogError::Auth(_) => HttpResponse::Unauthorized().json(json!({"error": message})),
    CatalogError::NotFound(_) => HttpResponse::NotFound().json(json!({"error": message})),
    CatalogError::Timeout { .. } => HttpResponse::GatewayTimeout().json(json!({"error": message})),
    e if e.is_transport_error() => {
      HttpResponse::BadGateway().json(json!({"error": "Catalog API error", "detail": message}))
    }
    _ => HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": message})),
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Catalog { source } => catalog_response(source),
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
