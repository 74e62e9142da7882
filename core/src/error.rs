// catalog_kit/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Required fields are not mapped: {}", fields.join(", "))]
  MissingMapping { fields: Vec<String> },

  #[error("Unsupported file '{file_name}': only {allowed} files are accepted")]
  UnsupportedFile { file_name: String, allowed: String },

  #[error("The file '{file_name}' contains no data rows")]
  EmptyFile { file_name: String },

  #[error("Could not read spreadsheet '{file_name}'. Source: {source}")]
  Parse {
    file_name: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Cannot {action} while the import is in step '{step}'")]
  InvalidTransition { step: String, action: String },

  #[error("Request to the product source failed. Source: {source}")]
  Transport {
    #[source]
    source: AnyhowError,
  },

  #[error("Product source answered {status}: {message}")]
  Http { status: u16, message: String },

  #[error("Unexpected payload from the product source: {0}")]
  Decode(String),

  #[error("Not authorized: {0}")]
  Auth(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("'{operation}' timed out after {seconds}s")]
  Timeout { operation: String, seconds: u64 },

  #[error("Internal catalog error: {0}")]
  Internal(String),
}

impl CatalogError {
  /// Errors caused by user input (form values, mapping, file choice).
  /// They block forward progress and are fixed by correcting the input.
  pub fn is_input_error(&self) -> bool {
    matches!(
      self,
      CatalogError::Validation(_)
        | CatalogError::MissingMapping { .. }
        | CatalogError::UnsupportedFile { .. }
        | CatalogError::EmptyFile { .. }
        | CatalogError::Parse { .. }
    )
  }

  /// Errors raised while talking to the remote source. The UI offers a retry for these.
  pub fn is_transport_error(&self) -> bool {
    matches!(
      self,
      CatalogError::Transport { .. } | CatalogError::Http { .. } | CatalogError::Decode(_) | CatalogError::Timeout { .. }
    )
  }
}

impl From<AnyhowError> for CatalogError {
  fn from(err: AnyhowError) -> Self {
    CatalogError::Transport { source: err }
  }
}

impl From<validator::ValidationErrors> for CatalogError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let mut fields: Vec<String> = errors
      .field_errors()
      .iter()
      .map(|(field, errs)| {
        let messages: Vec<String> = errs
          .iter()
          .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
          .collect();
        format!("{}: {}", field, messages.join("; "))
      })
      .collect();
    fields.sort();
    CatalogError::Validation(fields.join(", "))
  }
}

pub type CatalogResult<T, E = CatalogError> = std::result::Result<T, E>;
