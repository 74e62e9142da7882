// catalog_kit/src/source/http.rs

//! HTTP/JSON implementation of [`ProductSource`] on top of reqwest.
//! Every response goes through `model::normalize` before it reaches the caller.

use super::{ProductQuery, ProductSource};
use crate::error::{CatalogError, CatalogResult};
use crate::import::record::{ImportRecord, ImportReport};
use crate::model::normalize::{
  brand_from_value, brands_from_value, categories_from_value, category_from_value, message_from_value,
  product_from_value, product_page_from_value,
};
use crate::model::{Brand, Category, EntityId, Product, ProductDraft, ProductPage, TaxonomyDraft};
use crate::services::auth::AuthService;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{event, instrument, Level};

/// Where the remote source lives and how long a single request may take.
/// `timeout: None` means requests wait as long as the server does.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
  pub base_url: String,
  pub timeout: Option<Duration>,
}

impl HttpSourceConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into().trim_end_matches('/').to_string(),
      timeout: None,
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  pub fn endpoint(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path.trim_start_matches('/'))
  }

  pub(crate) fn build_client(&self) -> CatalogResult<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = self.timeout {
      builder = builder.timeout(timeout);
    }
    builder
      .build()
      .map_err(|e| CatalogError::Internal(format!("could not build HTTP client: {}", e)))
  }
}

/// Maps a non-success status to the error taxonomy.
pub fn error_for_status(status: u16, message: String) -> CatalogError {
  match status {
    400 | 422 => CatalogError::Validation(message),
    401 | 403 => CatalogError::Auth(message),
    404 => CatalogError::NotFound(message),
    409 => CatalogError::Conflict(message),
    _ => CatalogError::Http { status, message },
  }
}

/// Sends `request` and returns the decoded JSON body (`Value::Null` for an empty body).
pub(crate) async fn execute(request: RequestBuilder, operation: &str, timeout: Option<Duration>) -> CatalogResult<Value> {
  let response = request.send().await.map_err(|e| {
    if e.is_timeout() {
      CatalogError::Timeout {
        operation: operation.to_string(),
        seconds: timeout.map(|t| t.as_secs()).unwrap_or_default(),
      }
    } else {
      CatalogError::Transport {
        source: anyhow::Error::new(e).context(format!("{} failed", operation)),
      }
    }
  })?;

  let status = response.status();
  let body = response.text().await.map_err(|e| CatalogError::Transport {
    source: anyhow::Error::new(e).context(format!("{}: reading body failed", operation)),
  })?;
  let parsed: Option<Value> = if body.trim().is_empty() {
    None
  } else {
    serde_json::from_str(&body).ok()
  };

  if !status.is_success() {
    let message = parsed
      .as_ref()
      .and_then(message_from_value)
      .unwrap_or_else(|| {
        let text: String = body.trim().chars().take(200).collect();
        if text.is_empty() {
          status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
          text
        }
      });
    event!(Level::WARN, %operation, status = status.as_u16(), %message, "Product source rejected the request.");
    return Err(error_for_status(status.as_u16(), message));
  }

  match parsed {
    Some(value) => Ok(value),
    None if body.trim().is_empty() => Ok(Value::Null),
    None => Err(CatalogError::Decode(format!("{}: response is not JSON", operation))),
  }
}

pub struct HttpProductSource {
  client: Client,
  config: HttpSourceConfig,
  auth: Option<Arc<dyn AuthService>>,
}

impl HttpProductSource {
  pub fn new(config: HttpSourceConfig, auth: Option<Arc<dyn AuthService>>) -> CatalogResult<Self> {
    let client = config.build_client()?;
    Ok(Self { client, config, auth })
  }

  pub fn config(&self) -> &HttpSourceConfig {
    &self.config
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let builder = self.client.request(method, self.config.endpoint(path));
    match self.auth.as_ref().and_then(|a| a.bearer_token()) {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  async fn call(&self, request: RequestBuilder, operation: &str) -> CatalogResult<Value> {
    execute(request, operation, self.config.timeout).await
  }
}

pub(crate) fn query_params(query: &ProductQuery) -> Vec<(&'static str, String)> {
  let mut params = vec![("page", query.page.to_string()), ("pageSize", query.page_size.to_string())];
  if let Some(search) = &query.search {
    params.push(("search", search.clone()));
  }
  if let Some(category_id) = &query.category_id {
    params.push(("categoryId", category_id.to_string()));
  }
  if !query.brand_ids.is_empty() {
    let joined: Vec<&str> = query.brand_ids.iter().map(EntityId::as_str).collect();
    params.push(("brandIds", joined.join(",")));
  }
  params
}

#[async_trait]
impl ProductSource for HttpProductSource {
  #[instrument(name = "HttpProductSource::list_active_products", skip_all, fields(page = query.page, page_size = query.page_size, search = query.search.is_some()), err(Display))]
  async fn list_active_products(&self, query: &ProductQuery) -> CatalogResult<ProductPage> {
    let request = self.request(Method::GET, "products/active").query(&query_params(query));
    let body = self.call(request, "list active products").await?;
    let page = product_page_from_value(&body)?;
    event!(Level::DEBUG, items = page.items.len(), total = page.total, "Active products received.");
    Ok(page)
  }

  #[instrument(name = "HttpProductSource::list_categories", skip_all, err(Display))]
  async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
    let body = self.call(self.request(Method::GET, "categories"), "list categories").await?;
    categories_from_value(&body)
  }

  #[instrument(name = "HttpProductSource::list_brands", skip_all, err(Display))]
  async fn list_brands(&self) -> CatalogResult<Vec<Brand>> {
    let body = self.call(self.request(Method::GET, "brands"), "list brands").await?;
    brands_from_value(&body)
  }

  #[instrument(name = "HttpProductSource::bulk_import", skip_all, fields(rows = rows.len()), err(Display))]
  async fn bulk_import(&self, rows: &[ImportRecord]) -> CatalogResult<ImportReport> {
    let request = self
      .request(Method::POST, "products/bulk-import")
      .json(&json!({ "rows": rows }));
    let body = self.call(request, "bulk import").await?;
    import_report_from_value(body)
  }

  #[instrument(name = "HttpProductSource::create_product", skip_all, err(Display))]
  async fn create_product(&self, draft: &ProductDraft) -> CatalogResult<Product> {
    let body = self
      .call(self.request(Method::POST, "products").json(draft), "create product")
      .await?;
    product_from_value(&body)
  }

  #[instrument(name = "HttpProductSource::update_product", skip(self, draft), fields(product_id = %id), err(Display))]
  async fn update_product(&self, id: &EntityId, draft: &ProductDraft) -> CatalogResult<Product> {
    let path = format!("products/{}", id);
    let body = self
      .call(self.request(Method::PUT, &path).json(draft), "update product")
      .await?;
    product_from_value(&body)
  }

  #[instrument(name = "HttpProductSource::set_product_active", skip(self), fields(product_id = %id), err(Display))]
  async fn set_product_active(&self, id: &EntityId, active: bool) -> CatalogResult<()> {
    let path = format!("products/{}/active", id);
    self
      .call(
        self.request(Method::PATCH, &path).json(&json!({ "active": active })),
        "toggle product",
      )
      .await?;
    Ok(())
  }

  #[instrument(name = "HttpProductSource::delete_product", skip(self), fields(product_id = %id), err(Display))]
  async fn delete_product(&self, id: &EntityId) -> CatalogResult<()> {
    let path = format!("products/{}", id);
    self.call(self.request(Method::DELETE, &path), "delete product").await?;
    Ok(())
  }

  async fn create_category(&self, draft: &TaxonomyDraft) -> CatalogResult<Category> {
    let body = self
      .call(self.request(Method::POST, "categories").json(draft), "create category")
      .await?;
    category_from_value(&body)
  }

  async fn update_category(&self, id: &EntityId, draft: &TaxonomyDraft) -> CatalogResult<Category> {
    let path = format!("categories/{}", id);
    let body = self
      .call(self.request(Method::PUT, &path).json(draft), "update category")
      .await?;
    category_from_value(&body)
  }

  async fn delete_category(&self, id: &EntityId) -> CatalogResult<()> {
    let path = format!("categories/{}", id);
    self.call(self.request(Method::DELETE, &path), "delete category").await?;
    Ok(())
  }

  async fn create_brand(&self, draft: &TaxonomyDraft) -> CatalogResult<Brand> {
    let body = self
      .call(self.request(Method::POST, "brands").json(draft), "create brand")
      .await?;
    brand_from_value(&body)
  }

  async fn update_brand(&self, id: &EntityId, draft: &TaxonomyDraft) -> CatalogResult<Brand> {
    let path = format!("brands/{}", id);
    let body = self
      .call(self.request(Method::PUT, &path).json(draft), "update brand")
      .await?;
    brand_from_value(&body)
  }

  async fn delete_brand(&self, id: &EntityId) -> CatalogResult<()> {
    let path = format!("brands/{}", id);
    self.call(self.request(Method::DELETE, &path), "delete brand").await?;
    Ok(())
  }
}

/// An empty success body means the server accepted the batch without counting it.
fn import_report_from_value(body: Value) -> CatalogResult<ImportReport> {
  if body.is_null() {
    event!(Level::DEBUG, "Bulk import answered without a report.");
    return Ok(ImportReport::default());
  }
  serde_json::from_value(body).map_err(|e| CatalogError::Decode(format!("bulk import report: {}", e)))
}
