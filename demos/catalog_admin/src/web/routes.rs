// catalog_admin/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{auth_handlers, browse_handlers, import_handlers, product_handlers, taxonomy_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1") // Base path for API version 1
      .route("/health", web::get().to(health_check_handler))
      .route("/notifications", web::get().to(browse_handlers::drain_notifications_handler))
      // Authentication Routes
      .service(
        web::scope("/auth")
          .route("/login", web::post().to(auth_handlers::login_handler))
          .route("/logout", web::post().to(auth_handlers::logout_handler))
          .route("/me", web::get().to(auth_handlers::me_handler)),
      )
      // Browse sessions: one filter state + cached view per open list screen
      .service(
        web::scope("/browse")
          .route("", web::post().to(browse_handlers::open_browse_handler))
          .route("/{session_id}", web::get().to(browse_handlers::load_view_handler))
          .route("/{session_id}", web::delete().to(browse_handlers::close_browse_handler))
          .route("/{session_id}/filters", web::patch().to(browse_handlers::update_filters_handler))
          .route("/{session_id}/refetch", web::post().to(browse_handlers::refetch_handler))
          .route("/{session_id}/dismiss-error", web::post().to(browse_handlers::dismiss_error_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/{product_id}", web::put().to(product_handlers::update_product_handler))
          .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler))
          .route("/{product_id}/active", web::patch().to(product_handlers::set_active_handler)),
      )
      .service(
        web::scope("/categories")
          .route("", web::get().to(taxonomy_handlers::list_categories_handler))
          .route("", web::post().to(taxonomy_handlers::create_category_handler))
          .route("/{category_id}", web::put().to(taxonomy_handlers::update_category_handler))
          .route("/{category_id}", web::delete().to(taxonomy_handlers::delete_category_handler)),
      )
      .service(
        web::scope("/brands")
          .route("", web::get().to(taxonomy_handlers::list_brands_handler))
          .route("", web::post().to(taxonomy_handlers::create_brand_handler))
          .route("/{brand_id}", web::put().to(taxonomy_handlers::update_brand_handler))
          .route("/{brand_id}", web::delete().to(taxonomy_handlers::delete_brand_handler)),
      )
      // Import wizard
      .service(
        web::scope("/imports")
          .route("", web::post().to(import_handlers::open_import_handler))
          .route("/{import_id}", web::get().to(import_handlers::get_import_handler))
          .route("/{import_id}", web::delete().to(import_handlers::close_import_handler))
          .route("/{import_id}/file", web::post().to(import_handlers::upload_file_handler))
          .route("/{import_id}/mapping", web::put().to(import_handlers::set_mapping_handler))
          .route("/{import_id}/confirm", web::post().to(import_handlers::confirm_mapping_handler))
          .route("/{import_id}/back", web::post().to(import_handlers::previous_step_handler))
          .route("/{import_id}/rows", web::get().to(import_handlers::preview_rows_handler))
          .route("/{import_id}/submit", web::post().to(import_handlers::submit_import_handler))
          .route("/{import_id}/dismiss-error", web::post().to(import_handlers::dismiss_error_handler)),
      ),
  );
}
