//! HTTP inbound adapter serving the document pages.

pub mod auth;
pub mod documents;
pub mod error;
pub mod session;
pub mod session_config;
pub mod state;
pub mod views;

use actix_web::web;

pub use error::ApiResult;

/// Largest accepted `application/x-www-form-urlencoded` body.
///
/// Document content travels in the update form, so this bounds document
/// size. Larger submissions get a 413 page.
pub const FORM_LIMIT_BYTES: usize = 4 * 1024 * 1024;

/// Form extractor settings shared by every handler.
#[must_use]
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .limit(FORM_LIMIT_BYTES)
        .error_handler(error::form_rejection)
}

/// Register every page handler.
///
/// Fixed paths are registered ahead of the `/{filename}` patterns so names
/// such as `new` or `signin` never shadow them. Unmatched paths get a 404
/// page.
///
/// # Examples
/// ```
/// use actix_web::App;
///
/// let _app = App::new().configure(cms::inbound::http::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(form_config())
        .service(documents::index)
        .service(auth::sign_in_page)
        .service(auth::sign_in)
        .service(auth::sign_out)
        .service(documents::new_document)
        .service(documents::create_document)
        .service(documents::edit_document)
        .service(documents::delete_document)
        .service(documents::view_document)
        .service(documents::update_document)
        .default_service(web::to(error::page_not_found));
}
