//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while giving Actix handlers a
//! consistent presentation: an unauthorised caller is sent back to the
//! document list, everything else gets an HTML error page.

use actix_web::error::UrlencodedError;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

use super::views;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const INTERNAL_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Unauthorized => StatusCode::FOUND,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn public_message(error: &Error) -> &str {
    if matches!(error.code(), ErrorCode::InternalError) {
        INTERNAL_MESSAGE
    } else {
        error.message()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(
                trace_id = self.trace_id().unwrap_or_default(),
                error = %self,
                "request failed"
            );
        }

        let mut response = if matches!(self.code(), ErrorCode::Unauthorized) {
            views::redirect_home()
        } else {
            views::html_response(status, views::error_page(status, public_message(self)))
        };
        if let Some(value) = self
            .trace_id()
            .and_then(|id| header::HeaderValue::from_str(id).ok())
        {
            response
                .headers_mut()
                .insert(header::HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        response
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(INTERNAL_MESSAGE)
    }
}

/// Turn a rejected form body into a domain error so it renders as a page.
///
/// Installed through [`web::FormConfig::error_handler`](actix_web::web::FormConfig::error_handler).
pub fn form_rejection(err: UrlencodedError, req: &HttpRequest) -> actix_web::Error {
    warn!(path = req.path(), error = %err, "form body rejected");
    let error = match err {
        UrlencodedError::Overflow { limit, .. } => Error::payload_too_large(format!(
            "The submitted form is too large; the limit is {limit} bytes."
        )),
        _ => Error::invalid_request("The submitted form could not be read."),
    };
    error.into()
}

/// Fallback for paths no handler matches.
pub async fn page_not_found() -> ApiResult<HttpResponse> {
    Err(Error::not_found("Page not found."))
}
