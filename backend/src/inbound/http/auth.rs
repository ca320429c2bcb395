//! Sign-in and sign-out handlers.
//!
//! ```text
//! GET  /signin   sign-in form
//! POST /signin   username=admin&password=secret
//! POST /signout
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{ErrorCode, INVALID_CREDENTIALS, LoginCredentials};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views;

/// Sign-in form body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
}

/// Render the sign-in form.
#[get("/signin")]
pub async fn sign_in_page(session: SessionContext) -> ApiResult<HttpResponse> {
    let ctx = session.page_context()?;
    Ok(views::html_response(
        StatusCode::OK,
        views::sign_in_form(&ctx, "", None),
    ))
}

/// Check credentials and start a session.
///
/// Blank fields are reported exactly like a wrong password.
#[post("/signin")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<SignInForm>,
) -> ApiResult<HttpResponse> {
    let SignInForm { username, password } = form.into_inner();
    let outcome = match LoginCredentials::try_from_parts(&username, &password) {
        Ok(credentials) => state.login.authenticate(&credentials).await,
        Err(error) => {
            warn!(%error, "rejected sign-in form");
            return reject_sign_in(&session, &username);
        }
    };

    match outcome {
        Ok(user) => {
            session.sign_in(&user)?;
            session.set_flash("Welcome!")?;
            info!(username = user.as_str(), "signed in");
            Ok(views::redirect_home())
        }
        Err(error) if error.code() == ErrorCode::Unauthorized => {
            warn!(username = username.trim(), "failed sign-in");
            reject_sign_in(&session, &username)
        }
        Err(error) => Err(error),
    }
}

fn reject_sign_in(session: &SessionContext, username: &str) -> ApiResult<HttpResponse> {
    let ctx = session.page_context()?;
    Ok(views::html_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        views::sign_in_form(&ctx, username, Some(INVALID_CREDENTIALS)),
    ))
}

/// End the session's sign-in.
#[post("/signout")]
pub async fn sign_out(session: SessionContext) -> ApiResult<HttpResponse> {
    if let Some(user) = session.username()? {
        info!(username = user.as_str(), "signed out");
    }
    session.sign_out();
    session.set_flash("You have been signed out.")?;
    Ok(views::redirect_home())
}
