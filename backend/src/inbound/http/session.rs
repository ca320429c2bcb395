//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! [`SessionContext`] wraps the Actix session and exposes the two pieces of
//! per-client state: the signed-in username and a read-once flash message.
//! [`SignedIn`] is the sign-in guard: as an extractor it runs before the
//! handler body, so protected operations never start for anonymous callers.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, Username};

use super::views::PageContext;

pub(crate) const USERNAME_KEY: &str = "username";
pub(crate) const FLASH_KEY: &str = "message";

/// Flash stored when an anonymous caller hits a protected route.
pub const SIGN_IN_REQUIRED: &str = "You must be signed in to do that.";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Username of the signed-in user, if any.
    pub fn username(&self) -> Result<Option<Username>, Error> {
        let raw = self
            .0
            .get::<String>(USERNAME_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match raw.as_deref().map(Username::new) {
            Some(Ok(username)) => Ok(Some(username)),
            Some(Err(error)) => {
                tracing::warn!("invalid username in session cookie: {error}");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Whether a user is signed in.
    pub fn is_signed_in(&self) -> Result<bool, Error> {
        Ok(self.username()?.is_some())
    }

    /// Require a signed-in user.
    ///
    /// On failure the sign-in flash is stored and an
    /// [`ErrorCode::Unauthorized`](crate::domain::ErrorCode::Unauthorized)
    /// error is returned, which the HTTP layer answers with a redirect to `/`.
    pub fn require_signed_in(&self) -> Result<Username, Error> {
        if let Some(username) = self.username()? {
            return Ok(username);
        }
        self.set_flash(SIGN_IN_REQUIRED)?;
        Err(Error::unauthorized(SIGN_IN_REQUIRED))
    }

    /// Record `username` as signed in.
    pub fn sign_in(&self, username: &Username) -> Result<(), Error> {
        self.0
            .insert(USERNAME_KEY, username.as_str())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Forget the signed-in user. The flash message is kept.
    pub fn sign_out(&self) {
        self.0.remove(USERNAME_KEY);
    }

    /// Store a flash message for the next rendered page.
    pub fn set_flash(&self, message: impl Into<String>) -> Result<(), Error> {
        self.0
            .insert(FLASH_KEY, message.into())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Return the pending flash message and clear it.
    pub fn take_flash(&self) -> Result<Option<String>, Error> {
        let message = self
            .0
            .get::<String>(FLASH_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        if message.is_some() {
            self.0.remove(FLASH_KEY);
        }
        Ok(message)
    }

    /// Gather what the page layout needs, consuming the flash message.
    pub fn page_context(&self) -> Result<PageContext, Error> {
        Ok(PageContext {
            flash: self.take_flash()?,
            username: self.username()?,
        })
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Proof that the request comes from a signed-in user.
///
/// Declare it as the first handler argument on protected routes.
#[derive(Debug, Clone)]
pub struct SignedIn(pub Username);

impl FromRequest for SignedIn {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move {
            let session = SessionContext::new(fut.await?);
            session.require_signed_in().map(SignedIn)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use crate::test_support::{session_cookie, test_session_middleware};

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/sign-in",
                web::get().to(|session: SessionContext| async move {
                    let user = Username::new("admin").expect("valid username");
                    session.sign_in(&user)?;
                    session.set_flash("Welcome!")?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/flash",
                web::get().to(|session: SessionContext| async move {
                    let flash = session.take_flash()?.unwrap_or_default();
                    Ok::<_, Error>(HttpResponse::Ok().body(flash))
                }),
            )
            .route(
                "/protected",
                web::get().to(|SignedIn(user): SignedIn| async move {
                    HttpResponse::Ok().body(user.to_string())
                }),
            )
    }

    #[actix_web::test]
    async fn flash_is_read_once() {
        let app = test::init_service(session_test_app()).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/sign-in").to_request()).await;
        let cookie = session_cookie(&res).expect("session cookie set");

        let first = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/flash")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let cleared = session_cookie(&first).expect("session cookie updated");
        assert_eq!(test::read_body(first).await, "Welcome!");

        let second = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/flash")
                .cookie(cleared)
                .to_request(),
        )
        .await;
        assert_eq!(test::read_body(second).await, "");
    }

    #[actix_web::test]
    async fn signed_in_guard_accepts_session_user() {
        let app = test::init_service(session_test_app()).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/sign-in").to_request()).await;
        let cookie = session_cookie(&res).expect("session cookie set");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/protected")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "admin");
    }

    #[actix_web::test]
    async fn signed_in_guard_redirects_and_flashes() {
        let app = test::init_service(session_test_app()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/protected").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.headers()
                .get(actix_web::http::header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/")
        );
        let cookie = session_cookie(&res).expect("flash stored in session");

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/flash").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(test::read_body(res).await, SIGN_IN_REQUIRED);
    }
}
