//! Document handlers.
//!
//! ```text
//! GET  /                    document list
//! GET  /new                 new-document form
//! POST /create              filename=notes.txt
//! GET  /{filename}          rendered document
//! GET  /{filename}/edit     edit form
//! POST /{filename}          content=...
//! POST /{filename}/delete
//! ```
//!
//! Everything except the list requires a [`SignedIn`] user. Missing
//! documents are reported with a flash message and a redirect home.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use tracing::info;

use crate::domain::ports::DocumentRepositoryError;
use crate::domain::{DocumentName, Error, RenderedDocument, render_document};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{SessionContext, SignedIn};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views;

/// Body of `POST /create`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateForm {
    pub filename: String,
}

/// Body of `POST /{filename}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateForm {
    pub content: String,
}

fn storage_error(error: DocumentRepositoryError) -> Error {
    Error::internal(error.to_string())
}

/// Flash "<name> does not exist." and send the caller home.
fn missing(session: &SessionContext, name: &str) -> ApiResult<HttpResponse> {
    session.set_flash(format!("{name} does not exist."))?;
    Ok(views::redirect_home())
}

/// List every document.
#[get("/")]
pub async fn index(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let names = state.documents.list().await.map_err(storage_error)?;
    let ctx = session.page_context()?;
    Ok(views::html_response(StatusCode::OK, views::index(&ctx, &names)))
}

/// Render the new-document form.
#[get("/new")]
pub async fn new_document(_user: SignedIn, session: SessionContext) -> ApiResult<HttpResponse> {
    let ctx = session.page_context()?;
    Ok(views::html_response(
        StatusCode::OK,
        views::new_document_form(&ctx, "", None),
    ))
}

/// Create an empty document.
#[post("/create")]
pub async fn create_document(
    _user: SignedIn,
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<CreateForm>,
) -> ApiResult<HttpResponse> {
    let raw = form.into_inner().filename;
    let name = match DocumentName::parse(&raw) {
        Ok(name) => name,
        Err(error) => return reject_create(&session, &raw, &error.to_string()),
    };
    if state.documents.exists(&name).await.map_err(storage_error)? {
        return reject_create(&session, &raw, &format!("{name} already exists."));
    }

    state
        .documents
        .write(&name, b"")
        .await
        .map_err(storage_error)?;
    info!(document = name.as_str(), "document created");
    session.set_flash(format!("{name} was created."))?;
    Ok(views::redirect_home())
}

fn reject_create(session: &SessionContext, raw: &str, message: &str) -> ApiResult<HttpResponse> {
    let ctx = session.page_context()?;
    Ok(views::html_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        views::new_document_form(&ctx, raw, Some(message)),
    ))
}

/// Show a document, rendered according to its extension.
#[get("/{filename}")]
pub async fn view_document(
    _user: SignedIn,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let raw = path.into_inner();
    let Ok(name) = DocumentName::from_path(&raw) else {
        return missing(&session, &raw);
    };
    let document = match state.documents.read(&name).await {
        Ok(document) => document,
        Err(DocumentRepositoryError::NotFound { .. }) => return missing(&session, &raw),
        Err(error) => return Err(storage_error(error)),
    };

    match render_document(&document) {
        RenderedDocument::Plain(body) => Ok(HttpResponse::Ok()
            .content_type("text/plain")
            .body(body)),
        RenderedDocument::Html(html) => {
            let ctx = session.page_context()?;
            Ok(views::html_response(
                StatusCode::OK,
                views::markdown_document(&ctx, &name, &html),
            ))
        }
    }
}

/// Render the edit form with the current content.
#[get("/{filename}/edit")]
pub async fn edit_document(
    _user: SignedIn,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let raw = path.into_inner();
    let Ok(name) = DocumentName::from_path(&raw) else {
        return missing(&session, &raw);
    };
    let document = match state.documents.read(&name).await {
        Ok(document) => document,
        Err(DocumentRepositoryError::NotFound { .. }) => return missing(&session, &raw),
        Err(error) => return Err(storage_error(error)),
    };

    let ctx = session.page_context()?;
    Ok(views::html_response(
        StatusCode::OK,
        views::edit_document_form(&ctx, &name, &document.text()),
    ))
}

/// Replace a document's content.
#[post("/{filename}")]
pub async fn update_document(
    _user: SignedIn,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    form: web::Form<UpdateForm>,
) -> ApiResult<HttpResponse> {
    let raw = path.into_inner();
    let Ok(name) = DocumentName::from_path(&raw) else {
        return missing(&session, &raw);
    };
    let content = form.into_inner().content;
    state
        .documents
        .write(&name, content.as_bytes())
        .await
        .map_err(storage_error)?;
    info!(document = name.as_str(), bytes = content.len(), "document updated");
    session.set_flash(format!("{name} has been updated."))?;
    Ok(views::redirect_home())
}

/// Delete a document.
#[post("/{filename}/delete")]
pub async fn delete_document(
    _user: SignedIn,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let raw = path.into_inner();
    let Ok(name) = DocumentName::from_path(&raw) else {
        return missing(&session, &raw);
    };
    match state.documents.delete(&name).await {
        Ok(()) => {
            info!(document = name.as_str(), "document deleted");
            session.set_flash(format!("{name} has been deleted"))?;
            Ok(views::redirect_home())
        }
        Err(DocumentRepositoryError::NotFound { .. }) => missing(&session, &raw),
        Err(error) => Err(storage_error(error)),
    }
}
