//! HTML views rendered with maud.
//!
//! Every interpolated value is escaped by maud; only markdown output is
//! inserted pre-escaped.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::{self, ContentType};
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::domain::{DocumentName, Username};

/// Per-request values shown by the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    /// Flash message consumed for this page.
    pub flash: Option<String>,
    /// Signed-in user, if any.
    pub username: Option<Username>,
}

/// Wrap `content` in the shared page layout.
pub fn layout(ctx: &PageContext, title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) " | CMS" }
            }
            body {
                @if let Some(message) = &ctx.flash {
                    div class="flash" { p { (message) } }
                }
                main { (content) }
                footer {
                    @if let Some(user) = &ctx.username {
                        p class="user-status" { "Signed in as " (user.as_str()) "." }
                        form method="post" action="/signout" {
                            button type="submit" { "Sign Out" }
                        }
                    } @else {
                        p class="user-status" { a href="/signin" { "Sign In" } }
                    }
                }
            }
        }
    }
}

fn inline_error(error: Option<&str>) -> Markup {
    html! {
        @if let Some(error) = error {
            p class="error" { (error) }
        }
    }
}

/// Document list.
pub fn index(ctx: &PageContext, names: &[DocumentName]) -> Markup {
    let content = html! {
        h1 { "Documents" }
        ul class="documents" {
            @for name in names {
                li {
                    a href={ "/" (name.as_str()) } { (name.as_str()) }
                    " "
                    a href={ "/" (name.as_str()) "/edit" } { "edit" }
                    form class="inline" method="post" action={ "/" (name.as_str()) "/delete" } {
                        button type="submit" { "delete" }
                    }
                }
            }
        }
        p { a href="/new" { "New Document" } }
    };
    layout(ctx, "Documents", content)
}

/// Sign-in form, optionally pre-filled and carrying an inline error.
pub fn sign_in_form(ctx: &PageContext, username: &str, error: Option<&str>) -> Markup {
    let content = html! {
        h1 { "Sign In" }
        (inline_error(error))
        form method="post" action="/signin" {
            div {
                label for="username" { "Username" }
                input id="username" name="username" type="text" value=(username);
            }
            div {
                label for="password" { "Password" }
                input id="password" name="password" type="password";
            }
            button type="submit" { "Sign In" }
        }
    };
    layout(ctx, "Sign In", content)
}

/// New-document form.
pub fn new_document_form(ctx: &PageContext, filename: &str, error: Option<&str>) -> Markup {
    let content = html! {
        h1 { "New Document" }
        (inline_error(error))
        form method="post" action="/create" {
            label for="filename" { "Add a new document:" }
            input id="filename" name="filename" type="text" value=(filename);
            button type="submit" { "Create" }
        }
    };
    layout(ctx, "New Document", content)
}

/// Edit form pre-filled with the current content.
pub fn edit_document_form(ctx: &PageContext, name: &DocumentName, content: &str) -> Markup {
    let body = html! {
        p { "Edit content of " (name.as_str()) ":" }
        form method="post" action={ "/" (name.as_str()) } {
            textarea name="content" rows="20" cols="100" { (content) }
            button type="submit" { "Save Changes" }
        }
    };
    layout(ctx, name.as_str(), body)
}

/// Markdown document rendered to HTML.
pub fn markdown_document(ctx: &PageContext, name: &DocumentName, rendered: &str) -> Markup {
    let body = html! {
        article class="document" { (PreEscaped(rendered)) }
    };
    layout(ctx, name.as_str(), body)
}

/// Bare error page used by the error mapping.
pub fn error_page(status: StatusCode, message: &str) -> Markup {
    let title = status.canonical_reason().unwrap_or("Error");
    let content = html! {
        h1 { (title) }
        p { (message) }
        p { a href="/" { "Back to documents" } }
    };
    layout(&PageContext::default(), title, content)
}

/// Build an HTML response with `status`.
pub fn html_response(status: StatusCode, markup: Markup) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(markup.into_string())
}

/// `302 Found` redirect to the document list.
pub fn redirect_home() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> DocumentName {
        DocumentName::parse(raw).expect("valid name")
    }

    fn signed_in(flash: Option<&str>) -> PageContext {
        PageContext {
            flash: flash.map(str::to_owned),
            username: Some(Username::new("admin").expect("valid username")),
        }
    }

    #[test]
    fn layout_shows_flash_and_user() {
        let page = index(&signed_in(Some("Welcome!")), &[]).into_string();
        assert!(page.contains("Welcome!"));
        assert!(page.contains("Signed in as admin"));
        assert!(page.contains(r#"action="/signout""#));
    }

    #[test]
    fn layout_offers_sign_in_when_anonymous() {
        let page = index(&PageContext::default(), &[]).into_string();
        assert!(page.contains(r#"<a href="/signin">Sign In</a>"#));
        assert!(!page.contains("Signed in as"));
    }

    #[test]
    fn index_links_each_document() {
        let page = index(&signed_in(None), &[name("about.md"), name("changes.txt")]).into_string();
        assert!(page.contains(r#"href="/about.md""#));
        assert!(page.contains(r#"href="/changes.txt/edit""#));
        assert!(page.contains(r#"action="/changes.txt/delete""#));
    }

    #[test]
    fn values_are_escaped() {
        let page = edit_document_form(&signed_in(None), &name("a.txt"), "<script>x</script>")
            .into_string();
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn markdown_is_inserted_unescaped() {
        let page =
            markdown_document(&signed_in(None), &name("a.md"), "<h1>Ruby is...</h1>").into_string();
        assert!(page.contains("<h1>Ruby is...</h1>"));
    }

    #[test]
    fn forms_render_inline_errors() {
        let page = new_document_form(&signed_in(None), "", Some("A name is required")).into_string();
        assert!(page.contains("A name is required"));
        assert!(page.contains(r#"<button type="submit""#));
        assert!(page.contains("<input"));
    }
}
