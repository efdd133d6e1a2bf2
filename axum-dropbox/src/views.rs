//! Handlers behind the routes [`RouterExt::with_dropbox`](crate::RouterExt::with_dropbox)
//! adds, and the rendering of failed logins.
use axum::{
    extract::Query,
    response::{Html, IntoResponse, Redirect, Response},
};
use http::StatusCode;
use serde::Deserialize;

use crate::{Dropbox, DropboxError};

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub oauth_token: Option<String>,
}

/// Why the callback could not log the visitor in.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("Dropbox did not send an oauth token")]
    MissingToken,
    #[error("the oauth token does not match the request token of this session")]
    TokensNotEqual,
    #[error("Dropbox refused the login: {0}")]
    Provider(#[from] DropboxError),
}

impl CallbackError {
    pub fn status(&self) -> StatusCode {
        match self {
            CallbackError::MissingToken | CallbackError::TokensNotEqual => StatusCode::BAD_REQUEST,
            CallbackError::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Turns a failed callback into a page. `template` is the configured
/// callback template name, for renderers backed by a template engine.
pub trait CallbackRenderer: Send + Sync + 'static {
    fn render(&self, template: &str, error: &CallbackError) -> Response;
}

impl<F> CallbackRenderer for F
where
    F: Fn(&str, &CallbackError) -> Response + Send + Sync + 'static,
{
    fn render(&self, template: &str, error: &CallbackError) -> Response {
        self(template, error)
    }
}

/// Minimal html page with the error message.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRenderer;

impl CallbackRenderer for DefaultRenderer {
    fn render(&self, _template: &str, error: &CallbackError) -> Response {
        let page = format!(
            "<!doctype html>\n<html>\n<head><title>Dropbox login failed</title></head>\n\
             <body>\n<h1>Dropbox login failed</h1>\n<p>{}</p>\n<p><a href=\"/\">Back</a></p>\n\
             </body>\n</html>\n",
            escape_html(&error.to_string())
        );

        (error.status(), Html(page)).into_response()
    }
}

/// Escapes `value` for use in html text and attribute values.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub(crate) async fn callback(mut dropbox: Dropbox, Query(params): Query<CallbackParams>) -> Response {
    tracing::debug!("handling dropbox callback");
    let context = dropbox.context().clone();

    match complete_login(&mut dropbox, params).await {
        Ok(()) => (dropbox, Redirect::to(context.login_redirect())).into_response(),
        Err(e) => {
            tracing::debug!("dropbox callback failed: {e}");
            context.render_callback_error(&e)
        }
    }
}

async fn complete_login(dropbox: &mut Dropbox, params: CallbackParams) -> Result<(), CallbackError> {
    let oauth_token = params
        .oauth_token
        .filter(|token| !token.is_empty())
        .ok_or(CallbackError::MissingToken)?;

    let request_token = dropbox
        .state()
        .request_token()
        .filter(|token| token.key == oauth_token)
        .cloned()
        .ok_or(CallbackError::TokensNotEqual)?;

    dropbox.login(&request_token).await?;
    Ok(())
}

pub(crate) async fn logout(mut dropbox: Dropbox) -> Response {
    dropbox.logout();

    let target = dropbox.context().logout_redirect().to_owned();
    (dropbox, Redirect::to(&target)).into_response()
}

pub(crate) async fn login(mut dropbox: Dropbox) -> Result<Response, DropboxError> {
    tracing::debug!("starting dropbox login flow");
    let url = dropbox.login_url().await?;

    Ok((dropbox, Redirect::to(url.as_str())).into_response())
}
