use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Response,
};
use cookie_monster::CookieJar;
use http::{HeaderMap, Uri};

use crate::{
    DropboxConfig, DropboxContextBuilder, DropboxError,
    builder::DropboxContextInner,
    cache::DropboxCache,
    cookie::{SessionState, SignedCookie},
    extract::Dropbox,
    provider::{DropboxSession, Endpoints},
    routing::{CALLBACK_ENDPOINT, LOGIN_ENDPOINT, LOGOUT_ENDPOINT, UrlMap},
    utils::host_url,
    views::CallbackError,
};

/// The extension instance. Build it once at startup and hand it to the
/// router with [`RouterExt::with_dropbox`](crate::RouterExt::with_dropbox)
/// and to your own handlers through state.
#[derive(Clone)]
pub struct DropboxContext(pub(crate) Arc<DropboxContextInner>);

impl DropboxContext {
    pub fn builder() -> DropboxContextBuilder {
        DropboxContextBuilder::new()
    }

    pub fn from_config(config: DropboxConfig) -> Result<Self, crate::ConfigError> {
        DropboxContextBuilder::new().config(config).try_build()
    }

    pub fn config(&self) -> &DropboxConfig {
        &self.0.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.0.endpoints
    }

    pub fn urls(&self) -> &UrlMap {
        &self.0.urls
    }

    pub fn session_cookie(&self) -> &SignedCookie {
        &self.0.cookie
    }

    /// A new provider session from the configured key, secret and access type.
    pub fn new_session(&self) -> Result<DropboxSession, DropboxError> {
        let config = &self.0.config;
        DropboxSession::new(
            config.key.clone(),
            config.secret.clone(),
            &config.access_type,
            self.0.endpoints.clone(),
            self.0.http_client.clone(),
        )
    }

    pub fn callback_path(&self) -> &str {
        self.0.urls.safe_url_for(CALLBACK_ENDPOINT)
    }

    pub fn logout_path(&self) -> &str {
        self.0.urls.safe_url_for(LOGOUT_ENDPOINT)
    }

    pub fn login_path(&self) -> Option<&str> {
        self.0.urls.url_for(LOGIN_ENDPOINT).ok()
    }

    /// Where to send the user after logging in.
    pub fn login_redirect(&self) -> &str {
        let target = self.0.config.login_redirect.as_deref().unwrap_or("/");
        self.0.urls.safe_url_for(target)
    }

    /// Where to send the user after logging out.
    pub fn logout_redirect(&self) -> &str {
        let target = self.0.config.logout_redirect.as_deref().unwrap_or("/");
        self.0.urls.safe_url_for(target)
    }

    pub(crate) fn render_callback_error(&self, error: &CallbackError) -> Response {
        self.0
            .renderer
            .render(self.0.config.callback_template(), error)
    }

    /// The per request handle for a request with these headers.
    pub fn load(&self, headers: &HeaderMap, uri: &Uri) -> Dropbox {
        let jar = CookieJar::from_headers(headers);
        let state: SessionState = self.0.cookie.decode(&jar).unwrap_or_default();

        Dropbox::new(
            self.clone(),
            jar,
            state,
            DropboxCache::new(self.0.config.cache_storage),
            host_url(headers, uri, self.0.trust_forwarded_headers),
        )
    }
}

impl<S> FromRequestParts<S> for DropboxContext
where
    DropboxContext: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_ref(state))
    }
}
