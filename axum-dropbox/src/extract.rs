use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use cookie_monster::CookieJar;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::{
    DropboxContext, DropboxError, OAuthToken,
    cache::DropboxCache,
    cookie::SessionState,
    provider::{AccountInfo, DropboxClient, DropboxSession},
};

/// Name the [`TemplateContext`] is injected under.
pub const TEMPLATE_CONTEXT_NAME: &str = "dropbox";

/// What templates get to know about the current visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateContext {
    pub is_authenticated: bool,
    pub logout_url: String,
    pub login_path: Option<String>,
}

/// Per request handle on the Dropbox session of the current visitor.
///
/// Changes to the session state only reach the browser when the handle is
/// returned as part of the response:
///
/// ```rust,ignore
/// async fn logout(mut dropbox: Dropbox) -> impl IntoResponse {
///     dropbox.logout();
///     (dropbox, Redirect::to("/"))
/// }
/// ```
pub struct Dropbox {
    context: DropboxContext,
    jar: CookieJar,
    state: SessionState,
    cache: DropboxCache,
    host_url: String,
    modified: bool,
}

impl Dropbox {
    pub(crate) fn new(
        context: DropboxContext,
        jar: CookieJar,
        state: SessionState,
        cache: DropboxCache,
        host_url: String,
    ) -> Self {
        Self {
            context,
            jar,
            state,
            cache,
            host_url,
            modified: false,
        }
    }

    pub fn context(&self) -> &DropboxContext {
        &self.context
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn cache(&self) -> &DropboxCache {
        &self.cache
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn session(&mut self) -> Result<&DropboxSession, DropboxError> {
        let session = match self.cache.reuse_session() {
            Some(session) => session,
            None => self.context.new_session()?,
        };
        Ok(&*self.cache.session.insert(session))
    }

    /// The REST client of the logged in user.
    pub fn client(&mut self) -> Result<&DropboxClient, DropboxError> {
        let Some(access_token) = self.state.access_token.clone() else {
            return Err(DropboxError::NotAuthenticated);
        };

        let client = match self.cache.reuse_client() {
            Some(client) => client,
            None => DropboxClient::new(self.session()?.clone(), access_token),
        };
        Ok(&*self.cache.client.insert(client))
    }

    pub async fn account_info(&mut self) -> Result<&AccountInfo, DropboxError> {
        let info = match self.cache.reuse_account_info() {
            Some(info) => info,
            None => self.client()?.account_info().await?,
        };
        Ok(&*self.cache.account_info.insert(info))
    }

    /// Obtains a new request token and stores it in the session, replacing
    /// the previous one.
    pub async fn request_token(&mut self) -> Result<&OAuthToken, DropboxError> {
        let request_token = self.session()?.obtain_request_token().await?;

        self.modified = true;
        Ok(&*self.state.request_token.insert(request_token))
    }

    /// Url to send the visitor to for logging in with Dropbox.
    pub async fn login_url(&mut self) -> Result<Url, DropboxError> {
        let callback = self.callback_url();
        let request_token = self.request_token().await?.clone();

        Ok(self
            .session()?
            .build_authorize_url(&request_token, Some(&callback)))
    }

    /// Absolute url Dropbox redirects back to after the visitor granted
    /// access.
    pub fn callback_url(&self) -> String {
        let url = self
            .context
            .config()
            .callback_url
            .as_deref()
            .unwrap_or_else(|| self.context.callback_path());

        if url.starts_with(&self.host_url)
            || url.starts_with("http://")
            || url.starts_with("https://")
        {
            return url.to_owned();
        }

        format!(
            "{}/{}",
            self.host_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }

    pub fn logout_url(&self) -> &str {
        self.context.logout_path()
    }

    /// Exchanges `request_token` for an access token and stores it.
    pub async fn login(&mut self, request_token: &OAuthToken) -> Result<(), DropboxError> {
        let access_token = self.session()?.obtain_access_token(request_token).await?;

        tracing::debug!("dropbox login done");
        self.state.access_token = Some(access_token);
        self.state.request_token = None;
        self.modified = true;
        self.cache.invalidate();
        Ok(())
    }

    pub fn logout(&mut self) {
        if self.state.access_token.take().is_some() {
            tracing::debug!("dropbox logout");
            self.modified = true;
        }
        self.cache.invalidate();
    }

    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate();
    }

    pub fn template_context(&self) -> TemplateContext {
        TemplateContext {
            is_authenticated: self.is_authenticated(),
            logout_url: self.logout_url().to_owned(),
            login_path: self.context.login_path().map(str::to_owned),
        }
    }

    /// Adds the [`TemplateContext`] to a template's context map.
    pub fn inject_into(&self, map: &mut Map<String, Value>) {
        let context = self.template_context();
        map.insert(
            TEMPLATE_CONTEXT_NAME.to_owned(),
            serde_json::json!({
                "is_authenticated": context.is_authenticated,
                "logout_url": context.logout_url,
                "login_path": context.login_path,
            }),
        );
    }

    /// The request's cookies with the session cookie updated when the session
    /// state changed.
    pub fn into_cookie_jar(mut self) -> CookieJar {
        if !self.modified {
            return self.jar;
        }

        let signed = self.context.session_cookie();
        if self.state.is_empty() {
            self.jar.remove(signed.cookie_builder().clone());
            return self.jar;
        }

        match signed.encode(&self.state) {
            Ok(cookie) => {
                self.jar.add(cookie);
            }
            Err(e) => tracing::error!("could not encode dropbox session: {e}"),
        }
        self.jar
    }
}

impl<S> FromRequestParts<S> for Dropbox
where
    DropboxContext: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = DropboxContext::from_ref(state);
        Ok(context.load(&parts.headers, &parts.uri))
    }
}

impl IntoResponseParts for Dropbox {
    type Error = <CookieJar as IntoResponseParts>::Error;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.into_cookie_jar().into_response_parts(res)
    }
}
