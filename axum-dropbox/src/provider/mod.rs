//! The Dropbox side of the flow: token exchange and the REST client.
mod client;
mod session;
mod types;

pub use client::DropboxClient;
pub use session::{AccessType, DropboxSession};
pub use types::{AccountInfo, MediaLink, Metadata, QuotaInfo};

use http::StatusCode;
use reqwest::Response;
use url::Url;

use crate::DropboxError;

pub const API_URL: &str = "https://api.dropbox.com";
pub const CONTENT_URL: &str = "https://api-content.dropbox.com";
pub const WWW_URL: &str = "https://www.dropbox.com";

/// Hosts the session and client talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api: Url,
    pub content: Url,
    pub www: Url,
}

impl Endpoints {
    pub fn new(api: Url, content: Url, www: Url) -> Self {
        Self { api, content, www }
    }

    pub(crate) fn api_url(&self, path: &str) -> Url {
        join(&self.api, path)
    }

    pub(crate) fn content_url(&self, path: &str) -> Url {
        join(&self.content, path)
    }

    pub(crate) fn www_url(&self, path: &str) -> Url {
        join(&self.www, path)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: Url::parse(API_URL).expect("valid api url"),
            content: Url::parse(CONTENT_URL).expect("valid content url"),
            www: Url::parse(WWW_URL).expect("valid www url"),
        }
    }
}

fn join(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    url.set_path(&format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    ));
    url
}

/// Turns a non 2xx response into [`DropboxError::Provider`], picking the
/// message from the `error` field Dropbox puts in its JSON bodies.
pub(crate) async fn error_for_status(res: Response) -> Result<Response, DropboxError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let message = provider_message(status, &body);
    tracing::debug!("dropbox returned {status}: {message}");

    Err(DropboxError::Provider { status, message })
}

fn provider_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => match json.get("error") {
            Some(serde_json::Value::String(error)) => error.clone(),
            Some(error) => error.to_string(),
            None => body.to_owned(),
        },
        Err(_) if !body.trim().is_empty() => body.trim().to_owned(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_owned(),
    }
}

#[cfg(test)]
mod provider {
    use http::StatusCode;
    use url::Url;

    use super::{Endpoints, join, provider_message};

    #[test]
    fn join_paths() {
        let base = Url::parse("http://127.0.0.1:4000").unwrap();
        assert_eq!(
            join(&base, "/1/oauth/request_token").as_str(),
            "http://127.0.0.1:4000/1/oauth/request_token"
        );

        let base = Url::parse("http://127.0.0.1:4000/proxy/").unwrap();
        assert_eq!(
            join(&base, "1/account/info").as_str(),
            "http://127.0.0.1:4000/proxy/1/account/info"
        );

        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.www_url("/1/oauth/authorize").as_str(),
            "https://www.dropbox.com/1/oauth/authorize"
        );
    }

    #[test]
    fn messages() {
        assert_eq!(
            provider_message(StatusCode::UNAUTHORIZED, r#"{"error": "Token is disabled."}"#),
            "Token is disabled."
        );
        assert_eq!(
            provider_message(StatusCode::BAD_REQUEST, r#"{"error": {"path": "bad"}}"#),
            r#"{"path":"bad"}"#
        );
        assert_eq!(provider_message(StatusCode::BAD_GATEWAY, "oops "), "oops");
        assert_eq!(provider_message(StatusCode::NOT_FOUND, ""), "Not Found");
    }
}
