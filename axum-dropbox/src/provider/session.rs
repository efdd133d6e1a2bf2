use std::{fmt, str::FromStr};

use http::header::AUTHORIZATION;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;
use url::Url;

use crate::{
    DropboxError, OAuthToken,
    provider::{Endpoints, error_for_status},
};

/// Characters OAuth 1.0 leaves unencoded (RFC 5849, section 3.6).
const OAUTH_UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    AppFolder,
    Dropbox,
}

impl AccessType {
    /// The root segment used in file paths.
    pub fn root(self) -> &'static str {
        match self {
            AccessType::AppFolder => "sandbox",
            AccessType::Dropbox => "dropbox",
        }
    }
}

impl FromStr for AccessType {
    type Err = DropboxError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "app_folder" => Ok(AccessType::AppFolder),
            "dropbox" => Ok(AccessType::Dropbox),
            _ => Err(DropboxError::InvalidAccessType(value.to_owned())),
        }
    }
}

/// The application's OAuth session with Dropbox.
#[derive(Clone)]
pub struct DropboxSession {
    consumer: OAuthToken,
    access_type: AccessType,
    endpoints: Endpoints,
    http: Client,
}

impl DropboxSession {
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        access_type: &str,
        endpoints: Endpoints,
        http: Client,
    ) -> Result<Self, DropboxError> {
        Ok(Self {
            consumer: OAuthToken::new(key, secret),
            access_type: access_type.parse()?,
            endpoints,
            http,
        })
    }

    pub fn access_type(&self) -> AccessType {
        self.access_type
    }

    pub fn root(&self) -> &'static str {
        self.access_type.root()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Builds a PLAINTEXT signed `Authorization` header, signing with `token`
    /// when there is one.
    pub fn authorization_header(&self, token: Option<&OAuthToken>) -> String {
        let signature = format!(
            "{}&{}",
            encode(&self.consumer.secret),
            token.map(|t| encode(&t.secret)).unwrap_or_default()
        );

        let mut params = vec![
            ("oauth_version", "1.0"),
            ("oauth_signature_method", "PLAINTEXT"),
            ("oauth_consumer_key", self.consumer.key.as_str()),
        ];
        if let Some(token) = token {
            params.push(("oauth_token", token.key.as_str()));
        }
        params.push(("oauth_signature", signature.as_str()));

        let params = params
            .into_iter()
            .map(|(name, value)| format!("{name}=\"{}\"", encode(value)))
            .collect::<Vec<_>>()
            .join(", ");

        format!("OAuth {params}")
    }

    pub async fn obtain_request_token(&self) -> Result<OAuthToken, DropboxError> {
        tracing::debug!("obtaining dropbox request token");
        self.token_request("/1/oauth/request_token", None).await
    }

    /// The url the user grants access at. Dropbox redirects back to
    /// `callback` afterwards.
    pub fn build_authorize_url(&self, request_token: &OAuthToken, callback: Option<&str>) -> Url {
        let mut url = self.endpoints.www_url("/1/oauth/authorize");
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("oauth_token", &request_token.key);
            if let Some(callback) = callback {
                query.append_pair("oauth_callback", callback);
            }
        }
        url
    }

    pub async fn obtain_access_token(
        &self,
        request_token: &OAuthToken,
    ) -> Result<OAuthToken, DropboxError> {
        tracing::debug!("exchanging request token for an access token");
        self.token_request("/1/oauth/access_token", Some(request_token))
            .await
    }

    async fn token_request(
        &self,
        path: &str,
        token: Option<&OAuthToken>,
    ) -> Result<OAuthToken, DropboxError> {
        let res = self
            .http
            .post(self.endpoints.api_url(path))
            .header(AUTHORIZATION, self.authorization_header(token))
            .send()
            .await?;

        let body = error_for_status(res).await?.text().await?;
        OAuthToken::from_form(&body)
    }
}

impl fmt::Debug for DropboxSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropboxSession")
            .field("consumer", &self.consumer)
            .field("access_type", &self.access_type)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_UNRESERVED).to_string()
}

#[cfg(test)]
mod session {
    use reqwest::Client;

    use crate::{
        DropboxError, OAuthToken,
        provider::{AccessType, DropboxSession, Endpoints},
    };

    fn session(access_type: &str) -> Result<DropboxSession, DropboxError> {
        DropboxSession::new(
            "app key",
            "s&cret",
            access_type,
            Endpoints::default(),
            Client::new(),
        )
    }

    #[test]
    fn access_types() {
        assert_eq!(session("app_folder").unwrap().root(), "sandbox");
        assert_eq!(session("dropbox").unwrap().root(), "dropbox");
        assert_eq!(
            session("dropbox").unwrap().access_type(),
            AccessType::Dropbox
        );

        assert!(matches!(
            session("wrong-access-type"),
            Err(DropboxError::InvalidAccessType(t)) if t == "wrong-access-type"
        ));
    }

    #[test]
    fn plaintext_header() {
        let session = session("app_folder").unwrap();

        assert_eq!(
            session.authorization_header(None),
            "OAuth oauth_version=\"1.0\", oauth_signature_method=\"PLAINTEXT\", \
             oauth_consumer_key=\"app%20key\", oauth_signature=\"s%2526cret%26\""
        );

        let token = OAuthToken::new("tok", "tok-secret");
        let header = session.authorization_header(Some(&token));
        assert!(header.contains("oauth_token=\"tok\""));
        assert!(header.ends_with("oauth_signature=\"s%2526cret%26tok-secret\""));
    }

    #[test]
    fn authorize_url() {
        let session = session("app_folder").unwrap();
        let token = OAuthToken::new("request-key", "request-secret");

        let url = session.build_authorize_url(&token, Some("http://localhost/dropbox/callback"));

        assert_eq!(url.host_str(), Some("www.dropbox.com"));
        assert_eq!(url.path(), "/1/oauth/authorize");
        assert_eq!(
            url.query(),
            Some(
                "oauth_token=request-key&oauth_callback=http%3A%2F%2Flocalhost%2Fdropbox%2Fcallback"
            )
        );

        let url = session.build_authorize_url(&token, None);
        assert_eq!(url.query(), Some("oauth_token=request-key"));
        assert!(!url.as_str().contains("request-secret"));
    }
}
