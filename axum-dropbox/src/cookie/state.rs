use serde::{Deserialize, Serialize};

use crate::OAuthToken;

pub const REQUEST_TOKEN_KEY: &str = "dropbox_request_token";
pub const ACCESS_TOKEN_KEY: &str = "dropbox_access_token";

/// What the session cookie carries between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(
        rename = "dropbox_request_token",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) request_token: Option<OAuthToken>,
    #[serde(
        rename = "dropbox_access_token",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) access_token: Option<OAuthToken>,
}

impl SessionState {
    pub fn request_token(&self) -> Option<&OAuthToken> {
        self.request_token.as_ref()
    }

    pub fn access_token(&self) -> Option<&OAuthToken> {
        self.access_token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.request_token.is_none() && self.access_token.is_none()
    }
}
