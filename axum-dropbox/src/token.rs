use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DropboxError;

/// An OAuth 1.0 credential pair, used for request tokens, access tokens and
/// the application's own consumer key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub key: String,
    pub secret: String,
}

impl OAuthToken {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Parses the form encoded body the token endpoints answer with, e.g.
    /// `oauth_token_secret=b&oauth_token=a`.
    pub fn from_form(body: &str) -> Result<Self, DropboxError> {
        #[derive(Deserialize)]
        struct TokenForm {
            oauth_token: String,
            oauth_token_secret: String,
        }

        let form: TokenForm = serde_urlencoded::from_str(body)
            .map_err(|e| DropboxError::InvalidResponse(format!("malformed token: {e}")))?;

        Ok(Self::new(form.oauth_token, form.oauth_token_secret))
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("key", &self.key)
            .field("secret", &"..")
            .finish()
    }
}
