use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// Returned when the extension can't be built from the supplied configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("please, supply {0:?} config value first")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {name:?}")]
    Invalid { name: &'static str, value: String },
    #[error("could not parse {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("mount path should be empty or start with '/', got {0:?}")]
    InvalidMountPath(String),
    #[error("could not build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DropboxError {
    #[error("please, login with Dropbox first")]
    NotAuthenticated,
    #[error("invalid access type {0:?}, expected \"app_folder\" or \"dropbox\"")]
    InvalidAccessType(String),
    #[error("dropbox responded with {status}: {message}")]
    Provider { status: StatusCode, message: String },
    #[error("request to dropbox failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response from dropbox: {0}")]
    InvalidResponse(String),
}

impl DropboxError {
    pub fn status(&self) -> StatusCode {
        match self {
            DropboxError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            DropboxError::Provider { .. }
            | DropboxError::Http(_)
            | DropboxError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            DropboxError::InvalidAccessType(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DropboxError {
    fn into_response(self) -> Response {
        tracing::debug!("dropbox error: {self}");
        (self.status(), self.to_string()).into_response()
    }
}
