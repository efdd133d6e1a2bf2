//! Reverse routing by endpoint name.
use std::{borrow::Cow, collections::HashMap};

pub const CALLBACK_ENDPOINT: &str = "dropbox.callback";
pub const LOGOUT_ENDPOINT: &str = "dropbox.logout";
pub const LOGIN_ENDPOINT: &str = "dropbox.login";

#[derive(Debug, thiserror::Error)]
#[error("could not build url for endpoint {0:?}")]
pub struct BuildError(pub String);

/// Endpoint names mapped to paths.
#[derive(Debug, Clone, Default)]
pub struct UrlMap {
    routes: HashMap<Cow<'static, str>, String>,
}

impl UrlMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<Cow<'static, str>>, path: impl Into<String>) {
        self.routes.insert(name.into(), path.into());
    }

    pub fn url_for(&self, name: &str) -> Result<&str, BuildError> {
        self.routes
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| BuildError(name.to_owned()))
    }

    /// Like [`url_for`](Self::url_for), but unknown names are used as the
    /// path itself.
    pub fn safe_url_for<'a>(&'a self, target: &'a str) -> &'a str {
        self.url_for(target).unwrap_or(target)
    }
}

#[cfg(test)]
mod routing {
    use super::UrlMap;

    #[test]
    fn url_for() {
        let mut urls = UrlMap::new();
        urls.insert("dropbox.callback", "/dropbox/callback");
        urls.insert(String::from("home"), "/");

        assert_eq!(urls.url_for("dropbox.callback").unwrap(), "/dropbox/callback");
        assert_eq!(urls.url_for("home").unwrap(), "/");
        assert!(urls.url_for("files").is_err());
    }

    #[test]
    fn safe_url_for() {
        let mut urls = UrlMap::new();
        urls.insert("home", "/");

        assert_eq!(urls.safe_url_for("home"), "/");
        assert_eq!(urls.safe_url_for("/files"), "/files");
        assert_eq!(urls.safe_url_for("http://example.com/"), "http://example.com/");
    }
}
