use std::{collections::HashMap, env, fmt};

use crate::{CacheStorage, ConfigError};

pub(crate) const DROPBOX_KEY: &str = "DROPBOX_KEY";
pub(crate) const DROPBOX_SECRET: &str = "DROPBOX_SECRET";
pub(crate) const DROPBOX_ACCESS_TYPE: &str = "DROPBOX_ACCESS_TYPE";
pub(crate) const DROPBOX_CALLBACK_URL: &str = "DROPBOX_CALLBACK_URL";
pub(crate) const DROPBOX_CALLBACK_TEMPLATE: &str = "DROPBOX_CALLBACK_TEMPLATE";
pub(crate) const DROPBOX_LOGIN_REDIRECT: &str = "DROPBOX_LOGIN_REDIRECT";
pub(crate) const DROPBOX_LOGOUT_REDIRECT: &str = "DROPBOX_LOGOUT_REDIRECT";
pub(crate) const DROPBOX_CACHE_STORAGE: &str = "DROPBOX_CACHE_STORAGE";

pub(crate) const DEFAULT_CALLBACK_TEMPLATE: &str = "dropbox/callback.html";

/// Settings read from the application's configuration.
///
/// `key`, `secret` and `access_type` are required, everything else is
/// optional. Empty values count as missing.
#[derive(Clone, PartialEq, Eq)]
pub struct DropboxConfig {
    pub key: String,
    pub secret: String,
    /// `app_folder` or `dropbox`. Checked when the provider session is built.
    pub access_type: String,
    /// Absolute or host relative url Dropbox redirects back to.
    pub callback_url: Option<String>,
    /// Template the callback error renderer receives.
    pub callback_template: Option<String>,
    pub login_redirect: Option<String>,
    pub logout_redirect: Option<String>,
    pub cache_storage: CacheStorage,
}

impl DropboxConfig {
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        access_type: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            access_type: access_type.into(),
            callback_url: None,
            callback_template: None,
            login_redirect: None,
            logout_redirect: None,
            cache_storage: CacheStorage::default(),
        }
    }

    /// Reads the `DROPBOX_*` settings through `lookup`.
    pub fn from_lookup(
        mut lookup: impl FnMut(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let key = get(DROPBOX_KEY).ok_or(ConfigError::Missing(DROPBOX_KEY))?;
        let secret = get(DROPBOX_SECRET).ok_or(ConfigError::Missing(DROPBOX_SECRET))?;
        let access_type = get(DROPBOX_ACCESS_TYPE).ok_or(ConfigError::Missing(DROPBOX_ACCESS_TYPE))?;

        let cache_storage = match get(DROPBOX_CACHE_STORAGE) {
            Some(value) => value.parse()?,
            None => CacheStorage::default(),
        };

        Ok(Self {
            key,
            secret,
            access_type,
            callback_url: get(DROPBOX_CALLBACK_URL),
            callback_template: get(DROPBOX_CALLBACK_TEMPLATE),
            login_redirect: get(DROPBOX_LOGIN_REDIRECT),
            logout_redirect: get(DROPBOX_LOGOUT_REDIRECT),
            cache_storage,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_map<V: AsRef<str>>(map: &HashMap<String, V>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| map.get(name).map(|value| value.as_ref().to_owned()))
    }

    pub fn callback_template(&self) -> &str {
        self.callback_template
            .as_deref()
            .unwrap_or(DEFAULT_CALLBACK_TEMPLATE)
    }

    pub(crate) fn into_pairs(self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (DROPBOX_KEY, self.key),
            (DROPBOX_SECRET, self.secret),
            (DROPBOX_ACCESS_TYPE, self.access_type),
            (DROPBOX_CACHE_STORAGE, self.cache_storage.as_str().to_owned()),
        ];

        let optional = [
            (DROPBOX_CALLBACK_URL, self.callback_url),
            (DROPBOX_CALLBACK_TEMPLATE, self.callback_template),
            (DROPBOX_LOGIN_REDIRECT, self.login_redirect),
            (DROPBOX_LOGOUT_REDIRECT, self.logout_redirect),
        ];

        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v))),
        );
        pairs
    }
}

impl fmt::Debug for DropboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropboxConfig")
            .field("key", &self.key)
            .field("secret", &"..")
            .field("access_type", &self.access_type)
            .field("callback_url", &self.callback_url)
            .field("callback_template", &self.callback_template)
            .field("login_redirect", &self.login_redirect)
            .field("logout_redirect", &self.logout_redirect)
            .field("cache_storage", &self.cache_storage)
            .finish()
    }
}
