use std::{borrow::Cow, collections::HashMap, sync::Arc};

use cookie_monster::CookieBuilder;
use reqwest::Client as HttpClient;
use url::Url;

use crate::{
    CacheStorage, ConfigError, DropboxConfig, DropboxContext,
    config::{
        DROPBOX_ACCESS_TYPE, DROPBOX_CACHE_STORAGE, DROPBOX_CALLBACK_TEMPLATE,
        DROPBOX_CALLBACK_URL, DROPBOX_KEY, DROPBOX_LOGIN_REDIRECT, DROPBOX_LOGOUT_REDIRECT,
        DROPBOX_SECRET,
    },
    cookie::{SignedCookie, SignedCookieBuilder},
    http::default_reqwest_client,
    provider::{API_URL, CONTENT_URL, Endpoints, WWW_URL},
    routing::{CALLBACK_ENDPOINT, LOGIN_ENDPOINT, LOGOUT_ENDPOINT, UrlMap},
    views::{CallbackRenderer, DefaultRenderer},
};

static DEFAULT_MOUNT_PATH: &str = "/dropbox";

pub(crate) struct DropboxContextInner {
    pub(crate) config: DropboxConfig,
    pub(crate) endpoints: Endpoints,
    pub(crate) http_client: HttpClient,
    pub(crate) cookie: SignedCookie,
    pub(crate) urls: UrlMap,
    pub(crate) mount_path: String,
    pub(crate) login_path: Option<String>,
    pub(crate) trust_forwarded_headers: bool,
    pub(crate) renderer: Box<dyn CallbackRenderer>,
}

pub struct DropboxContextBuilder {
    values: HashMap<&'static str, String>,
    cookie_builder: SignedCookieBuilder,
    http_client: Option<HttpClient>,
    api_url: Option<String>,
    content_url: Option<String>,
    www_url: Option<String>,
    mount_path: Cow<'static, str>,
    login_path: Option<Cow<'static, str>>,
    routes: Vec<(Cow<'static, str>, String)>,
    trust_forwarded_headers: bool,
    renderer: Option<Box<dyn CallbackRenderer>>,
}

impl DropboxContextBuilder {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            cookie_builder: SignedCookieBuilder::new(),
            http_client: None,
            api_url: None,
            content_url: None,
            www_url: None,
            mount_path: Cow::Borrowed(DEFAULT_MOUNT_PATH),
            login_path: None,
            routes: Vec::new(),
            trust_forwarded_headers: false,
            renderer: None,
        }
    }

    /// Copies every value of `config`, overriding what was set before.
    pub fn config(mut self, config: DropboxConfig) -> Self {
        self.values.extend(config.into_pairs());
        self
    }

    /// Reads the `DROPBOX_*` environment variables that are set.
    pub fn config_env(mut self) -> Self {
        for name in [
            DROPBOX_KEY,
            DROPBOX_SECRET,
            DROPBOX_ACCESS_TYPE,
            DROPBOX_CALLBACK_URL,
            DROPBOX_CALLBACK_TEMPLATE,
            DROPBOX_LOGIN_REDIRECT,
            DROPBOX_LOGOUT_REDIRECT,
            DROPBOX_CACHE_STORAGE,
        ] {
            if let Ok(value) = std::env::var(name) {
                self.values.insert(name, value);
            }
        }
        self
    }

    fn set(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    pub fn key(self, key: impl Into<String>) -> Self {
        self.set(DROPBOX_KEY, key)
    }

    pub fn secret(self, secret: impl Into<String>) -> Self {
        self.set(DROPBOX_SECRET, secret)
    }

    /// `app_folder` or `dropbox`.
    pub fn access_type(self, access_type: impl Into<String>) -> Self {
        self.set(DROPBOX_ACCESS_TYPE, access_type)
    }

    pub fn callback_url(self, url: impl Into<String>) -> Self {
        self.set(DROPBOX_CALLBACK_URL, url)
    }

    pub fn callback_template(self, template: impl Into<String>) -> Self {
        self.set(DROPBOX_CALLBACK_TEMPLATE, template)
    }

    /// Endpoint name or path to redirect to after logging in, `/` by default.
    pub fn login_redirect(self, target: impl Into<String>) -> Self {
        self.set(DROPBOX_LOGIN_REDIRECT, target)
    }

    /// Endpoint name or path to redirect to after logging out, `/` by default.
    pub fn logout_redirect(self, target: impl Into<String>) -> Self {
        self.set(DROPBOX_LOGOUT_REDIRECT, target)
    }

    pub fn cache_storage(self, storage: CacheStorage) -> Self {
        self.set(DROPBOX_CACHE_STORAGE, storage.as_str())
    }

    /// Secret the session cookie is signed with. A random one is generated
    /// when missing, which logs everybody out on restart.
    pub fn cookie_secret(mut self, secret: impl AsRef<[u8]>) -> Self {
        self.cookie_builder.secret = Some(secret.as_ref().to_vec());
        self
    }

    pub fn cookie_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.cookie_builder.cookie_builder.set_name(name.into());
        self
    }

    pub fn cookie(mut self, f: impl FnOnce(CookieBuilder) -> CookieBuilder) -> Self {
        self.cookie_builder.cookie_builder = self.cookie_builder.cookie_builder.cookie(f);
        self
    }

    pub fn dev_cookie(mut self, f: impl FnOnce(CookieBuilder) -> CookieBuilder) -> Self {
        self.cookie_builder.cookie_builder = self.cookie_builder.cookie_builder.dev_cookie(f);
        self
    }

    pub fn use_dev_cookies(mut self, dev: bool) -> Self {
        self.cookie_builder.cookie_builder.dev = dev;
        self
    }

    pub fn use_normal_cookies(self, prod: bool) -> Self {
        self.use_dev_cookies(!prod)
    }

    pub fn http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn content_url(mut self, url: impl Into<String>) -> Self {
        self.content_url = Some(url.into());
        self
    }

    pub fn www_url(mut self, url: impl Into<String>) -> Self {
        self.www_url = Some(url.into());
        self
    }

    /// Prefix of the callback and logout routes, `/dropbox` by default.
    pub fn mount_path(mut self, path: impl Into<Cow<'static, str>>) -> Self {
        self.mount_path = path.into();
        self
    }

    /// Adds a route under the mount path that starts the login flow.
    pub fn login_path(mut self, path: impl Into<Cow<'static, str>>) -> Self {
        self.login_path = Some(path.into());
        self
    }

    /// Names a path so it can be used as a redirect target.
    pub fn route(mut self, name: impl Into<Cow<'static, str>>, path: impl Into<String>) -> Self {
        self.routes.push((name.into(), path.into()));
        self
    }

    /// Build the callback url from `X-Forwarded-Proto` and `X-Forwarded-Host`.
    /// Only enable this behind a proxy that sets or strips those headers.
    pub fn trust_forwarded_headers(mut self, trust: bool) -> Self {
        self.trust_forwarded_headers = trust;
        self
    }

    pub fn renderer(mut self, renderer: impl CallbackRenderer) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn build(self) -> DropboxContext {
        self.try_build().unwrap()
    }

    pub fn try_build(self) -> Result<DropboxContext, ConfigError> {
        let config = DropboxConfig::from_lookup(|name| self.values.get(name).cloned())?;

        let endpoints = Endpoints::new(
            parse_url("api url", self.api_url.as_deref().unwrap_or(API_URL))?,
            parse_url("content url", self.content_url.as_deref().unwrap_or(CONTENT_URL))?,
            parse_url("www url", self.www_url.as_deref().unwrap_or(WWW_URL))?,
        );

        let mount_path = normalize_path(&self.mount_path)?;
        let login_path = self
            .login_path
            .as_deref()
            .map(|path| normalize_path(path).map(|path| format!("{mount_path}{path}")))
            .transpose()?;

        let mut urls = UrlMap::new();
        urls.insert(CALLBACK_ENDPOINT, format!("{mount_path}/callback"));
        urls.insert(LOGOUT_ENDPOINT, format!("{mount_path}/logout"));
        if let Some(login_path) = &login_path {
            urls.insert(LOGIN_ENDPOINT, login_path.clone());
        }
        for (name, path) in self.routes {
            urls.insert(name, path);
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => default_reqwest_client().map_err(ConfigError::HttpClient)?,
        };

        Ok(DropboxContext(Arc::new(DropboxContextInner {
            config,
            endpoints,
            http_client,
            cookie: self.cookie_builder.build(),
            urls,
            mount_path,
            login_path,
            trust_forwarded_headers: self.trust_forwarded_headers,
            renderer: self.renderer.unwrap_or_else(|| Box::new(DefaultRenderer)),
        })))
    }
}

impl Default for DropboxContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_url(name: &'static str, url: &str) -> Result<Url, ConfigError> {
    Url::parse(url).map_err(|source| ConfigError::InvalidUrl { name, source })
}

/// `""` or `/a/b` without a trailing slash.
fn normalize_path(path: &str) -> Result<String, ConfigError> {
    let path = path.trim_end_matches('/');
    if path.is_empty() || path.starts_with('/') {
        Ok(path.to_owned())
    } else {
        Err(ConfigError::InvalidMountPath(path.to_owned()))
    }
}

#[cfg(test)]
mod builder {
    use crate::{CacheStorage, ConfigError, DropboxConfig, DropboxContext};

    const KEY: &str = "test_app_key";
    const SECRET: &str = "test_app_secret";

    fn builder() -> crate::DropboxContextBuilder {
        DropboxContext::builder()
            .key(KEY)
            .secret(SECRET)
            .access_type("app_folder")
            .cookie_secret("cookie secret")
    }

    #[test]
    fn builder_errors() {
        assert!(builder().try_build().is_ok());

        let res = DropboxContext::builder()
            .secret(SECRET)
            .access_type("app_folder")
            .try_build();
        assert!(matches!(res, Err(ConfigError::Missing("DROPBOX_KEY"))));

        let res = DropboxContext::builder()
            .key(KEY)
            .access_type("app_folder")
            .try_build();
        assert!(matches!(res, Err(ConfigError::Missing("DROPBOX_SECRET"))));

        let res = DropboxContext::builder().key(KEY).secret(SECRET).try_build();
        assert!(matches!(res, Err(ConfigError::Missing("DROPBOX_ACCESS_TYPE"))));

        let res = builder().key("").try_build();
        assert!(matches!(res, Err(ConfigError::Missing("DROPBOX_KEY"))));
    }

    #[test]
    fn invalid_urls() {
        let res = builder().api_url("not an url").try_build();
        assert!(matches!(res, Err(ConfigError::InvalidUrl { name: "api url", .. })));

        let res = builder().www_url("").try_build();
        assert!(matches!(res, Err(ConfigError::InvalidUrl { name: "www url", .. })));
    }

    #[test]
    fn mount_path() {
        let context = builder().try_build().unwrap();
        assert_eq!(context.callback_path(), "/dropbox/callback");
        assert_eq!(context.logout_path(), "/dropbox/logout");
        assert_eq!(context.login_path(), None);

        let context = builder()
            .mount_path("/auth/dropbox/")
            .login_path("/login")
            .try_build()
            .unwrap();
        assert_eq!(context.callback_path(), "/auth/dropbox/callback");
        assert_eq!(context.login_path(), Some("/auth/dropbox/login"));

        let context = builder().mount_path("").try_build().unwrap();
        assert_eq!(context.logout_path(), "/logout");

        let res = builder().mount_path("dropbox").try_build();
        assert!(matches!(res, Err(ConfigError::InvalidMountPath(_))));
    }

    #[test]
    fn redirects() {
        let context = builder().try_build().unwrap();
        assert_eq!(context.login_redirect(), "/");
        assert_eq!(context.logout_redirect(), "/");

        let context = builder()
            .route("files", "/files")
            .login_redirect("files")
            .logout_redirect("/goodbye")
            .try_build()
            .unwrap();
        assert_eq!(context.login_redirect(), "/files");
        assert_eq!(context.logout_redirect(), "/goodbye");
    }

    #[test]
    fn from_config() {
        let mut config = DropboxConfig::new(KEY, SECRET, "dropbox");
        config.cache_storage = CacheStorage::None;
        config.callback_url = Some("http://localhost/cb".to_owned());

        let context = DropboxContext::from_config(config.clone()).unwrap();
        assert_eq!(context.config(), &config);

        let context = builder().config(config.clone()).try_build().unwrap();
        assert_eq!(context.config().access_type, "dropbox");
    }

    #[test]
    fn lazy_access_type_check() {
        let context = builder().access_type("wrong-access-type").try_build().unwrap();
        assert!(context.new_session().is_err());

        let context = builder().access_type("dropbox").try_build().unwrap();
        assert_eq!(context.new_session().unwrap().root(), "dropbox");
    }
}
