use std::borrow::Cow;

use cookie_monster::{Cookie, CookieBuilder, SameSite};

pub(crate) static DEFAULT_SESSION_COOKIE_NAME: &str = "dropbox.session";
pub(crate) static DEFAULT_DEV_SESSION_COOKIE_NAME: &str = "dropbox.dev-session";

/// Production and development presets, one of which ends up being used.
pub(crate) struct CookieOptionsBuilder {
    pub(crate) dev: bool,
    pub(crate) dev_cookie: CookieBuilder,
    pub(crate) cookie: CookieBuilder,
}

impl CookieOptionsBuilder {
    pub fn new() -> Self {
        Self {
            dev: false,
            // Dev servers usually run on plain http, so no `Secure`.
            dev_cookie: Cookie::named(DEFAULT_DEV_SESSION_COOKIE_NAME)
                .path("/")
                .http_only()
                .same_site(SameSite::Lax),
            // Lax, the callback is a top level navigation coming from dropbox.com.
            cookie: Cookie::named(DEFAULT_SESSION_COOKIE_NAME)
                .path("/")
                .http_only()
                .same_site(SameSite::Lax)
                .secure(),
        }
    }

    pub fn cookie(mut self, f: impl FnOnce(CookieBuilder) -> CookieBuilder) -> Self {
        self.cookie = f(self.cookie);
        self
    }

    pub fn dev_cookie(mut self, f: impl FnOnce(CookieBuilder) -> CookieBuilder) -> Self {
        self.dev_cookie = f(self.dev_cookie);
        self
    }

    pub fn set_name(&mut self, name: Cow<'static, str>) {
        self.dev_cookie = self.dev_cookie.clone().name(name.clone());
        self.cookie = self.cookie.clone().name(name);
    }

    pub fn build(self) -> CookieBuilder {
        if self.dev {
            self.dev_cookie
        } else {
            self.cookie
        }
    }
}

impl Default for CookieOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
