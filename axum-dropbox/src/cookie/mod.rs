//! The framework side session: one signed cookie holding the tokens.
mod builder;
mod signed;
mod state;

pub(crate) use builder::CookieOptionsBuilder;
pub use signed::SignedCookie;
pub(crate) use signed::SignedCookieBuilder;
pub use state::{ACCESS_TOKEN_KEY, REQUEST_TOKEN_KEY, SessionState};

pub use cookie_monster::{Cookie, CookieBuilder, CookieJar, SameSite};
