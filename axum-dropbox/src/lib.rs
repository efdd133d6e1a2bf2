mod builder;
mod cache;
mod config;
mod context;
pub mod cookie;
mod error;
mod extract;
pub mod http;
mod inject;
pub mod provider;
mod router_ext;
pub mod routing;
mod token;
pub(crate) mod utils;
pub mod views;

pub use builder::DropboxContextBuilder;
pub use cache::{CacheStorage, Cached, DropboxCache};
pub use config::DropboxConfig;
pub use context::DropboxContext;
pub use error::{ConfigError, DropboxError};
pub use extract::{Dropbox, TEMPLATE_CONTEXT_NAME, TemplateContext};
pub use router_ext::{AuthInjector, RouterExt};
pub use token::OAuthToken;
