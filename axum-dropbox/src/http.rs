use reqwest::{Client, redirect::Policy};

pub fn default_reqwest_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("axum-dropbox/", env!("CARGO_PKG_VERSION")))
        .redirect(Policy::none())
        .build()
}
