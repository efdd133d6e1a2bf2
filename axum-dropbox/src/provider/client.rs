use bytes::Bytes;
use http::header::AUTHORIZATION;
use reqwest::{Body, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    DropboxError, OAuthToken,
    provider::{AccountInfo, DropboxSession, MediaLink, Metadata, error_for_status},
};

static METADATA_HEADER: &str = "x-dropbox-metadata";

/// Dropbox REST client acting on behalf of one authenticated user.
#[derive(Debug, Clone)]
pub struct DropboxClient {
    session: DropboxSession,
    token: OAuthToken,
}

impl DropboxClient {
    pub fn new(session: DropboxSession, access_token: OAuthToken) -> Self {
        Self {
            session,
            token: access_token,
        }
    }

    pub fn session(&self) -> &DropboxSession {
        &self.session
    }

    pub fn access_token(&self) -> &OAuthToken {
        &self.token
    }

    pub async fn account_info(&self) -> Result<AccountInfo, DropboxError> {
        tracing::debug!("fetching dropbox account info");
        let url = self.session.endpoints().api_url("/1/account/info");
        self.json(self.session.http().get(url)).await
    }

    /// Metadata of `path`, with the folder's contents when `list` is set.
    pub async fn metadata(&self, path: &str, list: bool) -> Result<Metadata, DropboxError> {
        let mut url = self.api_path("/1/metadata", path);
        url.query_pairs_mut()
            .append_pair("list", if list { "true" } else { "false" });

        self.json(self.session.http().get(url)).await
    }

    pub async fn get_file(&self, path: &str) -> Result<Bytes, DropboxError> {
        let url = self.content_path("/1/files", path);
        let res = self.authorized(self.session.http().get(url)).send().await?;

        Ok(error_for_status(res).await?.bytes().await?)
    }

    /// The file together with the metadata Dropbox sends in the
    /// `x-dropbox-metadata` response header.
    pub async fn get_file_and_metadata(&self, path: &str) -> Result<(Bytes, Metadata), DropboxError> {
        let url = self.content_path("/1/files", path);
        let res = self.authorized(self.session.http().get(url)).send().await?;
        let res = error_for_status(res).await?;

        let metadata = res
            .headers()
            .get(METADATA_HEADER)
            .ok_or_else(|| {
                DropboxError::InvalidResponse(format!("missing {METADATA_HEADER} header"))
            })?
            .as_bytes();
        let metadata: Metadata = serde_json::from_slice(metadata)
            .map_err(|e| DropboxError::InvalidResponse(e.to_string()))?;

        Ok((res.bytes().await?, metadata))
    }

    pub async fn put_file(
        &self,
        path: &str,
        body: impl Into<Body>,
        overwrite: bool,
    ) -> Result<Metadata, DropboxError> {
        let mut url = self.content_path("/1/files_put", path);
        url.query_pairs_mut()
            .append_pair("overwrite", if overwrite { "true" } else { "false" });

        self.json(self.session.http().put(url).body(body)).await
    }

    pub async fn file_delete(&self, path: &str) -> Result<Metadata, DropboxError> {
        let url = self.session.endpoints().api_url("/1/fileops/delete");
        let form = [("root", self.session.root()), ("path", path)];

        self.json(self.session.http().post(url).form(&form)).await
    }

    /// A temporary link streaming the file directly from Dropbox.
    pub async fn media(&self, path: &str) -> Result<MediaLink, DropboxError> {
        let url = self.api_path("/1/media", path);
        self.json(self.session.http().post(url)).await
    }

    fn api_path(&self, prefix: &str, path: &str) -> Url {
        self.session
            .endpoints()
            .api_url(&self.rooted(prefix, path))
    }

    fn content_path(&self, prefix: &str, path: &str) -> Url {
        self.session
            .endpoints()
            .content_url(&self.rooted(prefix, path))
    }

    fn rooted(&self, prefix: &str, path: &str) -> String {
        format!(
            "{prefix}/{}/{}",
            self.session.root(),
            path.trim_start_matches('/')
        )
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(
            AUTHORIZATION,
            self.session.authorization_header(Some(&self.token)),
        )
    }

    async fn json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, DropboxError> {
        let res = self.authorized(req).send().await?;
        let body = error_for_status(res).await?.text().await?;

        serde_json::from_str(&body).map_err(|e| DropboxError::InvalidResponse(e.to_string()))
    }
}
