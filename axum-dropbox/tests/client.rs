use std::error::Error;

use axum_dropbox::{
    DropboxError, OAuthToken,
    provider::{DropboxClient, DropboxSession, Endpoints},
};
use http::StatusCode;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, header_regex, method, path, query_param},
};

async fn client(server: &MockServer, access_type: &str) -> Result<DropboxClient, Box<dyn Error>> {
    let base = Url::parse(&server.uri())?;
    let endpoints = Endpoints::new(base.clone(), base, Url::parse("https://www.dropbox.com")?);

    let session = DropboxSession::new(
        "app-key",
        "app-secret",
        access_type,
        endpoints,
        reqwest::Client::new(),
    )?;
    Ok(DropboxClient::new(
        session,
        OAuthToken::new("access-key", "access-secret"),
    ))
}

#[tokio::test]
async fn signs_requests() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/account/info"))
        .and(header_regex("authorization", r#"^OAuth .*oauth_token="access-key""#))
        .and(header_regex(
            "authorization",
            r#"oauth_signature="app-secret%26access-secret"$"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "uid": 1,
            "display_name": "Test User",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = client(&server, "app_folder").await?.account_info().await?;
    assert_eq!(info.uid, 1);
    assert_eq!(info.display_name, "Test User");
    assert_eq!(info.quota_info.quota, 0);
    Ok(())
}

#[tokio::test]
async fn metadata_listing() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/metadata/sandbox/"))
        .and(query_param("list", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "path": "/",
            "is_dir": true,
            "contents": [
                { "path": "/redis.pdf", "bytes": 1024, "mime_type": "application/pdf" },
                { "path": "/docs", "is_dir": true },
            ],
        })))
        .mount(&server)
        .await;

    let metadata = client(&server, "app_folder").await?.metadata("/", true).await?;
    assert!(metadata.is_dir);
    assert_eq!(metadata.contents.len(), 2);
    assert_eq!(metadata.contents[0].bytes, 1024);
    assert_eq!(metadata.contents[0].mime_type.as_deref(), Some("application/pdf"));
    assert!(metadata.contents[1].is_dir);
    Ok(())
}

#[tokio::test]
async fn files() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/files/dropbox/notes.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello dropbox"))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/1/files_put/dropbox/notes.txt"))
        .and(query_param("overwrite", "false"))
        .and(body_string_contains("new notes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "path": "/notes (1).txt", "bytes": 9 })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/1/fileops/delete"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("root=dropbox"))
        .and(body_string_contains("path=%2Fnotes.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "path": "/notes.txt", "is_deleted": true })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/1/media/dropbox/notes.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": "https://dl.dropbox.com/0/view/abc/notes.txt",
            "expires": "Fri, 20 Apr 2012 19:58:37 +0000",
        })))
        .mount(&server)
        .await;

    let client = client(&server, "dropbox").await?;

    let bytes = client.get_file("/notes.txt").await?;
    assert_eq!(&bytes[..], b"hello dropbox");

    let uploaded = client.put_file("/notes.txt", "new notes", false).await?;
    assert_eq!(uploaded.path, "/notes (1).txt");

    let deleted = client.file_delete("/notes.txt").await?;
    assert!(deleted.is_deleted);

    let media = client.media("notes.txt").await?;
    assert!(media.url.starts_with("https://dl.dropbox.com/"));
    Ok(())
}

#[tokio::test]
async fn file_with_metadata() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/files/sandbox/redis.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "x-dropbox-metadata",
                    r#"{"path": "/redis.pdf", "bytes": 7, "mime_type": "application/pdf"}"#,
                )
                .set_body_string("%PDF-1."),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/1/files/sandbox/plain.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain"))
        .mount(&server)
        .await;

    let client = client(&server, "app_folder").await?;

    let (bytes, metadata) = client.get_file_and_metadata("/redis.pdf").await?;
    assert_eq!(&bytes[..], b"%PDF-1.");
    assert_eq!(metadata.bytes, 7);
    assert_eq!(metadata.mime_type.as_deref(), Some("application/pdf"));

    let err = client.get_file_and_metadata("plain.txt").await.unwrap_err();
    assert!(matches!(err, DropboxError::InvalidResponse(_)));
    Ok(())
}

#[tokio::test]
async fn provider_errors() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/files/sandbox/missing.txt"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "error": "File not found" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/1/account/info"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client(&server, "app_folder").await?;

    let err = client.get_file("missing.txt").await.unwrap_err();
    assert!(matches!(
        &err,
        DropboxError::Provider { status, message }
            if *status == StatusCode::NOT_FOUND && message == "File not found"
    ));
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

    let err = client.account_info().await.unwrap_err();
    assert!(matches!(err, DropboxError::InvalidResponse(_)));
    Ok(())
}

#[tokio::test]
async fn token_exchange() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/oauth/request_token"))
        .and(header_regex("authorization", r#"oauth_signature="app-secret%26"$"#))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token_secret=request-secret&oauth_token=request-key"),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/1/oauth/access_token"))
        .and(header_regex("authorization", r#"oauth_token="request-key""#))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token_secret=access-secret&oauth_token=access-key"),
        )
        .mount(&server)
        .await;

    let client = client(&server, "app_folder").await?;
    let session = client.session();

    let request_token = session.obtain_request_token().await?;
    assert_eq!(request_token, OAuthToken::new("request-key", "request-secret"));

    let access_token = session.obtain_access_token(&request_token).await?;
    assert_eq!(access_token, OAuthToken::new("access-key", "access-secret"));
    Ok(())
}
